//! Live monitoring of open positions.

mod logging;
mod monitor;
mod store;

pub use logging::setup_logging;
pub use monitor::{MonitorConfig, PositionMonitor};
pub use store::MemoryPositionStore;

//! Exit monitoring for open swing positions.
//!
//! [`ExitEngine`] evaluates one monitoring tick for one position: it may
//! propose stop updates and decides whether the position is closed.

mod calendar;
mod config;
mod engine;

pub use calendar::{is_non_trading_day, trade_day};
pub use config::{
    CarryForwardConfig, ExitConfig, ExpiryExitConfig, HolidayExitConfig, RsiExitConfig,
};
pub use engine::{ExitEngine, TickContext};

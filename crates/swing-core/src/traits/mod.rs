//! Core traits: the seams between analysis, data and persistence.

mod calendar;
mod data_source;
mod indicator;
mod store;
mod strategy;

pub use calendar::HolidayCalendar;
pub use data_source::BarSource;
pub use indicator::Indicator;
pub use store::PositionStore;
pub use strategy::{Strategy, StrategyConfig, StrategyState};

//! Core data types for swing analysis and exit monitoring.

mod exit;
mod ohlcv;
mod position;
mod signal;
mod time_of_day;
mod timeframe;

pub use exit::{ExitDecision, ExitReason, TickOutcome};
pub use ohlcv::{validate_bars, Bar, BarSeries};
pub use position::{Direction, PositionContext, StopRule, StopUpdate};
pub use signal::EntrySignal;
pub use time_of_day::TimeOfDay;
pub use timeframe::Timeframe;

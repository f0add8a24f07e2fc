//! Core types and traits for swing analysis and exit monitoring.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Timeframe)
//! - Position context, exit decisions and stop updates
//! - Traits for bar sources, position stores, holiday calendars,
//!   indicators and entry strategies

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    CalendarError, ConfigError, DataError, IndicatorError, StoreError, StrategyError, SwingError,
    SwingResult,
};
pub use traits::*;
pub use types::*;

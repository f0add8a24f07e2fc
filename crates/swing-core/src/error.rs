//! Error types for swing analysis and exit monitoring.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum SwingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Position store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input data errors. The tick that produced them should be skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("No bars supplied")]
    Empty,

    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientBars { required: usize, available: usize },

    #[error("Timestamps not strictly ascending at index {index}")]
    NonMonotonicTimestamp { index: usize },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Source(String),
}

/// Configuration errors, raised once at load/validation time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Holiday calendar lookup errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("Holiday source unavailable: {0}")]
    Unavailable(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Position store errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Position already closed: {0}")]
    AlreadyClosed(String),
}

/// Result type alias.
pub type SwingResult<T> = Result<T, SwingError>;

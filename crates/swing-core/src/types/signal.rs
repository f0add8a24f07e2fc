//! Breakout entry signals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Direction, PositionContext};

/// A confirmed swing breakout, with the levels to open a position at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySignal {
    /// Underlying symbol
    pub symbol: String,
    /// Breakout direction
    pub direction: Direction,
    /// Open time of the bar that triggered the signal (Unix milliseconds)
    pub timestamp: i64,
    /// Close of the triggering bar
    pub price: f64,
    /// Swing level plus buffer that the close broke through
    pub breakout_level: f64,
    /// RSI at the triggering bar
    pub rsi: Option<f64>,
    /// Last confirmed swing high
    pub swing_high: Option<f64>,
    /// Last confirmed swing low
    pub swing_low: Option<f64>,
    /// Initial protective stop
    pub stop_level: f64,
    /// Initial target
    pub target_level: Option<f64>,
}

impl EntrySignal {
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Open a position from this signal.
    pub fn into_position(
        self,
        entry_trade_day: NaiveDate,
        expiry_date: Option<NaiveDate>,
        carry_forward_enabled: bool,
    ) -> PositionContext {
        PositionContext {
            id: Uuid::new_v4(),
            symbol: self.symbol,
            direction: self.direction,
            entry_price: self.price,
            entry_swing_high: self.swing_high,
            entry_swing_low: self.swing_low,
            stop_level: self.stop_level,
            target_level: self.target_level,
            entry_rsi: self.rsi,
            expiry_date,
            carry_forward_enabled,
            entry_trade_day,
            stop_updated_on: None,
        }
    }
}

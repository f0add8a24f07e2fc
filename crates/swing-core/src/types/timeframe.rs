//! Bar intervals.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Interval of an OHLC bar.
///
/// Monitoring is intraday, so only minute and hour intervals plus the
/// daily bar are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    Minute1,
    Minute3,
    #[default]
    Minute5,
    Minute10,
    Minute15,
    Minute30,
    Hour1,
    Daily,
}

impl Timeframe {
    /// Length of one bar in minutes.
    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::Minute1 => 1,
            Timeframe::Minute3 => 3,
            Timeframe::Minute5 => 5,
            Timeframe::Minute10 => 10,
            Timeframe::Minute15 => 15,
            Timeframe::Minute30 => 30,
            Timeframe::Hour1 => 60,
            Timeframe::Daily => 1440,
        }
    }

    /// Length of one bar.
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    /// Map a bare minute count ("interval_minutes") to a timeframe.
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        match minutes {
            1 => Some(Timeframe::Minute1),
            3 => Some(Timeframe::Minute3),
            5 => Some(Timeframe::Minute5),
            10 => Some(Timeframe::Minute10),
            15 => Some(Timeframe::Minute15),
            30 => Some(Timeframe::Minute30),
            60 => Some(Timeframe::Hour1),
            1440 => Some(Timeframe::Daily),
            _ => None,
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Timeframe::Daily)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Hour1 => write!(f, "1h"),
            Timeframe::Daily => write!(f, "1d"),
            other => write!(f, "{}m", other.minutes()),
        }
    }
}

impl FromStr for Timeframe {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "1h" | "60m" | "hour" => return Ok(Timeframe::Hour1),
            "1d" | "day" | "daily" => return Ok(Timeframe::Daily),
            _ => {}
        }
        lowered
            .strip_suffix("min")
            .or_else(|| lowered.strip_suffix('m'))
            .and_then(|n| n.parse::<i64>().ok())
            .and_then(Timeframe::from_minutes)
            .ok_or_else(|| ConfigError::InvalidTimeframe(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.to_string()
    }
}

//! Wall-clock cutoffs written as `HH:MM` in configuration.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A local time of day, e.g. the expiry cutoff `15:15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build from hour and minute. Returns `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Whether `time` is at or past this cutoff.
    pub fn is_reached_by(&self, time: NaiveTime) -> bool {
        time >= self.0
    }
}

impl Default for TimeOfDay {
    /// Midnight.
    fn default() -> Self {
        Self(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| ConfigError::InvalidTimeOfDay(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let t: TimeOfDay = "09:15".parse().unwrap();
        assert_eq!(t, TimeOfDay::from_hm(9, 15).unwrap());
        assert_eq!(t.to_string(), "09:15");
    }

    #[test]
    fn test_malformed_rejected() {
        for bad in ["", "9", "25:00", "12:61", "noon", "15.15"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_cutoff() {
        let cutoff: TimeOfDay = "15:15".parse().unwrap();
        assert!(cutoff.is_reached_by(NaiveTime::from_hms_opt(15, 16, 0).unwrap()));
        assert!(cutoff.is_reached_by(NaiveTime::from_hms_opt(15, 15, 0).unwrap()));
        assert!(!cutoff.is_reached_by(NaiveTime::from_hms_opt(15, 10, 0).unwrap()));
    }

    #[test]
    fn test_serde_rejects_malformed() {
        assert!(serde_json::from_str::<TimeOfDay>("\"14:30\"").is_ok());
        assert!(serde_json::from_str::<TimeOfDay>("\"2:30pm\"").is_err());
    }
}

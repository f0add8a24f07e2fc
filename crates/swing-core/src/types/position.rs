//! Open position context and stop mutations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Breakout direction of a position.
///
/// `Up` profits when the underlying rises, `Down` when it falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Whether `proposed` carries less risk than `current` for this direction.
    pub fn is_tighter(&self, proposed: f64, current: f64) -> bool {
        match self {
            Direction::Up => proposed > current,
            Direction::Down => proposed < current,
        }
    }

    /// The tighter of two stop levels.
    pub fn tighter(&self, a: f64, b: f64) -> f64 {
        match self {
            Direction::Up => a.max(b),
            Direction::Down => a.min(b),
        }
    }

    /// Signed favourable move from `entry` to `price`.
    pub fn points(&self, entry: f64, price: f64) -> f64 {
        match self {
            Direction::Up => price - entry,
            Direction::Down => entry - price,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "long" | "ce" | "buy" => Ok(Direction::Up),
            "down" | "short" | "pe" | "sell" => Ok(Direction::Down),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Entry context of one open position, as recorded by the position store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionContext {
    /// Position identifier
    pub id: Uuid,
    /// Underlying symbol whose bars drive the exit rules
    pub symbol: String,
    /// Breakout direction
    pub direction: Direction,
    /// Underlying price at entry
    pub entry_price: f64,
    /// Last confirmed swing high when the position was opened
    pub entry_swing_high: Option<f64>,
    /// Last confirmed swing low when the position was opened
    pub entry_swing_low: Option<f64>,
    /// Current protective stop on the underlying
    pub stop_level: f64,
    /// Target on the underlying
    pub target_level: Option<f64>,
    /// RSI of the entry timeframe at entry
    pub entry_rsi: Option<f64>,
    /// Contract expiry date
    pub expiry_date: Option<NaiveDate>,
    /// Whether the position may be held across sessions
    pub carry_forward_enabled: bool,
    /// Trade day the position was opened on
    pub entry_trade_day: NaiveDate,
    /// Trade day of the last engine stop update. Next-session
    /// recalibration only runs while this is before the current session.
    #[serde(default)]
    pub stop_updated_on: Option<NaiveDate>,
}

impl PositionContext {
    /// Copy of this context with a different stop.
    pub fn with_stop(&self, stop_level: f64) -> Self {
        Self {
            stop_level,
            ..self.clone()
        }
    }

    /// Apply a stop update produced for this position.
    pub fn apply(&mut self, update: &StopUpdate) {
        self.stop_level = update.new_stop;
        self.stop_updated_on = Some(update.trade_day);
    }
}

/// Which rule produced a stop update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopRule {
    /// Next-session recalibration to the first bar's extreme
    NextDayRecalibration,
    /// Tightening to the latest confirmed swing extreme
    SwingTightening,
}

/// A stop change requested by the exit engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopUpdate {
    pub position_id: Uuid,
    pub previous: f64,
    pub new_stop: f64,
    pub rule: StopRule,
    /// Trade day of the tick that produced the update
    pub trade_day: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tighter() {
        assert!(Direction::Up.is_tighter(101.0, 100.0));
        assert!(!Direction::Up.is_tighter(99.0, 100.0));
        assert!(Direction::Down.is_tighter(99.0, 100.0));
        assert_eq!(Direction::Up.tighter(100.0, 101.0), 101.0);
        assert_eq!(Direction::Down.tighter(100.0, 101.0), 100.0);
    }

    #[test]
    fn test_direction_points() {
        assert_eq!(Direction::Up.points(100.0, 110.0), 10.0);
        assert_eq!(Direction::Down.points(100.0, 110.0), -10.0);
    }

    #[test]
    fn test_apply_records_session() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut position = PositionContext {
            id: Uuid::new_v4(),
            symbol: "NIFTY".to_string(),
            direction: Direction::Up,
            entry_price: 22050.0,
            entry_swing_high: Some(22000.0),
            entry_swing_low: Some(21950.0),
            stop_level: 22100.0,
            target_level: None,
            entry_rsi: None,
            expiry_date: None,
            carry_forward_enabled: true,
            entry_trade_day: day.pred_opt().unwrap(),
            stop_updated_on: None,
        };

        position.apply(&StopUpdate {
            position_id: position.id,
            previous: 22100.0,
            new_stop: 21980.0,
            rule: StopRule::NextDayRecalibration,
            trade_day: day,
        });
        assert_eq!(position.stop_level, 21980.0);
        assert_eq!(position.stop_updated_on, Some(day));

        position.apply(&StopUpdate {
            position_id: position.id,
            previous: 21980.0,
            new_stop: 21990.0,
            rule: StopRule::SwingTightening,
            trade_day: day,
        });
        assert_eq!(position.stop_level, 21990.0);
        assert_eq!(position.stop_updated_on, Some(day));

        // Tightening on the following session moves the day forward too
        let next = day.succ_opt().unwrap();
        position.apply(&StopUpdate {
            position_id: position.id,
            previous: 21990.0,
            new_stop: 22010.0,
            rule: StopRule::SwingTightening,
            trade_day: next,
        });
        assert_eq!(position.stop_updated_on, Some(next));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("CE".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
        assert!("sideways".parse::<Direction>().is_err());
    }
}

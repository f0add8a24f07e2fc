//! Initial stop and target levels for a new position.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swing_core::{Bar, Direction, StrategyError};
use swing_indicators::{Atr, Smoothing};

/// How the initial stop is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum StopMethod {
    /// Beyond the last confirmed swing low (UP) or high (DOWN)
    SwingExtreme { buffer: Decimal },
    /// Fixed percentage away from entry
    FixedPercent { percent: Decimal },
    /// ATR multiple away from entry
    Atr { multiplier: Decimal },
}

impl Default for StopMethod {
    fn default() -> Self {
        StopMethod::SwingExtreme { buffer: dec!(2.5) }
    }
}

/// How the target is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum TargetMethod {
    /// ATR multiple beyond entry
    Atr { multiplier: Decimal },
    /// Fixed distance beyond entry
    FixedPoints { points: Decimal },
    /// No target; the position exits on stop or time rules only
    None,
}

impl Default for TargetMethod {
    fn default() -> Self {
        TargetMethod::Atr { multiplier: dec!(3) }
    }
}

/// Level calculator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub stop: StopMethod,
    pub target: TargetMethod,
    pub atr_period: usize,
    pub atr_smoothing: Smoothing,
    /// Price increment levels are rounded to
    pub tick_size: Decimal,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            stop: StopMethod::default(),
            target: TargetMethod::default(),
            atr_period: 10,
            atr_smoothing: Smoothing::Rma,
            tick_size: dec!(0.05),
        }
    }
}

/// Stop and target of a new position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub stop: f64,
    pub target: Option<f64>,
    pub atr: Option<f64>,
}

/// Computes [`Levels`] from the entry price and recent bars.
#[derive(Debug, Clone)]
pub struct LevelCalculator {
    config: LevelConfig,
    atr: Atr,
}

impl LevelCalculator {
    pub fn new(config: LevelConfig) -> Result<Self, StrategyError> {
        if config.tick_size <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "tick_size must be positive".into(),
            ));
        }
        let atr = Atr::new(config.atr_period, config.atr_smoothing)
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        Ok(Self { config, atr })
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Levels for a position entered at `entry` after `bars`.
    ///
    /// `swing_extreme` is the last confirmed swing low for UP and swing high
    /// for DOWN; without one the stop falls back to the last bar's extreme.
    pub fn calculate(
        &self,
        direction: Direction,
        entry: f64,
        bars: &[Bar],
        swing_extreme: Option<f64>,
    ) -> Result<Levels, StrategyError> {
        let last = bars.last().ok_or(StrategyError::InsufficientData {
            required: 1,
            available: 0,
        })?;
        let entry_d = to_decimal(entry)?;
        let sign = match direction {
            Direction::Up => Decimal::ONE,
            Direction::Down => Decimal::NEGATIVE_ONE,
        };

        let needs_atr = matches!(self.config.stop, StopMethod::Atr { .. })
            || matches!(self.config.target, TargetMethod::Atr { .. });
        let atr = if needs_atr {
            let value = self
                .atr
                .latest(bars)
                .map_err(|_| StrategyError::InsufficientData {
                    required: self.atr.period(),
                    available: bars.len(),
                })?;
            Some(to_decimal(value)?)
        } else {
            None
        };

        let stop = match self.config.stop {
            StopMethod::SwingExtreme { buffer } => {
                let extreme = swing_extreme.unwrap_or(match direction {
                    Direction::Up => last.low,
                    Direction::Down => last.high,
                });
                to_decimal(extreme)? - sign * buffer
            }
            StopMethod::FixedPercent { percent } => {
                entry_d - sign * entry_d * (percent / dec!(100))
            }
            StopMethod::Atr { multiplier } => entry_d - sign * atr.unwrap_or_default() * multiplier,
        };

        let target = match self.config.target {
            TargetMethod::Atr { multiplier } => {
                Some(entry_d + sign * atr.unwrap_or_default() * multiplier)
            }
            TargetMethod::FixedPoints { points } => Some(entry_d + sign * points),
            TargetMethod::None => None,
        };

        Ok(Levels {
            stop: self.to_tick(stop)?,
            target: target.map(|t| self.to_tick(t)).transpose()?,
            atr: atr.and_then(|a| a.to_f64()),
        })
    }

    fn to_tick(&self, price: Decimal) -> Result<f64, StrategyError> {
        let tick = self.config.tick_size;
        let rounded = (price / tick).round() * tick;
        rounded
            .to_f64()
            .ok_or_else(|| StrategyError::InvalidConfig(format!("level {rounded} out of range")))
    }
}

fn to_decimal(value: f64) -> Result<Decimal, StrategyError> {
    Decimal::try_from(value)
        .map_err(|_| StrategyError::InvalidConfig(format!("price {value} is not representable")))
}

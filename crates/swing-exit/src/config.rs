//! Exit rule configuration.

use serde::{Deserialize, Serialize};
use swing_core::{ConfigError, TimeOfDay, Timeframe};
use swing_indicators::Smoothing;
use swing_structure::PivotConfig;

/// Configuration of the exit cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Timeframe of the bars driving stop confirmation and tightening
    pub stop_timeframe: Timeframe,
    /// Timeframe of the bars driving the RSI exit
    pub entry_timeframe: Timeframe,
    /// Open time of the first bar of a session, exchange time
    pub first_candle_time: TimeOfDay,
    /// Pivot window used when tightening the stop to swing extremes
    pub stop_pivot: PivotConfig,
    pub carry_forward: CarryForwardConfig,
    pub holiday_exit: HolidayExitConfig,
    pub expiry_exit: ExpiryExitConfig,
    pub rsi_exit: RsiExitConfig,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            stop_timeframe: Timeframe::Minute5,
            entry_timeframe: Timeframe::Minute5,
            first_candle_time: TimeOfDay::from_hm(9, 15).unwrap_or_default(),
            stop_pivot: PivotConfig::default(),
            carry_forward: CarryForwardConfig::default(),
            holiday_exit: HolidayExitConfig::default(),
            expiry_exit: ExpiryExitConfig::default(),
            rsi_exit: RsiExitConfig::default(),
        }
    }
}

impl ExitConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stop_pivot.validate()?;
        if !self.stop_timeframe.is_intraday() {
            return Err(ConfigError::invalid(
                "exit.stop_timeframe",
                "stop confirmation needs an intraday timeframe",
            ));
        }
        self.rsi_exit.validate()
    }
}

/// Holding positions across sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryForwardConfig {
    pub enabled: bool,
}

/// Exit ahead of weekends and exchange holidays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayExitConfig {
    pub enabled: bool,
    /// Extra calendar days to look ahead beyond tomorrow
    pub exit_before_days: u32,
    /// Cutoff after which the exit fires, exchange time
    pub exit_time: TimeOfDay,
}

impl Default for HolidayExitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            exit_before_days: 0,
            exit_time: TimeOfDay::from_hm(14, 30).unwrap_or_default(),
        }
    }
}

/// Exit on contract expiry day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryExitConfig {
    pub enabled: bool,
    /// Calendar days before expiry on which the exit fires
    pub days_before_expiry: u32,
    /// Cutoff after which the exit fires, exchange time
    pub expiry_exit_time: TimeOfDay,
}

impl Default for ExpiryExitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            days_before_expiry: 0,
            expiry_exit_time: TimeOfDay::from_hm(15, 15).unwrap_or_default(),
        }
    }
}

/// Exit when RSI of the entry timeframe reaches a target level.
///
/// `ce_*` levels apply to UP positions and `pe_*` levels to DOWN positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiExitConfig {
    pub enabled: bool,
    pub period: usize,
    pub smoothing: Smoothing,
    /// UP exits when RSI is at or above this level
    pub ce_target_level: f64,
    /// UP positions entered at or above this RSI ignore the RSI exit
    pub ce_ignore_above: f64,
    /// DOWN exits when RSI is at or below this level
    pub pe_target_level: f64,
    /// DOWN positions entered at or below this RSI ignore the RSI exit
    pub pe_ignore_below: f64,
}

impl Default for RsiExitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period: 14,
            smoothing: Smoothing::Sma,
            ce_target_level: 75.0,
            ce_ignore_above: 80.0,
            pe_target_level: 25.0,
            pe_ignore_below: 20.0,
        }
    }
}

impl RsiExitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::invalid("exit.rsi_exit.period", "must be at least 1"));
        }
        let levels = [
            ("ce_target_level", self.ce_target_level),
            ("ce_ignore_above", self.ce_ignore_above),
            ("pe_target_level", self.pe_target_level),
            ("pe_ignore_below", self.pe_ignore_below),
        ];
        for (name, level) in levels {
            if !(0.0..=100.0).contains(&level) {
                return Err(ConfigError::invalid(
                    format!("exit.rsi_exit.{}", name),
                    format!("{} is outside 0..=100", level),
                ));
            }
        }
        if self.pe_target_level >= self.ce_target_level {
            return Err(ConfigError::invalid(
                "exit.rsi_exit",
                "pe_target_level must be below ce_target_level",
            ));
        }
        Ok(())
    }
}

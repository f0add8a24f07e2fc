//! Configuration structures.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use swing_core::{ConfigError, StrategyConfig, TimeOfDay};
use swing_exit::ExitConfig;
use swing_monitor::MonitorConfig;
use swing_strategies::BreakoutConfig;
use swing_structure::PivotConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketConfig,
    /// Pivot window for swing analysis reports
    #[serde(default)]
    pub pivot: PivotConfig,
    #[serde(default)]
    pub entry: BreakoutConfig,
    #[serde(default)]
    pub exit: ExitConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Check every section; the first problem found is returned.
    pub fn validate(&self) -> Result<(), crate::SettingsError> {
        self.logging.validate()?;
        self.pivot.validate()?;
        self.entry.validate()?;
        self.exit_config().validate()?;
        self.monitor.validate()?;
        if self.market.symbol.trim().is_empty() {
            return Err(ConfigError::invalid("market.symbol", "must not be empty").into());
        }
        Ok(())
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Exit settings with the session open taken from `[market]`.
    pub fn exit_config(&self) -> ExitConfig {
        ExitConfig {
            first_candle_time: self.market.first_candle_time,
            ..self.exit.clone()
        }
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "swingwatch".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ConfigError::invalid(
                "logging.format",
                format!("'{}' is not one of pretty, json", other),
            )),
        }
    }
}

/// Exchange settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Underlying monitored by default
    pub symbol: String,
    pub timezone: Tz,
    /// Open time of the first bar of a session
    pub first_candle_time: TimeOfDay,
    /// Exchange holidays; weekends are always closed
    pub holidays: Vec<NaiveDate>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: "NIFTY".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
            first_candle_time: TimeOfDay::from_hm(9, 15).unwrap_or_default(),
            holidays: Vec::new(),
        }
    }
}

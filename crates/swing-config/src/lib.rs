//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, LoggingConfig, MarketConfig};

use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use swing_core::StrategyError;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] swing_core::ConfigError),

    #[error("Invalid entry configuration: {0}")]
    Entry(#[from] StrategyError),
}

fn environment() -> Environment {
    Environment::with_prefix("SWINGWATCH")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from file and `SWINGWATCH__*` environment variables,
/// then validate it.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    let config: AppConfig = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment())
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(toml: &str) -> Result<AppConfig, SettingsError> {
    let config: AppConfig = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

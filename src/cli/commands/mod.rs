//! CLI command implementations.

pub mod analyze;
pub mod monitor;
pub mod replay;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use swing_config::AppConfig;
use swing_core::Bar;
use swing_data::CsvBarSource;

/// Load and validate the configuration file.
pub(crate) fn load(config_path: &Path) -> Result<AppConfig> {
    swing_config::load_config(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Read bars from a CSV file, optionally for one symbol.
pub(crate) async fn load_bars(
    path: &Path,
    symbol: Option<&str>,
    config: &AppConfig,
) -> Result<Vec<Bar>> {
    if !path.exists() {
        anyhow::bail!("Data file '{}' does not exist", path.display());
    }
    let source = CsvBarSource::new(path, config.market.timezone)?;
    let bars = match symbol {
        Some(symbol) => {
            use swing_core::BarSource;
            let from = chrono::DateTime::<chrono::Utc>::MIN_UTC;
            let to = chrono::DateTime::<chrono::Utc>::MAX_UTC;
            source
                .get_bars(symbol, config.exit.stop_timeframe, from, to)
                .await?
        }
        None => source.load_all().await?,
    };
    Ok(bars)
}

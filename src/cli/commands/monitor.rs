//! Live position monitoring command.

use anyhow::{Context, Result};
use std::sync::Arc;
use swing_core::PositionContext;
use swing_data::{CachedBarSource, CsvBarSource, FixedHolidayCalendar, HistoryCache};
use swing_exit::ExitEngine;
use swing_monitor::{MemoryPositionStore, PositionMonitor};
use tokio::sync::watch;
use tracing::{info, warn};

use super::load;
use crate::cli::MonitorArgs;

/// Cached (symbol, timeframe, day) entries kept per run.
const CACHE_ENTRIES: usize = 64;

pub async fn run(args: MonitorArgs, config_path: &std::path::Path) -> Result<()> {
    let config = load(config_path)?;
    let tz = config.market.timezone;

    let raw = tokio::fs::read_to_string(&args.positions)
        .await
        .with_context(|| format!("Failed to read positions from {}", args.positions.display()))?;
    let positions: Vec<PositionContext> =
        serde_json::from_str(&raw).context("Positions file is not a JSON array of positions")?;
    if positions.is_empty() {
        warn!("No positions to monitor");
        return Ok(());
    }

    let store = Arc::new(MemoryPositionStore::new());
    let ids: Vec<_> = positions.iter().map(|p| p.id).collect();
    for position in positions {
        info!(id = %position.id, symbol = %position.symbol, direction = %position.direction, "Loaded position");
        store.insert(position).await;
    }

    let cache = HistoryCache::new(
        chrono::Duration::seconds(config.monitor.poll_interval_secs as i64),
        CACHE_ENTRIES,
    );
    let source = CachedBarSource::new(CsvBarSource::new(&args.data, tz)?, tz, cache);
    let calendar = Arc::new(FixedHolidayCalendar::new(config.market.holidays.clone()));
    let engine = ExitEngine::new(config.exit_config(), calendar)?;

    let monitor = Arc::new(PositionMonitor::new(
        Arc::new(engine),
        Arc::new(source),
        store.clone(),
        config.monitor.clone(),
        tz,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles = monitor.spawn_all(shutdown_rx).await?;
    info!(tasks = handles.len(), "Monitoring; press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down monitors");
    let _ = shutdown_tx.send(true);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Monitor task ended abnormally");
        }
    }

    for id in ids {
        match store.exit_of(id).await {
            Some((reason, price)) => info!(%id, %reason, price, "Position exited"),
            None => info!(%id, "Position still open"),
        }
    }
    Ok(())
}

//! Per-position monitoring tasks.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swing_core::{
    Bar, BarSource, ConfigError, DataError, PositionStore, SwingError, TickOutcome, Timeframe,
};
use swing_exit::{ExitEngine, TickContext};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Monitor loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between ticks
    pub poll_interval_secs: u64,
    /// Calendar days of history fetched each tick
    pub history_days: i64,
    /// Extra attempts after a failed bar fetch
    pub fetch_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub retry_backoff_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            history_days: 5,
            fetch_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::invalid("monitor.poll_interval_secs", "must be at least 1"));
        }
        if self.history_days < 1 {
            return Err(ConfigError::invalid("monitor.history_days", "must be at least 1"));
        }
        Ok(())
    }
}

/// Runs the exit engine for open positions.
///
/// Each position gets its own task. A tick reads the position from the
/// store, fetches bars, evaluates the cascade, persists stop updates and
/// finally records the exit. A failed tick is logged and skipped.
pub struct PositionMonitor {
    engine: Arc<ExitEngine>,
    source: Arc<dyn BarSource>,
    store: Arc<dyn PositionStore>,
    config: MonitorConfig,
    tz: Tz,
}

impl PositionMonitor {
    pub fn new(
        engine: Arc<ExitEngine>,
        source: Arc<dyn BarSource>,
        store: Arc<dyn PositionStore>,
        config: MonitorConfig,
        tz: Tz,
    ) -> Self {
        Self {
            engine,
            source,
            store,
            config,
            tz,
        }
    }

    /// One monitoring tick of position `id` at `now`.
    pub async fn tick(&self, id: Uuid, now: DateTime<Tz>) -> Result<TickOutcome, SwingError> {
        let position = self.store.get_position(id).await?;
        let exit_config = self.engine.config();
        let to = now.with_timezone(&Utc);
        let from = to - Duration::days(self.config.history_days);

        let stop_bars = self
            .fetch(&position.symbol, exit_config.stop_timeframe, from, to)
            .await?;
        let entry_bars = if exit_config.entry_timeframe == exit_config.stop_timeframe {
            stop_bars.clone()
        } else {
            self.fetch(&position.symbol, exit_config.entry_timeframe, from, to)
                .await?
        };
        let last_price = stop_bars
            .last()
            .map(|b| b.close)
            .ok_or(DataError::NoDataAvailable)?;

        let outcome = self.engine.evaluate(&TickContext {
            position: &position,
            stop_bars: &stop_bars,
            entry_bars: &entry_bars,
            last_price,
            now,
        })?;

        for update in &outcome.stop_updates {
            self.store.apply_stop_update(update).await?;
        }
        if let (true, Some(reason), Some(price)) = (
            outcome.decision.should_exit,
            outcome.decision.reason,
            outcome.decision.exit_price,
        ) {
            self.store.record_exit(id, reason, price).await?;
        }
        Ok(outcome)
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let mut attempt = 0;
        loop {
            match self.source.get_bars(symbol, timeframe, from, to).await {
                Ok(bars) => return Ok(bars),
                Err(e) if attempt < self.config.fetch_retries => {
                    let delay = self.config.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        symbol,
                        %timeframe,
                        source = self.source.name(),
                        attempt = attempt + 1,
                        error = %e,
                        "Bar fetch failed, retrying in {}ms",
                        delay
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Monitor position `id` until it exits or `shutdown` flips to true.
    pub fn spawn(self: &Arc<Self>, id: Uuid, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let period = std::time::Duration::from_secs(monitor.config.poll_interval_secs);
            let mut interval = tokio::time::interval(period);
            info!(position = %id, "Monitoring started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let now = Utc::now().with_timezone(&monitor.tz);
                match monitor.tick(id, now).await {
                    Ok(outcome) if outcome.decision.should_exit => {
                        info!(position = %id, reason = ?outcome.decision.reason, "Position closed");
                        break;
                    }
                    Ok(_) => debug!(position = %id, "Tick complete"),
                    Err(SwingError::Store(e)) => {
                        error!(position = %id, error = %e, "Position store failed, stopping monitor");
                        break;
                    }
                    Err(e) => warn!(position = %id, error = %e, "Tick skipped"),
                }
            }
            info!(position = %id, "Monitoring stopped");
        })
    }

    /// Spawn a task for every open position in the store.
    pub async fn spawn_all(
        self: &Arc<Self>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<JoinHandle<()>>, SwingError> {
        let positions = self.store.open_positions().await?;
        info!(count = positions.len(), "Starting position monitors");
        Ok(positions
            .into_iter()
            .map(|p| self.spawn(p.id, shutdown.clone()))
            .collect())
    }
}

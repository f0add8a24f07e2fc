//! Entry strategies.

use crate::error::StrategyError;
use crate::types::{BarSeries, EntrySignal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings of an entry strategy.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Snapshot of a strategy for logging and reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyState {
    pub name: String,
    pub is_warmed_up: bool,
    pub bars_processed: usize,
    pub signals_generated: usize,
    /// A signal was emitted and its position has not exited yet
    pub in_position: bool,
    /// Latest swing levels and indicator readings by name
    pub indicators: HashMap<String, f64>,
}

/// Produces entry signals from one symbol's bars.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Inspect the newest bar of `series`; returns a signal on a breakout.
    fn on_bar(&mut self, series: &BarSeries) -> Option<EntrySignal>;

    /// The position opened from the last signal has closed.
    fn on_exit(&mut self) {}

    fn reset(&mut self);

    fn state(&self) -> StrategyState;

    /// Bars required before `on_bar` can signal.
    fn warmup_period(&self) -> usize;

    fn is_warmed_up(&self, bars_available: usize) -> bool {
        bars_available >= self.warmup_period()
    }
}

//! Replay report.

use serde::{Deserialize, Serialize};
use swing_core::{Direction, ExitDecision, PositionContext, StopUpdate};

/// A stop update and the tick that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    /// Tick time (Unix milliseconds)
    pub timestamp: i64,
    pub update: StopUpdate,
}

/// Outcome of replaying one position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub initial_stop: f64,
    pub final_stop: f64,
    pub ticks: usize,
    /// Ticks rejected by the engine, e.g. before two bars had closed
    pub skipped_ticks: usize,
    pub stop_trail: Vec<TrailPoint>,
    pub decision: ExitDecision,
    pub exit_timestamp: Option<i64>,
    /// Price of the last replayed tick
    pub last_price: Option<f64>,
    /// Points gained at the exit, or marked at the last price when still open
    pub pnl_points: Option<f64>,
    pub open_at_end: bool,
}

impl ReplayReport {
    pub(crate) fn new(position: &PositionContext) -> Self {
        Self {
            symbol: position.symbol.clone(),
            direction: position.direction,
            entry_price: position.entry_price,
            initial_stop: position.stop_level,
            final_stop: position.stop_level,
            ticks: 0,
            skipped_ticks: 0,
            stop_trail: Vec::new(),
            decision: ExitDecision::hold(),
            exit_timestamp: None,
            last_price: None,
            pnl_points: None,
            open_at_end: true,
        }
    }

    pub(crate) fn finish(
        &mut self,
        position: &PositionContext,
        decision: ExitDecision,
        exit_timestamp: Option<i64>,
    ) {
        self.final_stop = position.stop_level;
        self.decision = decision;
        self.exit_timestamp = exit_timestamp;
        self.open_at_end = !decision.should_exit;
        self.pnl_points = decision
            .exit_price
            .or(self.last_price)
            .map(|price| self.direction.points(self.entry_price, price));
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                      REPLAY REPORT                         \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("POSITION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Symbol:              {}\n", self.symbol));
        s.push_str(&format!("  Direction:           {}\n", self.direction));
        s.push_str(&format!("  Entry Price:         {:.2}\n", self.entry_price));
        s.push_str(&format!("  Initial Stop:        {:.2}\n", self.initial_stop));
        s.push_str(&format!("  Final Stop:          {:.2}\n", self.final_stop));
        s.push('\n');

        s.push_str("STOP TRAIL\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        if self.stop_trail.is_empty() {
            s.push_str("  (no stop updates)\n");
        }
        for point in &self.stop_trail {
            s.push_str(&format!(
                "  {:>15}  {:>10.2} -> {:<10.2} {:?}\n",
                point.timestamp, point.update.previous, point.update.new_stop, point.update.rule
            ));
        }
        s.push('\n');

        s.push_str("RESULT\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        match (self.decision.reason, self.decision.exit_price) {
            (Some(reason), Some(price)) => {
                s.push_str(&format!("  Exit:                {} at {:.2}\n", reason, price));
            }
            _ => s.push_str("  Exit:                OPEN\n"),
        }
        if let Some(pnl) = self.pnl_points {
            s.push_str(&format!("  P&L (points):        {:+.2}\n", pnl));
        }
        s.push_str(&format!(
            "  Ticks:               {} ({} skipped)\n",
            self.ticks, self.skipped_ticks
        ));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

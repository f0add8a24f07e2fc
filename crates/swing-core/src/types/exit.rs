//! Exit decisions produced once per monitoring tick.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StopUpdate;

/// Why a position is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Stoploss,
    Target,
    Holiday,
    RsiTarget,
    Expiry,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Stoploss => "STOPLOSS",
            ExitReason::Target => "TARGET",
            ExitReason::Holiday => "HOLIDAY",
            ExitReason::RsiTarget => "RSI_TARGET",
            ExitReason::Expiry => "EXPIRY",
        };
        write!(f, "{}", s)
    }
}

/// Result of the exit cascade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitDecision {
    pub should_exit: bool,
    pub reason: Option<ExitReason>,
    pub exit_price: Option<f64>,
}

impl ExitDecision {
    /// Keep holding.
    pub fn hold() -> Self {
        Self {
            should_exit: false,
            reason: None,
            exit_price: None,
        }
    }

    /// Close the position.
    pub fn exit(reason: ExitReason, price: f64) -> Self {
        Self {
            should_exit: true,
            reason: Some(reason),
            exit_price: Some(price),
        }
    }
}

impl Default for ExitDecision {
    fn default() -> Self {
        Self::hold()
    }
}

/// Everything one tick asks the caller to apply, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Stop updates, to be persisted before acting on the decision
    pub stop_updates: Vec<StopUpdate>,
    pub decision: ExitDecision,
}

impl TickOutcome {
    /// The stop after all updates of this tick, if any were made.
    pub fn final_stop(&self) -> Option<f64> {
        self.stop_updates.last().map(|u| u.new_stop)
    }
}

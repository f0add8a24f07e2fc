//! Running support, resistance and trend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::SwingLabels;

/// Trend direction derived from closes against support and resistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Unset,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Unset => write!(f, "UNSET"),
        }
    }
}

/// Trend state after one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendState {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub trend: Trend,
}

/// Bar-by-bar fold producing [`TrendState`].
#[derive(Debug, Clone, Default)]
pub struct TrendTracker {
    state: TrendState,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one bar. `pivot` is the price and labels of the confirmed
    /// pivot on this bar, if any.
    pub fn step(&mut self, close: f64, pivot: Option<(f64, SwingLabels)>) -> TrendState {
        let state = &mut self.state;
        let labels = pivot.map(|(_, l)| l).unwrap_or_default();
        let price = pivot.map(|(p, _)| p);

        if let Some(price) = price {
            if labels.lh {
                state.resistance = Some(price);
            }
            if labels.hl {
                state.support = Some(price);
            }
        }

        if state.resistance.is_some_and(|r| close > r) {
            state.trend = Trend::Up;
        } else if state.support.is_some_and(|s| close < s) {
            state.trend = Trend::Down;
        }

        if let Some(price) = price {
            let up = state.trend == Trend::Up;
            let down = state.trend == Trend::Down;
            if (up && labels.hh) || (down && labels.lh) {
                state.resistance = Some(price);
            }
            if (up && labels.hl) || (down && labels.ll) {
                state.support = Some(price);
            }
        }

        *state
    }

    pub fn state(&self) -> TrendState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = TrendState::default();
    }
}

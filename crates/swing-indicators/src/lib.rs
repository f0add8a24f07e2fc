//! Technical indicators used by swing entries and exits.
//!
//! - Momentum: RSI with Wilder or simple rolling smoothing
//! - Volatility: ATR over OHLC bars with RMA, SMA or EMA smoothing

pub mod momentum;
pub mod volatility;

use serde::{Deserialize, Serialize};

pub use momentum::Rsi;
pub use volatility::{true_ranges, Atr};

/// Averaging applied to gains/losses (RSI) or true ranges (ATR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
    /// Wilder's running moving average, seeded with a simple mean
    #[default]
    Rma,
    /// Simple rolling mean over the window
    Sma,
    /// Exponential average with `alpha = 2 / (period + 1)`
    Ema,
}

pub(crate) fn smooth(values: &[f64], period: usize, smoothing: Smoothing) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![];
    }
    let period_f64 = period as f64;
    let mut result = Vec::with_capacity(values.len() - period + 1);

    match smoothing {
        Smoothing::Sma => {
            let mut sum: f64 = values[..period].iter().sum();
            result.push(sum / period_f64);
            for i in period..values.len() {
                sum += values[i] - values[i - period];
                result.push(sum / period_f64);
            }
        }
        Smoothing::Rma | Smoothing::Ema => {
            let alpha = match smoothing {
                Smoothing::Rma => 1.0 / period_f64,
                _ => 2.0 / (period_f64 + 1.0),
            };
            let mut avg: f64 = values[..period].iter().sum::<f64>() / period_f64;
            result.push(avg);
            for &value in &values[period..] {
                avg += alpha * (value - avg);
                result.push(avg);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_window() {
        let out = smooth(&[1.0, 2.0, 3.0, 4.0], 2, Smoothing::Sma);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 1.5).abs() < 1e-9);
        assert!((out[2] - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_rma_matches_wilder() {
        // (prev * (n - 1) + value) / n
        let out = smooth(&[2.0, 4.0, 6.0, 8.0], 2, Smoothing::Rma);
        assert!((out[0] - 3.0).abs() < 1e-9);
        assert!((out[1] - 4.5).abs() < 1e-9);
        assert!((out[2] - 6.25).abs() < 1e-9);
    }

    #[test]
    fn test_too_short() {
        assert!(smooth(&[1.0], 2, Smoothing::Ema).is_empty());
        assert!(smooth(&[1.0], 0, Smoothing::Sma).is_empty());
    }
}

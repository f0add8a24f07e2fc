//! Momentum indicators.

use swing_core::traits::Indicator;
use swing_core::IndicatorError;

use crate::{smooth, Smoothing};

/// Relative Strength Index over closes, 0 to 100.
///
/// Gains and losses are averaged with the chosen [`Smoothing`]; the exit
/// rules compare it against the RSI seen at entry.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: Smoothing,
}

impl Rsi {
    /// Create a new RSI with Wilder smoothing.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_smoothing(period, Smoothing::Rma)
    }

    /// Create a new RSI averaging gains and losses with `smoothing`.
    pub fn with_smoothing(period: usize, smoothing: Smoothing) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI period must be greater than 0".into(),
            ));
        }
        Ok(Self { period, smoothing })
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = data
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let avg_gains = smooth(&gains, self.period, self.smoothing);
        let avg_losses = smooth(&losses, self.period, self.smoothing);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| {
                if loss == 0.0 {
                    // Flat window reads as neutral
                    if gain == 0.0 {
                        50.0
                    } else {
                        100.0
                    }
                } else {
                    100.0 - (100.0 / (1.0 + gain / loss))
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_bounds() {
        let rsi = Rsi::new(14).unwrap();
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&data);
        assert_eq!(result.len(), data.len() - 14);
        for value in &result {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let rsi = Rsi::new(5).unwrap();
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert!((rsi.latest(&data).unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::with_smoothing(5, Smoothing::Sma).unwrap();
        let data = vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert!(rsi.latest(&data).unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_rsi_simple_window() {
        // Changes: +2, -1, +2, -1 -> avg gain 1.0, avg loss 0.5 over 4
        let rsi = Rsi::with_smoothing(4, Smoothing::Sma).unwrap();
        let data = vec![10.0, 12.0, 11.0, 13.0, 12.0];
        let value = rsi.latest(&data).unwrap();
        assert!((value - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_rsi_insufficient() {
        let rsi = Rsi::new(14).unwrap();
        assert!(matches!(
            rsi.latest(&[1.0, 2.0, 3.0]),
            Err(IndicatorError::InsufficientData { required: 15, available: 3 })
        ));
        assert!(Rsi::new(0).is_err());
    }
}

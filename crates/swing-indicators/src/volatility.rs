//! Volatility indicators.

use swing_core::{Bar, IndicatorError};

use crate::{smooth, Smoothing};

/// True range of every bar; the first bar uses its own high-low range.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| bar.true_range(i.checked_sub(1).map(|p| bars[p].close)))
        .collect()
}

/// Average True Range (ATR) over OHLC bars.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    smoothing: Smoothing,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize, smoothing: Smoothing) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "ATR period must be greater than 0".into(),
            ));
        }
        Ok(Self { period, smoothing })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// ATR values from the first full window onward.
    pub fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
        smooth(&true_ranges(bars), self.period, self.smoothing)
    }

    /// ATR at the last bar.
    pub fn latest(&self, bars: &[Bar]) -> Result<f64, IndicatorError> {
        self.calculate_bars(bars)
            .pop()
            .ok_or(IndicatorError::InsufficientData {
                required: self.period,
                available: bars.len(),
            })
    }
}

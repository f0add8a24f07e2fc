//! Price-series indicators.

use crate::error::IndicatorError;

/// An indicator computed over closes.
pub trait Indicator: Send + Sync {
    type Output;

    /// One value per full window, oldest first. Empty when `data` is
    /// shorter than [`Indicator::period`].
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Data points needed for the first value.
    fn period(&self) -> usize;

    fn name(&self) -> &str;

    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        match data.len() {
            n if n >= self.period() => Ok(()),
            available => Err(IndicatorError::InsufficientData {
                required: self.period(),
                available,
            }),
        }
    }

    /// Reading at the newest data point.
    fn latest(&self, data: &[f64]) -> Result<Self::Output, IndicatorError> {
        self.validate_data(data)?;
        let insufficient = IndicatorError::InsufficientData {
            required: self.period(),
            available: data.len(),
        };
        self.calculate(data).pop().ok_or(insufficient)
    }
}

//! Bars and bar series.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::Timeframe;
use crate::error::DataError;

/// Compact OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Bar {
    /// Bar open time, Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High minus low.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Get the open time as a UTC DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Get the open time in the given exchange timezone.
    pub fn local_time(&self, tz: &Tz) -> DateTime<Tz> {
        self.datetime().with_timezone(tz)
    }

    /// Close time of this bar for the given timeframe.
    pub fn close_time(&self, timeframe: Timeframe) -> DateTime<Utc> {
        self.datetime() + timeframe.duration()
    }

    /// Whether this bar has fully closed at `now`.
    pub fn is_closed_at(&self, timeframe: Timeframe, now: DateTime<Utc>) -> bool {
        self.close_time(timeframe) <= now
    }

    /// True range against the previous close, if any.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }

    fn check(&self, index: usize) -> Result<(), DataError> {
        let fields = [self.open, self.high, self.low, self.close];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(DataError::InvalidBar {
                index,
                reason: "non-finite price".into(),
            });
        }
        if self.high < self.low {
            return Err(DataError::InvalidBar {
                index,
                reason: format!("high {} below low {}", self.high, self.low),
            });
        }
        Ok(())
    }
}

/// Validate a bar sequence: non-empty, finite coherent OHLC, strictly
/// ascending timestamps.
pub fn validate_bars(bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::Empty);
    }
    for (index, bar) in bars.iter().enumerate() {
        bar.check(index)?;
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(DataError::NonMonotonicTimestamp { index });
        }
    }
    Ok(())
}

/// Time-series container for bars of one symbol and timeframe.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
    /// 0 = unbounded
    capacity: usize,
}

impl BarSeries {
    /// Empty, unbounded series.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::new(),
            capacity: 0,
        }
    }

    /// Series holding at most `capacity` bars; 0 means unbounded.
    pub fn with_capacity(symbol: impl Into<String>, timeframe: Timeframe, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a series from already validated bars.
    pub fn from_bars(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<Self, DataError> {
        validate_bars(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            bars,
            capacity: 0,
        })
    }

    /// Append `bar`, dropping the oldest once the series is full.
    ///
    /// Bars that do not advance the timestamp are rejected.
    pub fn push(&mut self, bar: Bar) -> Result<(), DataError> {
        if let Some(last) = self.bars.last() {
            if bar.timestamp <= last.timestamp {
                return Err(DataError::NonMonotonicTimestamp {
                    index: self.bars.len(),
                });
            }
        }
        if self.capacity > 0 && self.bars.len() >= self.capacity {
            self.bars.remove(0);
        }
        self.bars.push(bar);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the last N bars.
    pub fn last_n(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Closes, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_true_range() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!((bar.true_range(None) - 15.0).abs() < 0.001);
        // Gap from previous close widens the range
        assert!((bar.true_range(Some(90.0)) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_bar_closed_at() {
        let bar = Bar::new(0, 1.0, 1.0, 1.0, 1.0, 0.0);
        let closes_at = DateTime::from_timestamp(300, 0).unwrap();
        assert!(bar.is_closed_at(Timeframe::Minute5, closes_at));
        assert!(!bar.is_closed_at(Timeframe::Minute5, closes_at - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_validate_bars() {
        assert_eq!(validate_bars(&[]), Err(DataError::Empty));

        let ok = vec![
            Bar::new(1, 100.0, 101.0, 99.0, 100.5, 0.0),
            Bar::new(2, 100.5, 102.0, 100.0, 101.5, 0.0),
        ];
        assert!(validate_bars(&ok).is_ok());

        let unordered = vec![ok[1], ok[0]];
        assert_eq!(
            validate_bars(&unordered),
            Err(DataError::NonMonotonicTimestamp { index: 1 })
        );

        let inverted = vec![Bar::new(1, 100.0, 99.0, 101.0, 100.0, 0.0)];
        assert!(matches!(
            validate_bars(&inverted),
            Err(DataError::InvalidBar { index: 0, .. })
        ));

        let nan = vec![Bar::new(1, f64::NAN, 101.0, 99.0, 100.0, 0.0)];
        assert!(validate_bars(&nan).is_err());
    }

    #[test]
    fn test_bar_series_capacity() {
        let mut series = BarSeries::with_capacity("NIFTY", Timeframe::Minute5, 3);

        series.push(Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0)).unwrap();
        series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 1000.0)).unwrap();
        series.push(Bar::new(3, 101.5, 103.0, 101.0, 102.5, 1000.0)).unwrap();
        assert_eq!(series.len(), 3);

        series.push(Bar::new(4, 102.5, 104.0, 102.0, 103.5, 1000.0)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[0].timestamp, 2);
        assert_eq!(series.last_n(2).len(), 2);
    }

    #[test]
    fn test_bar_series_rejects_stale_bar() {
        let mut series = BarSeries::new("NIFTY", Timeframe::Minute5);
        series.push(Bar::new(5, 100.0, 101.0, 99.0, 100.5, 0.0)).unwrap();
        assert!(series.push(Bar::new(5, 100.0, 101.0, 99.0, 100.5, 0.0)).is_err());
        assert_eq!(series.closes(), vec![100.5]);
    }
}

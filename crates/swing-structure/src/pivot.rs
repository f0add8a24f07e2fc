//! Raw pivot detection.

use serde::{Deserialize, Serialize};
use swing_core::{Bar, ConfigError, DataError};

use crate::config::PivotConfig;

/// Whether a pivot marks a local high or a local low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotKind {
    High,
    Low,
}

impl PivotKind {
    pub fn opposite(&self) -> Self {
        match self {
            PivotKind::High => PivotKind::Low,
            PivotKind::Low => PivotKind::High,
        }
    }
}

/// A pivot at a bar index, priced at that bar's high or low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub kind: PivotKind,
}

impl Pivot {
    pub fn high(index: usize, price: f64) -> Self {
        Self {
            index,
            price,
            kind: PivotKind::High,
        }
    }

    pub fn low(index: usize, price: f64) -> Self {
        Self {
            index,
            price,
            kind: PivotKind::Low,
        }
    }

    pub fn is_high(&self) -> bool {
        self.kind == PivotKind::High
    }
}

/// Raw detector output.
pub type PivotCandidate = Pivot;

/// A pivot that survived zigzag filtering.
pub type ConfirmedPivot = Pivot;

/// Raw high/low flags of one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotFlags {
    pub high: bool,
    pub low: bool,
}

impl PivotFlags {
    pub fn any(&self) -> bool {
        self.high || self.low
    }
}

/// Flags bars whose high (low) is the leftmost maximum (minimum) of the
/// surrounding `[i - left_bars, i + right_bars]` window.
#[derive(Debug, Clone, Copy)]
pub struct PivotDetector {
    config: PivotConfig,
}

impl PivotDetector {
    pub fn new(config: PivotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PivotConfig {
        &self.config
    }

    /// Per-bar flags. The first `left_bars` and last `right_bars` bars are
    /// never flagged.
    pub fn flags(&self, bars: &[Bar]) -> Result<Vec<PivotFlags>, DataError> {
        let required = self.config.min_bars();
        if bars.len() < required {
            return Err(DataError::InsufficientBars {
                required,
                available: bars.len(),
            });
        }

        let PivotConfig {
            left_bars,
            right_bars,
        } = self.config;
        let mut flags = vec![PivotFlags::default(); bars.len()];

        for i in left_bars..bars.len() - right_bars {
            let before = &bars[i - left_bars..i];
            let after = &bars[i + 1..=i + right_bars];
            let bar = &bars[i];

            // Strict against the left side, loose against the right: the
            // leftmost bar holding the extreme wins ties.
            flags[i].high = before.iter().all(|b| bar.high > b.high)
                && after.iter().all(|b| bar.high >= b.high);
            flags[i].low = before.iter().all(|b| bar.low < b.low)
                && after.iter().all(|b| bar.low <= b.low);
        }

        Ok(flags)
    }

    /// One candidate per flagged bar, in bar order. A bar flagged both ways
    /// yields its high.
    pub fn candidates(&self, bars: &[Bar]) -> Result<Vec<PivotCandidate>, DataError> {
        let flags = self.flags(bars)?;
        Ok(Self::candidates_from_flags(bars, &flags))
    }

    pub(crate) fn candidates_from_flags(bars: &[Bar], flags: &[PivotFlags]) -> Vec<PivotCandidate> {
        flags
            .iter()
            .zip(bars)
            .enumerate()
            .filter_map(|(i, (f, bar))| {
                if f.high {
                    Some(Pivot::high(i, bar.high))
                } else if f.low {
                    Some(Pivot::low(i, bar.low))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Last bar index whose pivot status can no longer change.
    pub fn confirmed_through(&self, len: usize) -> Option<usize> {
        len.checked_sub(self.config.right_bars + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_from_highs(highs: &[f64]) -> Vec<Bar> {
        highs
            .iter()
            .enumerate()
            .map(|(i, &h)| Bar::new(i as i64, h - 0.5, h, h - 1.0, h - 0.5, 0.0))
            .collect()
    }

    fn detector(left: usize, right: usize) -> PivotDetector {
        PivotDetector::new(PivotConfig::new(left, right).unwrap()).unwrap()
    }

    #[test]
    fn test_leftmost_tie_break() {
        let bars = bars_from_highs(&[5.0, 7.0, 7.0, 6.0]);
        let flags = detector(1, 1).flags(&bars).unwrap();

        assert!(flags[1].high);
        assert!(!flags[2].high);
    }

    #[test]
    fn test_edges_never_flagged() {
        let bars = bars_from_highs(&[9.0, 1.0, 2.0, 3.0, 2.0, 1.0, 9.0]);
        let flags = detector(2, 2).flags(&bars).unwrap();

        assert!(!flags[0].any());
        assert!(!flags[6].any());
        assert!(flags[3].high);
    }

    #[test]
    fn test_low_pivot() {
        let bars = bars_from_highs(&[10.0, 9.0, 8.0, 9.0, 10.0]);
        let candidates = detector(2, 2).candidates(&bars).unwrap();

        assert_eq!(candidates, vec![Pivot::low(2, 7.0)]);
    }

    #[test]
    fn test_both_flags_yield_high() {
        // An outside bar dominates both sides of a 1/1 window
        let bars = vec![
            Bar::new(0, 10.0, 11.0, 9.0, 10.0, 0.0),
            Bar::new(1, 10.0, 15.0, 5.0, 10.0, 0.0),
            Bar::new(2, 10.0, 11.0, 9.0, 10.0, 0.0),
        ];
        let d = detector(1, 1);
        let flags = d.flags(&bars).unwrap();
        assert!(flags[1].high && flags[1].low);

        let candidates = d.candidates(&bars).unwrap();
        assert_eq!(candidates, vec![Pivot::high(1, 15.0)]);
    }

    #[test]
    fn test_insufficient_bars() {
        let bars = bars_from_highs(&[1.0, 2.0, 3.0]);
        assert_eq!(
            detector(2, 2).flags(&bars),
            Err(DataError::InsufficientBars {
                required: 5,
                available: 3
            })
        );
    }

    #[test]
    fn test_confirmed_through() {
        let d = detector(3, 2);
        assert_eq!(d.confirmed_through(10), Some(7));
        assert_eq!(d.confirmed_through(2), None);
    }
}

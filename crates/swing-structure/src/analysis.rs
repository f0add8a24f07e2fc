//! The full swing pipeline over one bar sequence.

use serde::{Deserialize, Serialize};
use swing_core::{validate_bars, Bar, ConfigError, DataError};

use crate::classifier::{SwingClassifier, SwingLabels};
use crate::config::PivotConfig;
use crate::pivot::{ConfirmedPivot, PivotDetector, PivotFlags, PivotKind};
use crate::trend::{TrendState, TrendTracker};
use crate::zigzag::ZigzagFilter;

/// A confirmed pivot with its labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledPivot {
    pub pivot: ConfirmedPivot,
    pub labels: SwingLabels,
    /// Open time of the pivot bar (Unix milliseconds)
    pub timestamp: i64,
}

/// Per-bar result of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingBar {
    pub timestamp: i64,
    pub close: f64,
    pub flags: PivotFlags,
    pub pivot: Option<LabeledPivot>,
    pub trend: TrendState,
}

/// Price and time of a labelled swing point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub timestamp: i64,
    pub price: f64,
}

/// Most recent pivot carrying each label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingPoints {
    pub hh: Option<SwingPoint>,
    pub ll: Option<SwingPoint>,
    pub hl: Option<SwingPoint>,
    pub lh: Option<SwingPoint>,
}

/// Swing structure of a bar sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingAnalysis {
    bars: Vec<SwingBar>,
    pivots: Vec<LabeledPivot>,
    confirmed_through: Option<usize>,
}

impl SwingAnalysis {
    pub fn bars(&self) -> &[SwingBar] {
        &self.bars
    }

    /// Confirmed pivots in bar order, each labelled when it was emitted.
    pub fn pivots(&self) -> &[LabeledPivot] {
        &self.pivots
    }

    /// Last bar index whose pivot status is final. Later bars may still
    /// become pivots once more bars arrive.
    pub fn confirmed_through(&self) -> Option<usize> {
        self.confirmed_through
    }

    /// Trend state after the last bar.
    pub fn final_trend(&self) -> TrendState {
        self.bars.last().map(|b| b.trend).unwrap_or_default()
    }

    /// Latest confirmed pivot of the given kind.
    pub fn latest_pivot(&self, kind: PivotKind) -> Option<&LabeledPivot> {
        self.pivots.iter().rev().find(|p| p.pivot.kind == kind)
    }

    /// Latest pivot for each of the four labels.
    pub fn last_swing_points(&self) -> SwingPoints {
        let latest = |pred: fn(&SwingLabels) -> bool| {
            self.pivots
                .iter()
                .rev()
                .find(|p| pred(&p.labels))
                .map(|p| SwingPoint {
                    index: p.pivot.index,
                    timestamp: p.timestamp,
                    price: p.pivot.price,
                })
        };

        SwingPoints {
            hh: latest(|l| l.hh),
            ll: latest(|l| l.ll),
            hl: latest(|l| l.hl),
            lh: latest(|l| l.lh),
        }
    }
}

/// Runs detector, zigzag, classifier and trend fold in order.
#[derive(Debug, Clone, Copy)]
pub struct SwingAnalyzer {
    detector: PivotDetector,
}

impl SwingAnalyzer {
    pub fn new(config: PivotConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            detector: PivotDetector::new(config)?,
        })
    }

    pub fn config(&self) -> &PivotConfig {
        self.detector.config()
    }

    /// Analyse validated bars, oldest first.
    pub fn analyze(&self, bars: &[Bar]) -> Result<SwingAnalysis, DataError> {
        validate_bars(bars)?;
        let flags = self.detector.flags(bars)?;
        let candidates = PivotDetector::candidates_from_flags(bars, &flags);
        let confirmed = ZigzagFilter::filter(&candidates);

        let mut classifier = SwingClassifier::new();
        let pivots: Vec<LabeledPivot> = confirmed
            .into_iter()
            .map(|pivot| LabeledPivot {
                labels: classifier.classify(pivot),
                timestamp: bars[pivot.index].timestamp,
                pivot,
            })
            .collect();

        let mut tracker = TrendTracker::new();
        let mut next = pivots.iter().peekable();
        let swing_bars = bars
            .iter()
            .zip(flags)
            .enumerate()
            .map(|(i, (bar, flags))| {
                let pivot = next.next_if(|p| p.pivot.index == i).copied();
                let trend = tracker.step(bar.close, pivot.map(|p| (p.pivot.price, p.labels)));
                SwingBar {
                    timestamp: bar.timestamp,
                    close: bar.close,
                    flags,
                    pivot,
                    trend,
                }
            })
            .collect();

        Ok(SwingAnalysis {
            bars: swing_bars,
            pivots,
            confirmed_through: self.detector.confirmed_through(bars.len()),
        })
    }
}

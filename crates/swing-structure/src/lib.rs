//! Swing structure of a bar sequence.
//!
//! The pipeline runs left to right over validated bars:
//! - [`PivotDetector`] flags raw local extrema with leftmost tie-breaking
//! - [`ZigzagFilter`] prunes candidates into an append-only pivot stream
//! - [`SwingClassifier`] labels each pivot HH, LH, HL or LL
//! - [`TrendTracker`] folds labels and closes into support, resistance and trend
//!
//! [`SwingAnalyzer`] chains all four and returns a [`SwingAnalysis`].

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod pivot;
pub mod trend;
pub mod zigzag;

pub use analysis::{LabeledPivot, SwingAnalysis, SwingAnalyzer, SwingBar, SwingPoint, SwingPoints};
pub use classifier::{SwingClassifier, SwingLabels};
pub use config::PivotConfig;
pub use pivot::{ConfirmedPivot, Pivot, PivotCandidate, PivotDetector, PivotFlags, PivotKind};
pub use trend::{Trend, TrendState, TrendTracker};
pub use zigzag::{ZigzagFilter, ZigzagStep};

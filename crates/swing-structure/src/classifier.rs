//! HH / LH / HL / LL labelling of confirmed pivots.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::pivot::{ConfirmedPivot, PivotKind};

/// Prior pivots retained for the backward walk.
const HISTORY: usize = 8;

/// Swing labels of one pivot. Computed independently; more than one may
/// be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingLabels {
    /// Higher high
    pub hh: bool,
    /// Lower high
    pub lh: bool,
    /// Higher low
    pub hl: bool,
    /// Lower low
    pub ll: bool,
}

impl SwingLabels {
    pub fn any(&self) -> bool {
        self.hh || self.lh || self.hl || self.ll
    }

    /// Short names of the labels that are set, e.g. `["HL", "LH"]`.
    pub fn names(&self) -> Vec<&'static str> {
        [(self.hh, "HH"), (self.lh, "LH"), (self.hl, "HL"), (self.ll, "LL")]
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect()
    }
}

/// Labels each pivot against the four before it.
///
/// Keeps a bounded history of the pivots it has seen. For a pivot `a` the
/// operands `b, c, d, e` are found by walking backward, looking for the
/// kinds `a` expects in alternation and skipping pivots of the wrong kind.
#[derive(Debug, Clone)]
pub struct SwingClassifier {
    history: VecDeque<ConfirmedPivot>,
}

impl Default for SwingClassifier {
    fn default() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY),
        }
    }
}

impl SwingClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label `pivot`, then add it to the history.
    pub fn classify(&mut self, pivot: ConfirmedPivot) -> SwingLabels {
        let [b, c, d, e] = self.predecessors(pivot.kind);
        let labels = label(pivot.price, b, c, d, e);

        if self.history.len() == HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(pivot);
        labels
    }

    fn predecessors(&self, kind: PivotKind) -> [Option<f64>; 4] {
        let mut found = [None; 4];
        let mut expected = kind.opposite();
        let mut walk = self.history.iter().rev();

        for slot in found.iter_mut() {
            match walk.by_ref().find(|p| p.kind == expected) {
                Some(p) => *slot = Some(p.price),
                None => break,
            }
            expected = expected.opposite();
        }
        found
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

fn label(a: f64, b: Option<f64>, c: Option<f64>, d: Option<f64>, e: Option<f64>) -> SwingLabels {
    let mut labels = SwingLabels::default();
    let (Some(b), Some(c), Some(d)) = (b, c, d) else {
        return labels;
    };

    labels.hh = a > b && a > c && c > b && c > d;
    labels.ll = a < b && a < c && c < b && c < d;

    let hl_full = e.is_some_and(|e| a >= c && b > c && b > d && d > c && d > e);
    labels.hl = hl_full || (a < b && a > c && b < d);

    let lh_full = e.is_some_and(|e| a <= c && b < c && b < d && d < c && d < e);
    labels.lh = lh_full || (a > b && a < c && b > d);

    labels
}

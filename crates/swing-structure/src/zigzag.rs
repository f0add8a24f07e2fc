//! Zigzag filtering of raw pivot candidates.
//!
//! The filter keeps one "last surviving" pivot and decides each candidate
//! against it, left to right:
//!
//! | candidate | last | outcome |
//! |-----------|------|---------|
//! | low  | low  | discarded if above the last low, else appended |
//! | high | high | discarded if below the last high, else appended |
//! | low  | high | discarded if above the high, else appended |
//! | high | low  | discarded if below the low, else appended |
//!
//! Surviving pivots are never withdrawn, so the stream is append-only and
//! each pivot can be labelled the moment it is emitted. Two pivots of the
//! same kind may follow each other; the later one is at least as extreme.

use crate::pivot::{ConfirmedPivot, PivotCandidate, PivotKind};

/// What the filter did with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZigzagStep {
    /// Candidate dropped; the stream is unchanged.
    Discarded,
    /// Candidate appended as the newest pivot.
    Appended,
}

/// Streaming zigzag filter.
#[derive(Debug, Clone, Default)]
pub struct ZigzagFilter {
    pivots: Vec<ConfirmedPivot>,
}

impl ZigzagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter a whole candidate sequence.
    pub fn filter(candidates: &[PivotCandidate]) -> Vec<ConfirmedPivot> {
        let mut zigzag = Self::new();
        for candidate in candidates {
            zigzag.push(*candidate);
        }
        zigzag.into_pivots()
    }

    /// Decide one candidate. Candidates must arrive in bar order.
    pub fn push(&mut self, candidate: PivotCandidate) -> ZigzagStep {
        if let Some(last) = self.pivots.last() {
            // Same test whatever the last kind: a low may not sit above the
            // last pivot, a high may not sit below it.
            let discard = match candidate.kind {
                PivotKind::Low => candidate.price > last.price,
                PivotKind::High => candidate.price < last.price,
            };
            if discard {
                return ZigzagStep::Discarded;
            }
        }
        self.pivots.push(candidate);
        ZigzagStep::Appended
    }

    pub fn last(&self) -> Option<&ConfirmedPivot> {
        self.pivots.last()
    }

    pub fn pivots(&self) -> &[ConfirmedPivot] {
        &self.pivots
    }

    pub fn into_pivots(self) -> Vec<ConfirmedPivot> {
        self.pivots
    }
}

//! Exit replay over recorded bars.
//!
//! Walks a bar history one close at a time, running the exit cascade for a
//! single position as a live monitor would.

mod engine;
mod report;

pub use engine::ReplayEngine;
pub use report::{ReplayReport, TrailPoint};

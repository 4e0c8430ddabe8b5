//! # Frequency Capping
//!
//! Impression counters per experience, per cap scope, per time window.

mod counter;
mod tracker;

pub use counter::{CounterRecord, CounterScope, CounterSnapshot};
pub use tracker::FrequencyTracker;

//! # Decisions
//!
//! Turns a registry snapshot, counter state and a context into an
//! explainable [`Decision`].

mod builder;
mod model;
mod trace;

pub use builder::{DecisionBuilder, EvaluationMode, NO_EXPERIENCES};
pub use model::{Decision, DecisionMetadata, TraceStep};
pub use trace::{TraceRecorder, Traced};

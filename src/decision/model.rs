//! # Decision Model
//!
//! The auditable output of an evaluation:
//! - show / hide verdict and the chosen experience
//! - ordered, human-readable reasons
//! - ordered trace steps, one per unit of evaluation work
//! - the normalized context and timing metadata
//!
//! Decisions are immutable once returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::context::Context;

/// One timed, pass/fail-tagged unit of evaluation work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Step name, e.g. `welcome:url`
    pub step: String,
    /// When the step started
    pub timestamp: DateTime<Utc>,
    /// Wall time spent in the step
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub passed: bool,
}

/// Timing and volume of an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMetadata {
    pub evaluated_at: DateTime<Utc>,
    /// Sum of all trace step durations
    pub total_duration_ms: f64,
    /// Candidates whose rules actually ran
    pub experiences_evaluated: usize,
    /// True for `explain`: no impression was recorded
    #[serde(default)]
    pub dry_run: bool,
}

/// Result of `evaluate` or `explain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_id: Option<String>,
    pub reasons: Vec<String>,
    pub trace: Vec<TraceStep>,
    pub context: Context,
    pub metadata: DecisionMetadata,
}

impl Decision {
    /// Find a trace step by exact name
    pub fn step(&self, name: &str) -> Option<&TraceStep> {
        self.trace.iter().find(|s| s.step == name)
    }

    /// Trace steps belonging to one experience, in execution order
    pub fn steps_for<'a>(&'a self, experience_id: &'a str) -> impl Iterator<Item = &'a TraceStep> + 'a {
        self.trace.iter().filter(move |s| {
            s.step
                .strip_prefix(experience_id)
                .map(|rest| rest.starts_with(':'))
                .unwrap_or(false)
        })
    }
}

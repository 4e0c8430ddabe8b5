//! # Trace Recorder
//!
//! Step accumulator threaded through a decision. Every unit of work runs
//! inside `record`, which times it and appends exactly one step. Steps
//! are never reordered or removed.

use serde::Serialize;
use serde_json::Value;

use super::model::TraceStep;
use crate::clock::Clock;
use crate::context::Context;
use crate::observability::Timer;
use crate::rules::RuleOutcome;

/// Something a trace step can report on
pub trait Traced {
    /// Whether the step passed
    fn passed(&self) -> bool;
    /// Step output snapshot
    fn output(&self) -> Option<Value>;
}

impl Traced for RuleOutcome {
    fn passed(&self) -> bool {
        self.is_passed()
    }

    fn output(&self) -> Option<Value> {
        serde_json::to_value(self).ok()
    }
}

impl Traced for Context {
    fn passed(&self) -> bool {
        true
    }

    fn output(&self) -> Option<Value> {
        serde_json::to_value(self).ok()
    }
}

/// Append-only accumulator of trace steps
pub struct TraceRecorder<'a> {
    clock: &'a dyn Clock,
    steps: Vec<TraceStep>,
}

impl<'a> TraceRecorder<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            steps: Vec::new(),
        }
    }

    /// Run `work`, time it and append one step describing it
    pub fn record<T: Traced>(
        &mut self,
        step: impl Into<String>,
        input: Option<Value>,
        work: impl FnOnce() -> T,
    ) -> T {
        let timestamp = self.clock.now();
        let timer = Timer::new();
        let result = work();
        let duration_ms = timer.elapsed_ms();

        self.steps.push(TraceStep {
            step: step.into(),
            timestamp,
            duration_ms,
            input,
            output: result.output(),
            passed: result.passed(),
        });
        result
    }

    /// Number of steps so far
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Finish and hand over the steps in execution order
    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

/// Serialize a step input, dropping it if it cannot be represented
pub(crate) fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

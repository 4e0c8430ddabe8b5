//! # Decision Builder
//!
//! Orchestrates one evaluation:
//! 1. Normalize the context (traced)
//! 2. Walk candidates in the order given; run URL, targeting frequency and
//!    experience frequency checks, stopping at the first failure
//! 3. First fully-passing candidate wins; the rest are not evaluated
//! 4. In live mode, record an impression for each cap the winner carries
//!
//! The builder holds no state of its own. Given the same registry
//! snapshot, counters and context it reaches the same verdict.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::model::{Decision, DecisionMetadata};
use super::trace::{snapshot, TraceRecorder, Traced};
use crate::clock::Clock;
use crate::context::{Context, ContextDefaults, PartialContext};
use crate::experience::{Experience, FrequencyRule, FrequencyWindow, UrlRule};
use crate::frequency::{CounterScope, CounterSnapshot, FrequencyTracker};
use crate::rules::{evaluate_frequency_rule, evaluate_url_rule, RuleOutcome};

/// Reason given when there is nothing to evaluate
pub const NO_EXPERIENCES: &str = "no experiences registered";

/// Whether a winning decision consumes frequency caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// `evaluate`: record impressions for the winner
    Live,
    /// `explain`: never touch counters
    DryRun,
}

/// One rule check of a candidate
#[derive(Debug, Clone, Copy)]
enum Check<'e> {
    Url(&'e UrlRule),
    Frequency {
        rule: &'e FrequencyRule,
        scope: CounterScope,
    },
}

impl Check<'_> {
    fn step_name(&self, experience_id: &str) -> String {
        match self {
            Check::Url(_) => format!("{}:url", experience_id),
            Check::Frequency {
                scope: CounterScope::Targeting,
                ..
            } => format!("{}:targeting-frequency", experience_id),
            Check::Frequency {
                scope: CounterScope::Experience,
                ..
            } => format!("{}:frequency", experience_id),
        }
    }
}

/// Checks of an experience in evaluation order
fn checks(experience: &Experience) -> Vec<Check<'_>> {
    let mut checks = Vec::with_capacity(3);
    if let Some(targeting) = experience.targeting() {
        if let Some(url) = &targeting.url {
            checks.push(Check::Url(url));
        }
        if let Some(rule) = &targeting.frequency {
            checks.push(Check::Frequency {
                rule,
                scope: CounterScope::Targeting,
            });
        }
    }
    if let Some(rule) = experience.frequency() {
        checks.push(Check::Frequency {
            rule,
            scope: CounterScope::Experience,
        });
    }
    checks
}

/// Frequency check result with the counter it was judged against
#[derive(Debug, Serialize)]
struct FrequencyCheck {
    #[serde(flatten)]
    outcome: RuleOutcome,
    counter: CounterSnapshot,
}

impl Traced for FrequencyCheck {
    fn passed(&self) -> bool {
        self.outcome.is_passed()
    }

    fn output(&self) -> Option<Value> {
        serde_json::to_value(self).ok()
    }
}

/// Counter state after the winner's impressions were recorded
#[derive(Debug, Serialize)]
struct RecordedImpression {
    scope: CounterScope,
    window: FrequencyWindow,
    count: u32,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct RecordedImpressions(Vec<RecordedImpression>);

impl Traced for RecordedImpressions {
    fn passed(&self) -> bool {
        true
    }

    fn output(&self) -> Option<Value> {
        serde_json::to_value(self).ok()
    }
}

/// Verdict on a single candidate
enum Verdict {
    /// Every check passed; one `✅` line per check
    Qualified(Vec<String>),
    /// The decisive failing check, as a `❌` line
    Rejected(String),
}

/// Builds decisions from a candidate list, counters and context
pub struct DecisionBuilder<'a> {
    tracker: &'a FrequencyTracker,
    clock: &'a dyn Clock,
    default_url: Option<String>,
    diagnostics: bool,
}

impl<'a> DecisionBuilder<'a> {
    pub fn new(tracker: &'a FrequencyTracker, clock: &'a dyn Clock) -> Self {
        Self {
            tracker,
            clock,
            default_url: None,
            diagnostics: false,
        }
    }

    /// URL used when the caller's context has none
    pub fn with_default_url(mut self, url: Option<String>) -> Self {
        self.default_url = url;
        self
    }

    /// Include rejected candidates' reasons in winning decisions
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Evaluate `candidates`, already in priority order, and pick the first
    /// that qualifies.
    pub fn evaluate(
        &self,
        candidates: &[&Experience],
        partial: PartialContext,
        mode: EvaluationMode,
    ) -> Decision {
        let mut trace = TraceRecorder::new(self.clock);

        let defaults = ContextDefaults {
            url: self.default_url.clone(),
            timestamp: self.clock.now(),
        };
        let input = snapshot(&partial);
        let context = trace.record("context-normalization", input, || {
            partial.normalize(&defaults)
        });

        let mut rejected = Vec::new();
        let mut evaluated = 0;
        let mut winner = None;

        for experience in candidates {
            evaluated += 1;
            match self.run_checks(experience, &context, &mut trace) {
                Verdict::Qualified(lines) => {
                    winner = Some((*experience, lines));
                    break;
                }
                Verdict::Rejected(line) => rejected.push(line),
            }
        }

        let (show, experience_id, reasons) = match winner {
            Some((experience, lines)) => {
                if mode == EvaluationMode::Live {
                    self.record_impressions(experience, &mut trace);
                }
                let mut reasons = if self.diagnostics { rejected } else { Vec::new() };
                reasons.extend(lines);
                (true, Some(experience.id.clone()), reasons)
            }
            None if candidates.is_empty() => (false, None, vec![NO_EXPERIENCES.to_string()]),
            None => (false, None, rejected),
        };

        let steps = trace.into_steps();
        let total_duration_ms: f64 = steps.iter().map(|s| s.duration_ms).sum();

        Decision {
            id: Uuid::new_v4(),
            show,
            experience_id,
            reasons,
            trace: steps,
            context,
            metadata: DecisionMetadata {
                evaluated_at: self.clock.now(),
                total_duration_ms,
                experiences_evaluated: evaluated,
                dry_run: mode == EvaluationMode::DryRun,
            },
        }
    }

    /// Run the full pipeline against one experience without touching
    /// counters
    pub fn explain(&self, experience: &Experience, partial: PartialContext) -> Decision {
        self.evaluate(&[experience], partial, EvaluationMode::DryRun)
    }

    fn run_checks(
        &self,
        experience: &Experience,
        context: &Context,
        trace: &mut TraceRecorder<'_>,
    ) -> Verdict {
        let id = experience.id.as_str();
        let checks = checks(experience);

        if checks.is_empty() {
            return Verdict::Qualified(vec![format!("✅ {}: no targeting rules", id)]);
        }

        let mut lines = Vec::with_capacity(checks.len());
        for check in checks {
            let name = check.step_name(id);
            let outcome = match check {
                Check::Url(rule) => {
                    let input = json!({ "rule": rule, "url": context.url() });
                    trace.record(name, Some(input), || evaluate_url_rule(rule, context))
                }
                Check::Frequency { rule, scope } => {
                    let input = json!({ "rule": rule, "scope": scope });
                    trace
                        .record(name, Some(input), || {
                            let counter = self.tracker.snapshot(id, scope, rule.per);
                            FrequencyCheck {
                                outcome: evaluate_frequency_rule(rule, &counter),
                                counter,
                            }
                        })
                        .outcome
                }
            };

            let line = format!("{} {}: {}", outcome.marker(), id, outcome.reason());
            if !outcome.is_passed() {
                return Verdict::Rejected(line);
            }
            lines.push(line);
        }

        Verdict::Qualified(lines)
    }

    fn record_impressions(&self, experience: &Experience, trace: &mut TraceRecorder<'_>) {
        let id = experience.id.as_str();
        let caps: Vec<(CounterScope, FrequencyWindow)> = checks(experience)
            .into_iter()
            .filter_map(|check| match check {
                Check::Frequency { rule, scope } => Some((scope, rule.per)),
                Check::Url(_) => None,
            })
            .collect();

        if caps.is_empty() {
            return;
        }

        let input = snapshot(&caps);
        trace.record(format!("{}:record-impression", id), input, || {
            RecordedImpressions(
                caps.iter()
                    .map(|&(scope, window)| RecordedImpression {
                        scope,
                        window,
                        count: self.tracker.record_impression(id, scope, window).count,
                    })
                    .collect(),
            )
        });
    }
}

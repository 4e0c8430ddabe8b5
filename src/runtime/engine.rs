//! # Runtime
//!
//! Owns the registry, counter tracker, decision history and event bus for
//! one engine instance. Instances share nothing: two runtimes over two
//! accessors (or two namespaces) never see each other's counters.
//!
//! `evaluate` holds the state lock for the whole read-check-record
//! sequence, so concurrent calls cannot both pass a cap before either
//! records. Events are emitted after the lock is released.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::config::EngineConfig;
use super::consumer::ConsumerStorage;
use super::errors::{EngineError, EngineResult};
use super::events::{EventBus, EventKind, RuntimeEvent, Subscription};
use super::state::RuntimeState;
use crate::clock::{Clock, SystemClock};
use crate::context::PartialContext;
use crate::decision::{Decision, DecisionBuilder, EvaluationMode};
use crate::experience::{
    validate_id, Experience, ExperienceDefinition, ExperienceRegistry, FrequencyRule,
    FrequencyWindow, Registration,
};
use crate::frequency::{CounterScope, FrequencyTracker};
use crate::observability::{log_event_with_fields, LogEvent};
use crate::storage::{MemoryStorage, StorageAccessor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Ready,
}

#[derive(Debug)]
struct RuntimeInner {
    lifecycle: Lifecycle,
    config: EngineConfig,
    registry: ExperienceRegistry,
    tracker: FrequencyTracker,
    history: VecDeque<Decision>,
}

impl RuntimeInner {
    fn push_history(&mut self, decision: Decision) {
        self.history.push_back(decision);
        self.trim_history();
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }
}

/// Current value of one frequency cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterView {
    pub scope: CounterScope,
    pub window: FrequencyWindow,
    pub max: u32,
    pub count: u32,
}

impl CounterView {
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.count)
    }
}

/// Decision engine instance
#[derive(Debug)]
pub struct Runtime {
    inner: Mutex<RuntimeInner>,
    events: EventBus,
    storage: Arc<dyn StorageAccessor>,
    clock: Arc<dyn Clock>,
}

impl Runtime {
    /// Uninitialized runtime over the given accessor and clock
    pub fn new(storage: Arc<dyn StorageAccessor>, clock: Arc<dyn Clock>) -> Self {
        let config = EngineConfig::default();
        let tracker = FrequencyTracker::new(
            Arc::clone(&storage),
            Arc::clone(&clock),
            config.namespace.as_str(),
        );

        Self {
            inner: Mutex::new(RuntimeInner {
                lifecycle: Lifecycle::Uninitialized,
                config,
                registry: ExperienceRegistry::new(),
                tracker,
                history: VecDeque::new(),
            }),
            events: EventBus::new(),
            storage,
            clock,
        }
    }

    /// Runtime over [`MemoryStorage`] and the system clock
    pub fn in_memory() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let storage = Arc::new(MemoryStorage::with_clock(Arc::clone(&clock)));
        Self::new(storage, clock)
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, RuntimeInner>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::Internal("Lock poisoned".into()))
    }

    fn ready(&self, operation: &'static str) -> EngineResult<MutexGuard<'_, RuntimeInner>> {
        let inner = self.lock()?;
        if inner.lifecycle != Lifecycle::Ready {
            log_event_with_fields(LogEvent::EngineNotInitialized, &[("operation", operation)]);
            return Err(EngineError::NotInitialized(operation));
        }
        Ok(inner)
    }

    // ==================
    // Lifecycle
    // ==================

    /// Apply `config` and move to ready. Calling it again on a ready
    /// runtime replaces the configuration and keeps registrations.
    pub async fn init(&self, config: EngineConfig) -> EngineResult<()> {
        config.validate()?;

        {
            let mut inner = self.lock()?;
            let reconfigured = inner.lifecycle == Lifecycle::Ready;

            inner.tracker = FrequencyTracker::new(
                Arc::clone(&self.storage),
                Arc::clone(&self.clock),
                config.namespace.as_str(),
            )
            .with_verbose(config.debug);
            inner.config = config.clone();
            inner.trim_history();
            inner.lifecycle = Lifecycle::Ready;

            let debug = config.debug.to_string();
            let fields = [
                ("debug", debug.as_str()),
                ("namespace", config.namespace.as_str()),
                ("storage", config.storage.as_str()),
            ];
            if reconfigured {
                log_event_with_fields(LogEvent::EngineReconfigured, &fields);
            } else {
                log_event_with_fields(LogEvent::EngineInit, &fields);
            }
        }

        self.events.emit(&RuntimeEvent::Ready { config });
        Ok(())
    }

    /// Drop registrations and history and return to uninitialized.
    /// Stored counters are left in place. A no-op when not initialized.
    pub async fn destroy(&self) -> EngineResult<()> {
        {
            let mut inner = self.lock()?;
            if inner.lifecycle == Lifecycle::Uninitialized {
                return Ok(());
            }

            let experiences = inner.registry.len().to_string();
            inner.registry.clear();
            inner.history.clear();
            inner.lifecycle = Lifecycle::Uninitialized;

            log_event_with_fields(
                LogEvent::EngineDestroyed,
                &[("experiences", experiences.as_str())],
            );
        }

        self.events.emit(&RuntimeEvent::Disabled);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.lock()
            .map(|inner| inner.lifecycle == Lifecycle::Ready)
            .unwrap_or(false)
    }

    // ==================
    // Operations
    // ==================

    /// Add or replace an experience. A replaced experience keeps its
    /// original registration position.
    pub fn register(&self, id: &str, definition: ExperienceDefinition) -> EngineResult<()> {
        let experience = Experience::new(id, definition);

        let registration = {
            let mut inner = self.ready("register")?;

            validate_id(id).map_err(|reason| EngineError::InvalidExperienceId {
                id: id.to_string(),
                reason,
            })?;

            let registration = inner.registry.register(experience.clone());
            if inner.config.debug {
                let event = match registration {
                    Registration::Inserted => LogEvent::ExperienceRegistered,
                    Registration::Replaced => LogEvent::ExperienceOverwritten,
                };
                let priority = experience.priority().to_string();
                log_event_with_fields(
                    event,
                    &[
                        ("experience", id),
                        ("priority", priority.as_str()),
                        ("type", experience.kind().as_str()),
                    ],
                );
            }
            registration
        };

        self.events.emit(&RuntimeEvent::Registered {
            experience,
            replaced: registration == Registration::Replaced,
        });
        Ok(())
    }

    /// Pick the experience to show for `context` and record the impression.
    pub fn evaluate(&self, context: impl Into<PartialContext>) -> EngineResult<Decision> {
        let (decision, experience) = {
            let mut inner = self.ready("evaluate")?;

            let decision = {
                let state: &RuntimeInner = &inner;
                let candidates = state.registry.ranked();
                Self::builder(state, self.clock.as_ref()).evaluate(
                    &candidates,
                    context.into(),
                    EvaluationMode::Live,
                )
            };

            let experience = decision
                .experience_id
                .as_deref()
                .and_then(|id| inner.registry.get(id))
                .cloned();

            if inner.config.debug {
                let evaluated = decision.metadata.experiences_evaluated.to_string();
                let show = decision.show.to_string();
                let decision_id = decision.id.to_string();
                log_event_with_fields(
                    LogEvent::DecisionEvaluated,
                    &[
                        ("decision", decision_id.as_str()),
                        ("evaluated", evaluated.as_str()),
                        ("experience", decision.experience_id.as_deref().unwrap_or("-")),
                        ("show", show.as_str()),
                    ],
                );
            }

            inner.push_history(decision.clone());
            (decision, experience)
        };

        self.events.emit(&RuntimeEvent::Evaluated {
            decision: decision.clone(),
            experience,
        });
        Ok(decision)
    }

    /// Dry-run the pipeline for one experience against the default
    /// context. `None` if the id is not registered.
    pub fn explain(&self, id: &str) -> EngineResult<Option<Decision>> {
        self.explain_with_context(id, PartialContext::new())
    }

    /// Dry-run the pipeline for one experience against `context`
    pub fn explain_with_context(
        &self,
        id: &str,
        context: impl Into<PartialContext>,
    ) -> EngineResult<Option<Decision>> {
        let inner = self.ready("explain")?;

        let experience = match inner.registry.get(id) {
            Some(experience) => experience,
            None => {
                if inner.config.debug {
                    log_event_with_fields(LogEvent::ExplainUnknownExperience, &[("experience", id)]);
                }
                return Ok(None);
            }
        };

        let decision = Self::builder(&inner, self.clock.as_ref()).explain(experience, context.into());

        if inner.config.debug {
            let show = decision.show.to_string();
            log_event_with_fields(
                LogEvent::DecisionExplained,
                &[("experience", id), ("show", show.as_str())],
            );
        }

        Ok(Some(decision))
    }

    /// Copy of the current state. Available in any lifecycle state.
    pub fn get_state(&self) -> RuntimeState {
        let inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        RuntimeState {
            initialized: inner.lifecycle == Lifecycle::Ready,
            experiences: inner.registry.iter().cloned().collect(),
            decisions: inner.history.iter().cloned().collect(),
            config: inner.config.clone(),
        }
    }

    /// Subscribe to one kind of runtime event
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&RuntimeEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    // ==================
    // Inspection
    // ==================

    /// Most recent decision from `evaluate`
    pub fn last_decision(&self) -> Option<Decision> {
        self.lock().ok().and_then(|inner| inner.history.back().cloned())
    }

    /// Current counters for each cap of a registered experience. Reads
    /// only; elapsed windows report zero.
    pub fn counters(&self, id: &str) -> EngineResult<Option<Vec<CounterView>>> {
        let inner = self.ready("counters")?;

        let experience = match inner.registry.get(id) {
            Some(experience) => experience,
            None => return Ok(None),
        };

        let caps = experience
            .targeting()
            .and_then(|t| t.frequency.as_ref())
            .map(|rule| (CounterScope::Targeting, rule))
            .into_iter()
            .chain(experience.frequency().map(|rule| (CounterScope::Experience, rule)));

        let views = caps
            .map(|(scope, rule): (CounterScope, &FrequencyRule)| CounterView {
                scope,
                window: rule.per,
                max: rule.max,
                count: inner.tracker.snapshot(id, scope, rule.per).count,
            })
            .collect();

        Ok(Some(views))
    }

    /// Namespaced storage for host plugins, using the configured backend
    pub fn consumer_storage(&self) -> EngineResult<ConsumerStorage> {
        let inner = self.lock()?;
        Ok(ConsumerStorage::new(
            Arc::clone(&self.storage),
            &inner.config.namespace,
            inner.config.storage,
        ))
    }

    fn builder<'a>(inner: &'a RuntimeInner, clock: &'a dyn Clock) -> DecisionBuilder<'a> {
        DecisionBuilder::new(&inner.tracker, clock)
            .with_default_url(inner.config.default_url.clone())
            .with_diagnostics(inner.config.debug)
    }
}

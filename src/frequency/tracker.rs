//! # Frequency Tracker
//!
//! Owns impression counters, persisted through the storage accessor.
//!
//! - Session counters live in the `session` backend
//! - Day/week counters live in the `local` backend with a TTL of one window
//! - `snapshot` is read-only, even across a window rollover
//! - `record_impression` is the only mutation
//!
//! Storage failures and malformed records degrade to "no prior
//! impressions" and are reported on the log channel, never returned.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::counter::{CounterRecord, CounterScope, CounterSnapshot};
use crate::clock::Clock;
use crate::experience::FrequencyWindow;
use crate::observability::{log_event_with_fields, LogEvent};
use crate::storage::{Backend, StorageAccessor, StorageError, StorageExt, StorageResult};

/// Per-experience impression counters keyed by scope and window
#[derive(Debug, Clone)]
pub struct FrequencyTracker {
    storage: Arc<dyn StorageAccessor>,
    clock: Arc<dyn Clock>,
    namespace: String,
    verbose: bool,
}

impl FrequencyTracker {
    /// Create a tracker whose keys are prefixed with `namespace`
    pub fn new(
        storage: Arc<dyn StorageAccessor>,
        clock: Arc<dyn Clock>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            clock,
            namespace: namespace.into(),
            verbose: false,
        }
    }

    /// Emit DEBUG records for every impression and rollover
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Storage key of one counter
    pub fn key(&self, experience_id: &str, scope: CounterScope, window: FrequencyWindow) -> String {
        format!(
            "{}:freq:{}:{}:{}",
            self.namespace,
            experience_id,
            scope.as_str(),
            window.as_str()
        )
    }

    /// Current count for the window. An elapsed window reads as empty;
    /// nothing is written.
    pub fn snapshot(
        &self,
        experience_id: &str,
        scope: CounterScope,
        window: FrequencyWindow,
    ) -> CounterSnapshot {
        let key = self.key(experience_id, scope, window);
        let now = self.clock.now();

        match self.read(&key, window) {
            Some(record) if !record.is_expired(window, now) => record.into(),
            _ => CounterSnapshot::empty(),
        }
    }

    /// Count one impression and persist it. Returns the counter after the
    /// increment.
    pub fn record_impression(
        &self,
        experience_id: &str,
        scope: CounterScope,
        window: FrequencyWindow,
    ) -> CounterSnapshot {
        let key = self.key(experience_id, scope, window);
        let now = self.clock.now();

        let record = match self.read(&key, window) {
            Some(record) if !record.is_expired(window, now) => CounterRecord {
                count: record.count.saturating_add(1),
                window_start: record.window_start,
            },
            Some(expired) => {
                if self.verbose {
                    log_event_with_fields(
                        LogEvent::CounterRollover,
                        &[
                            ("key", key.as_str()),
                            ("previous_count", expired.count.to_string().as_str()),
                        ],
                    );
                }
                CounterRecord::first(now)
            }
            None => CounterRecord::first(now),
        };

        let backend = Self::backend(window);
        let written = guarded(|| self.storage.set_as(&key, &record, backend, window.length()));
        if let Err(e) = written {
            log_event_with_fields(
                LogEvent::StorageWriteFailed,
                &[
                    ("backend", backend.as_str()),
                    ("error", e.to_string().as_str()),
                    ("key", key.as_str()),
                ],
            );
        } else if self.verbose {
            log_event_with_fields(
                LogEvent::ImpressionRecorded,
                &[("count", record.count.to_string().as_str()), ("key", key.as_str())],
            );
        }

        record.into()
    }

    fn backend(window: FrequencyWindow) -> Backend {
        match window {
            FrequencyWindow::Session => Backend::Session,
            FrequencyWindow::Day | FrequencyWindow::Week => Backend::Local,
        }
    }

    fn read(&self, key: &str, window: FrequencyWindow) -> Option<CounterRecord> {
        let backend = Self::backend(window);
        match guarded(|| self.storage.get_as::<CounterRecord>(key, backend)) {
            Ok(record) => record,
            Err(StorageError::Malformed { reason, .. }) => {
                log_event_with_fields(
                    LogEvent::CounterMalformed,
                    &[("backend", backend.as_str()), ("key", key), ("reason", reason.as_str())],
                );
                None
            }
            Err(e) => {
                log_event_with_fields(
                    LogEvent::StorageReadFailed,
                    &[
                        ("backend", backend.as_str()),
                        ("error", e.to_string().as_str()),
                        ("key", key),
                    ],
                );
                None
            }
        }
    }
}

/// Run an accessor call, reporting a panic inside it as an unavailable
/// backend. Counter reads and writes happen under the runtime's state lock.
fn guarded<T>(call: impl FnOnce() -> StorageResult<T>) -> StorageResult<T> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| {
        Err(StorageError::Unavailable("storage accessor panicked".into()))
    })
}

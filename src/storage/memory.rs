//! # In-Process Storage
//!
//! Reference accessor keeping all three backends in process memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use serde_json::Value;

use super::errors::{StorageError, StorageResult};
use super::{Backend, StorageAccessor, StoredEntry};
use crate::clock::{Clock, SystemClock};

type Entries = Mutex<HashMap<String, StoredEntry>>;

/// In-memory storage with isolated session/local/memory maps
#[derive(Debug)]
pub struct MemoryStorage {
    clock: Arc<dyn Clock>,
    session: Entries,
    local: Entries,
    memory: Entries,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create storage expiring entries against wall-clock time
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create storage expiring entries against the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            session: Mutex::new(HashMap::new()),
            local: Mutex::new(HashMap::new()),
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// End the browsing session: drops everything in the session backend
    pub fn end_session(&self) {
        if let Ok(mut session) = self.session.lock() {
            session.clear();
        }
    }

    /// Number of live (unexpired) entries in a backend
    pub fn len(&self, backend: Backend) -> usize {
        let now = self.clock.now();
        self.entries(backend)
            .lock()
            .map(|m| m.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    /// Whether a backend has no live entries
    pub fn is_empty(&self, backend: Backend) -> bool {
        self.len(backend) == 0
    }

    fn entries(&self, backend: Backend) -> &Entries {
        match backend {
            Backend::Session => &self.session,
            Backend::Local => &self.local,
            Backend::Memory => &self.memory,
        }
    }
}

impl StorageAccessor for MemoryStorage {
    fn get(&self, key: &str, backend: Backend) -> StorageResult<Option<Value>> {
        let now = self.clock.now();
        let mut entries = self
            .entries(backend)
            .lock()
            .map_err(|_| StorageError::poisoned())?;

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(
        &self,
        key: &str,
        value: Value,
        backend: Backend,
        ttl: Option<Duration>,
    ) -> StorageResult<()> {
        let entry = StoredEntry::new(value, self.clock.now(), ttl);
        self.entries(backend)
            .lock()
            .map_err(|_| StorageError::poisoned())?
            .insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str, backend: Backend) -> StorageResult<()> {
        self.entries(backend)
            .lock()
            .map_err(|_| StorageError::poisoned())?
            .remove(key);
        Ok(())
    }
}

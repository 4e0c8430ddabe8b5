//! # File-Backed Storage
//!
//! The `local` backend is persisted as a JSON document so counters survive
//! process restarts. `session` and `memory` stay in process.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Duration;
use serde_json::Value;

use super::errors::{StorageError, StorageResult};
use super::memory::MemoryStorage;
use super::{Backend, StorageAccessor, StoredEntry};
use crate::clock::Clock;
use crate::observability::{log_event_with_fields, LogEvent};

/// Storage whose `local` backend lives in a JSON file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    local: Mutex<HashMap<String, StoredEntry>>,
    volatile: MemoryStorage,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// Expired entries are dropped on load.
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let now = clock.now();
        let mut local = Self::load(&path)?;
        local.retain(|_, entry| !entry.is_expired(now));

        Ok(Self {
            path,
            volatile: MemoryStorage::with_clock(clock.clone()),
            clock,
            local: Mutex::new(local),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// End the browsing session: drops everything in the session backend
    pub fn end_session(&self) {
        self.volatile.end_session();
    }

    fn load(path: &Path) -> StorageResult<HashMap<String, StoredEntry>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| StorageError::IoError(format!("Failed to read store: {}", e)))?;

        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        // An unreadable document is replaced by the next write
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let path = path.display().to_string();
                log_event_with_fields(
                    LogEvent::StorageReadFailed,
                    &[
                        ("backend", Backend::Local.as_str()),
                        ("error", e.to_string().as_str()),
                        ("path", path.as_str()),
                    ],
                );
                Ok(HashMap::new())
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, StoredEntry>) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Internal(format!("Failed to serialize store: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::IoError(format!("Failed to create store directory: {}", e))
                })?;
            }
        }

        // Write to a sibling file, then rename over the store
        let tmp = temp_path(&self.path);
        fs::write(&tmp, content)
            .map_err(|e| StorageError::IoError(format!("Failed to write store: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StorageError::IoError(format!("Failed to replace store: {}", e)))
    }
}

/// Sibling path the store is written to before the rename
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl StorageAccessor for FileStorage {
    fn get(&self, key: &str, backend: Backend) -> StorageResult<Option<Value>> {
        if backend != Backend::Local {
            return self.volatile.get(key, backend);
        }

        let now = self.clock.now();
        let local = self.local.lock().map_err(|_| StorageError::poisoned())?;
        Ok(local
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    fn set(
        &self,
        key: &str,
        value: Value,
        backend: Backend,
        ttl: Option<Duration>,
    ) -> StorageResult<()> {
        if backend != Backend::Local {
            return self.volatile.set(key, value, backend, ttl);
        }

        let now = self.clock.now();
        let mut local = self.local.lock().map_err(|_| StorageError::poisoned())?;
        local.retain(|_, entry| !entry.is_expired(now));
        local.insert(key.to_string(), StoredEntry::new(value, now, ttl));
        self.persist(&local)
    }

    fn remove(&self, key: &str, backend: Backend) -> StorageResult<()> {
        if backend != Backend::Local {
            return self.volatile.remove(key, backend);
        }

        let mut local = self.local.lock().map_err(|_| StorageError::poisoned())?;
        if local.remove(key).is_some() {
            self.persist(&local)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_local_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let storage = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
            storage.set("k", json!({"count": 2}), Backend::Local, None).unwrap();
            storage.set("s", json!(1), Backend::Session, None).unwrap();
        }

        let reopened = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
        assert_eq!(
            reopened.get("k", Backend::Local).unwrap(),
            Some(json!({"count": 2}))
        );
        assert_eq!(reopened.get("s", Backend::Session).unwrap(), None);
    }

    #[test]
    fn test_expired_entries_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        {
            let storage = FileStorage::open(&path, Arc::new(clock.clone())).unwrap();
            storage
                .set("k", json!(1), Backend::Local, Some(Duration::hours(1)))
                .unwrap();
        }

        clock.advance(Duration::hours(2));
        let reopened = FileStorage::open(&path, Arc::new(clock)).unwrap();
        assert_eq!(reopened.get("k", Backend::Local).unwrap(), None);
    }

    #[test]
    fn test_corrupted_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
        assert_eq!(storage.get("k", Backend::Local).unwrap(), None);

        storage.set("k", json!(1), Backend::Local, None).unwrap();
        let reopened = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
        assert_eq!(reopened.get("k", Backend::Local).unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/var/xp/state.json")),
            PathBuf::from("/var/xp/state.json.tmp")
        );
        assert_eq!(
            temp_path(Path::new("/var/xp/state.tmp")),
            PathBuf::from("/var/xp/state.tmp.tmp")
        );
    }

    #[test]
    fn test_tmp_named_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.tmp");

        {
            let storage = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
            storage.set("k", json!(3), Backend::Local, None).unwrap();
        }

        assert!(!dir.path().join("state.tmp.tmp").exists());
        let reopened = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
        assert_eq!(reopened.get("k", Backend::Local).unwrap(), Some(json!(3)));
    }

    #[test]
    fn test_missing_parent_directory_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let storage = FileStorage::open(&path, Arc::new(SystemClock)).unwrap();
        storage.set("k", json!(1), Backend::Local, None).unwrap();
        assert!(path.exists());
    }
}

//! Storage Backend Tests
//!
//! Tests for the bundled accessors:
//! - Backends are isolated from each other
//! - TTL expiry follows the clock
//! - File storage persists the local backend only

use std::fs;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use xp_engine::storage::StorageExt;
use xp_engine::{Backend, Clock, FileStorage, ManualClock, MemoryStorage, StorageAccessor, StorageError};

// =============================================================================
// Helper Functions
// =============================================================================

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
}

fn shared(clock: &ManualClock) -> Arc<dyn Clock> {
    Arc::new(clock.clone())
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Preference {
    theme: String,
    dismissed: u32,
}

// =============================================================================
// Memory Storage Tests
// =============================================================================

/// The same key in different backends holds different values.
#[test]
fn test_backends_are_isolated() {
    let storage = MemoryStorage::new();

    storage.set("k", json!(1), Backend::Session, None).unwrap();
    storage.set("k", json!(2), Backend::Local, None).unwrap();

    assert_eq!(storage.get("k", Backend::Session).unwrap(), Some(json!(1)));
    assert_eq!(storage.get("k", Backend::Local).unwrap(), Some(json!(2)));
    assert_eq!(storage.get("k", Backend::Memory).unwrap(), None);
}

/// Entries expire once their TTL has passed.
#[test]
fn test_ttl_expiry() {
    let clock = clock();
    let storage = MemoryStorage::with_clock(shared(&clock));

    storage
        .set("k", json!("v"), Backend::Local, Some(Duration::hours(1)))
        .unwrap();

    clock.advance(Duration::minutes(59));
    assert!(storage.get("k", Backend::Local).unwrap().is_some());

    clock.advance(Duration::minutes(1));
    assert!(storage.get("k", Backend::Local).unwrap().is_none());
}

/// end_session clears only the session backend.
#[test]
fn test_end_session() {
    let storage = MemoryStorage::new();
    storage.set("s", json!(true), Backend::Session, None).unwrap();
    storage.set("l", json!(true), Backend::Local, None).unwrap();

    storage.end_session();

    assert!(storage.is_empty(Backend::Session));
    assert_eq!(storage.len(Backend::Local), 1);
}

/// Removing a missing key is fine.
#[test]
fn test_remove_missing_key() {
    let storage = MemoryStorage::new();
    assert!(storage.remove("nothing", Backend::Memory).is_ok());
}

/// Typed helpers decode values and flag malformed ones.
#[test]
fn test_typed_access() {
    let storage = MemoryStorage::new();
    let pref = Preference {
        theme: "dark".into(),
        dismissed: 2,
    };

    storage.set_as("pref", &pref, Backend::Memory, None).unwrap();
    assert_eq!(
        storage.get_as::<Preference>("pref", Backend::Memory).unwrap(),
        Some(pref)
    );

    storage.set("bad", json!([1, 2]), Backend::Memory, None).unwrap();
    let err = storage.get_as::<Preference>("bad", Backend::Memory).unwrap_err();
    assert!(matches!(err, StorageError::Malformed { .. }));
    assert_eq!(err.code(), "XP_STORAGE_MALFORMED");
}

// =============================================================================
// File Storage Tests
// =============================================================================

/// Local values survive reopening the file; session values don't.
#[test]
fn test_file_storage_persists_local_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    let clock = clock();

    {
        let storage = FileStorage::open(&path, shared(&clock)).unwrap();
        storage.set("local", json!(7), Backend::Local, None).unwrap();
        storage.set("session", json!(8), Backend::Session, None).unwrap();
    }

    assert!(path.exists());

    let reopened = FileStorage::open(&path, shared(&clock)).unwrap();
    assert_eq!(reopened.get("local", Backend::Local).unwrap(), Some(json!(7)));
    assert_eq!(reopened.get("session", Backend::Session).unwrap(), None);
}

/// Expired entries are dropped when the file is opened.
#[test]
fn test_file_storage_expiry_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = clock();

    {
        let storage = FileStorage::open(&path, shared(&clock)).unwrap();
        storage
            .set("daily", json!(1), Backend::Local, Some(Duration::days(1)))
            .unwrap();
    }

    clock.advance(Duration::days(2));
    let reopened = FileStorage::open(&path, shared(&clock)).unwrap();
    assert_eq!(reopened.get("daily", Backend::Local).unwrap(), None);
}

/// Removing a local value rewrites the file.
#[test]
fn test_file_storage_remove() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = clock();

    let storage = FileStorage::open(&path, shared(&clock)).unwrap();
    storage.set("k", json!("v"), Backend::Local, None).unwrap();
    storage.remove("k", Backend::Local).unwrap();

    let reopened = FileStorage::open(&path, shared(&clock)).unwrap();
    assert_eq!(reopened.get("k", Backend::Local).unwrap(), None);
}

/// A corrupted file counts as empty and is overwritten by the next write.
#[test]
fn test_corrupted_file_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "{truncated").unwrap();

    let storage = FileStorage::open(&path, shared(&clock())).unwrap();
    assert_eq!(storage.get("xp:freq:a:experience:day", Backend::Local).unwrap(), None);

    storage.set("kept", json!(true), Backend::Local, None).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());

    let reopened = FileStorage::open(&path, shared(&clock())).unwrap();
    assert_eq!(reopened.get("kept", Backend::Local).unwrap(), Some(json!(true)));
}

//! # Storage Accessor
//!
//! Key-value boundary the engine persists frequency counters through.
//!
//! Three backends are addressed by [`Backend`]:
//! - `session`: ephemeral, cleared when the browsing session ends
//! - `local`: durable per device
//! - `memory`: process lifetime only
//!
//! The engine assumes best-effort durability. Any [`StorageError`] is
//! treated by callers as a cache miss.

mod errors;
mod file;
mod memory;

pub use errors::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Session,
    Local,
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Session => "session",
            Backend::Local => "local",
            Backend::Memory => "memory",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key-value accessor over the three backends
pub trait StorageAccessor: Send + Sync + fmt::Debug {
    /// Read a value; `None` when absent or expired
    fn get(&self, key: &str, backend: Backend) -> StorageResult<Option<Value>>;

    /// Write a value, optionally expiring after `ttl`
    fn set(&self, key: &str, value: Value, backend: Backend, ttl: Option<Duration>)
        -> StorageResult<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str, backend: Backend) -> StorageResult<()>;
}

/// Typed helpers over any [`StorageAccessor`]
pub trait StorageExt: StorageAccessor {
    /// Read and decode a value
    fn get_as<T: DeserializeOwned>(&self, key: &str, backend: Backend) -> StorageResult<Option<T>> {
        match self.get(key, backend)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                StorageError::Malformed {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }

    /// Encode and write a value
    fn set_as<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        backend: Backend,
        ttl: Option<Duration>,
    ) -> StorageResult<()> {
        let value = serde_json::to_value(value).map_err(|e| StorageError::Malformed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.set(key, value, backend, ttl)
    }
}

impl<S: StorageAccessor + ?Sized> StorageExt for S {}

/// A stored value with its optional expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    pub fn new(value: Value, now: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

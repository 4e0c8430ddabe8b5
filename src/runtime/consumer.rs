//! # Consumer Storage
//!
//! Storage handle for host plugins. Keys are prefixed with the runtime's
//! namespace and calls that don't name a backend use the configured one.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::{Backend, StorageAccessor, StorageExt, StorageResult};

/// Namespaced view over the runtime's storage accessor
#[derive(Debug, Clone)]
pub struct ConsumerStorage {
    storage: Arc<dyn StorageAccessor>,
    namespace: String,
    backend: Backend,
}

impl ConsumerStorage {
    pub(crate) fn new(storage: Arc<dyn StorageAccessor>, namespace: &str, backend: Backend) -> Self {
        Self {
            storage,
            namespace: namespace.to_string(),
            backend,
        }
    }

    /// Backend used when none is given
    pub fn backend(&self) -> Backend {
        self.backend
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        self.get_in(key, self.backend)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        self.set_in(key, value, self.backend)
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage.remove(&self.key(key), self.backend)
    }

    pub fn get_in<T: DeserializeOwned>(&self, key: &str, backend: Backend) -> StorageResult<Option<T>> {
        self.storage.get_as(&self.key(key), backend)
    }

    pub fn set_in<T: Serialize>(&self, key: &str, value: &T, backend: Backend) -> StorageResult<()> {
        self.storage.set_as(&self.key(key), value, backend, None)
    }
}

//! # Engine Configuration
//!
//! Loaded from JSON; every field has a default so `{}` is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{EngineError, EngineResult};
use crate::storage::Backend;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Verbose log emission and rejected-candidate reasons on decisions
    #[serde(default)]
    pub debug: bool,

    /// Default backend for consumers that don't name one
    #[serde(default)]
    pub storage: Backend,

    /// Storage key prefix; isolates runtimes sharing one accessor
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Number of decisions kept for inspection
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// URL assumed when a context carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_url: Option<String>,
}

fn default_namespace() -> String {
    "xp".to_string()
}

fn default_history_limit() -> usize {
    50
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            storage: Backend::default(),
            namespace: default_namespace(),
            history_limit: default_history_limit(),
            default_url: None,
        }
    }
}

impl EngineConfig {
    /// Config with verbose diagnostics on
    pub fn debug() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_storage(mut self, storage: Backend) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigLoad(format!("{}: {}", path.display(), e)))?;

        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| EngineError::ConfigLoad(format!("invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check field constraints
    pub fn validate(&self) -> EngineResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(EngineError::InvalidConfig("namespace must not be empty".into()));
        }

        if self.namespace.contains(':') {
            return Err(EngineError::InvalidConfig(format!(
                "namespace '{}' must not contain ':'",
                self.namespace
            )));
        }

        if self.history_limit == 0 {
            return Err(EngineError::InvalidConfig("history_limit must be > 0".into()));
        }

        Ok(())
    }
}

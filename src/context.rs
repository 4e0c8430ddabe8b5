//! # Evaluation Context
//!
//! Caller input to `evaluate`. Everything except the URL is pass-through
//! data for consumers and trigger-aware rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fully normalized evaluation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Value>,
}

impl Context {
    /// The URL, treating an empty string as absent
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Caller-supplied context. Missing fields are filled from engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialContext {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    pub custom: Option<Map<String, Value>>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub triggers: Option<Value>,
}

impl PartialContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: Value) -> Self {
        self.custom
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_triggers(mut self, triggers: Value) -> Self {
        self.triggers = Some(triggers);
        self
    }

    /// Merge onto engine defaults; supplied fields win
    pub fn normalize(self, defaults: &ContextDefaults) -> Context {
        Context {
            url: self.url.or_else(|| defaults.url.clone()),
            user: self.user,
            custom: self.custom.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or(defaults.timestamp),
            triggers: self.triggers,
        }
    }
}

impl From<&str> for PartialContext {
    fn from(url: &str) -> Self {
        PartialContext::new().with_url(url)
    }
}

/// Engine-wide values a partial context is merged onto
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDefaults {
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

//! # Experience Definition

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::targeting::{FrequencyRule, TargetingRules};

/// Presentation kind. Opaque to the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceType {
    #[default]
    Banner,
    Modal,
    Tooltip,
    Inline,
}

impl ExperienceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceType::Banner => "banner",
            ExperienceType::Modal => "modal",
            ExperienceType::Tooltip => "tooltip",
            ExperienceType::Inline => "inline",
        }
    }
}

/// Everything about an experience except its id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceDefinition {
    #[serde(rename = "type", default)]
    pub kind: ExperienceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting: Option<TargetingRules>,

    /// Payload owned by presentation plugins
    #[serde(default)]
    pub content: Value,

    /// Experience-level frequency cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<FrequencyRule>,

    /// Higher wins when several experiences qualify
    #[serde(default)]
    pub priority: i32,
}

impl ExperienceDefinition {
    pub fn new(kind: ExperienceType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_targeting(mut self, targeting: TargetingRules) -> Self {
        self.targeting = Some(targeting);
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    pub fn with_frequency(mut self, frequency: FrequencyRule) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A registered experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: String,
    #[serde(flatten)]
    pub definition: ExperienceDefinition,
}

impl Experience {
    pub fn new(id: impl Into<String>, definition: ExperienceDefinition) -> Self {
        Self {
            id: id.into(),
            definition,
        }
    }

    pub fn kind(&self) -> ExperienceType {
        self.definition.kind
    }

    pub fn priority(&self) -> i32 {
        self.definition.priority
    }

    pub fn targeting(&self) -> Option<&TargetingRules> {
        self.definition.targeting.as_ref()
    }

    pub fn frequency(&self) -> Option<&FrequencyRule> {
        self.definition.frequency.as_ref()
    }

    pub fn content(&self) -> &Value {
        &self.definition.content
    }
}

/// Reject ids that are empty or only whitespace
pub fn validate_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("experience id must not be empty".to_string());
    }
    Ok(())
}

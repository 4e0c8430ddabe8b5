//! # Rule Outcome

use serde::{Deserialize, Serialize};

/// Tagged result of one rule check, always carrying a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "evaluation", rename_all = "lowercase")]
pub enum RuleOutcome {
    Passed { reason: String },
    Failed { reason: String },
}

impl RuleOutcome {
    pub fn passed(reason: impl Into<String>) -> Self {
        RuleOutcome::Passed {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        RuleOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, RuleOutcome::Passed { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            RuleOutcome::Passed { reason } | RuleOutcome::Failed { reason } => reason,
        }
    }

    /// Marker prefixed to decision reasons
    pub fn marker(&self) -> &'static str {
        if self.is_passed() {
            "✅"
        } else {
            "❌"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let value = serde_json::to_value(RuleOutcome::failed("no URL in context")).unwrap();
        assert_eq!(value["evaluation"], "failed");
        assert_eq!(value["reason"], "no URL in context");
    }

    #[test]
    fn test_markers() {
        assert_eq!(RuleOutcome::passed("ok").marker(), "✅");
        assert_eq!(RuleOutcome::failed("no").marker(), "❌");
    }
}

//! # Runtime Errors
//!
//! Precondition failures are reported synchronously and never silently
//! ignored. Data-quality problems (bad rules, broken storage) are not
//! errors at this level: they show up as reasons on a decision.

use thiserror::Error;

/// Result type for runtime operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Runtime errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Runtime not initialized: call init() before {0}()")]
    NotInitialized(&'static str),

    #[error("Invalid experience id '{id}': {reason}")]
    InvalidExperienceId { id: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotInitialized(_) => "XP_NOT_INITIALIZED",
            EngineError::InvalidExperienceId { .. } => "XP_INVALID_EXPERIENCE_ID",
            EngineError::InvalidConfig(_) => "XP_INVALID_CONFIG",
            EngineError::ConfigLoad(_) => "XP_CONFIG_LOAD",
            EngineError::Internal(_) => "XP_INTERNAL",
        }
    }

    /// Whether the caller broke a documented precondition
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EngineError::NotInitialized(_) | EngineError::InvalidExperienceId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_message_names_operation() {
        let err = EngineError::NotInitialized("evaluate");
        assert_eq!(err.code(), "XP_NOT_INITIALIZED");
        assert!(err.to_string().contains("evaluate()"));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_codes() {
        assert_eq!(EngineError::InvalidConfig("x".into()).code(), "XP_INVALID_CONFIG");
        assert!(!EngineError::Internal("x".into()).is_precondition());
    }
}

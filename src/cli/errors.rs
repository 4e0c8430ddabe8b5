//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::runtime::EngineError;
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Experiences file could not be used
    InvalidExperiences,
    /// Experience id not registered
    UnknownExperience,
    /// State file could not be opened
    StateError,
    /// Engine rejected an operation
    EngineFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "XP_CLI_CONFIG_ERROR",
            Self::IoError => "XP_CLI_IO_ERROR",
            Self::InvalidExperiences => "XP_CLI_INVALID_EXPERIENCES",
            Self::UnknownExperience => "XP_CLI_UNKNOWN_EXPERIENCE",
            Self::StateError => "XP_CLI_STATE_ERROR",
            Self::EngineFailed => "XP_CLI_ENGINE_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Experiences file unreadable or invalid
    pub fn invalid_experiences(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidExperiences, msg)
    }

    /// Experience not registered
    pub fn unknown_experience(id: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownExperience,
            format!("No experience with id '{}' in the experiences file", id),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        let code = match e {
            EngineError::InvalidConfig(_) | EngineError::ConfigLoad(_) => CliErrorCode::ConfigError,
            EngineError::InvalidExperienceId { .. } => CliErrorCode::InvalidExperiences,
            _ => CliErrorCode::EngineFailed,
        };
        Self::new(code, format!("{} ({})", e, e.code()))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::new(CliErrorCode::StateError, format!("{} ({})", e, e.code()))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

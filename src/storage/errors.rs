//! # Storage Accessor Errors

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage accessor errors
///
/// The decision engine treats every one of these as a cache miss.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed value at '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "XP_STORAGE_UNAVAILABLE",
            StorageError::Malformed { .. } => "XP_STORAGE_MALFORMED",
            StorageError::IoError(_) => "XP_STORAGE_IO",
            StorageError::Internal(_) => "XP_STORAGE_INTERNAL",
        }
    }

    pub(crate) fn poisoned() -> Self {
        StorageError::Internal("Lock poisoned".into())
    }
}

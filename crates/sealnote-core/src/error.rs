//! Error types for Sealnote core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Messages are deliberately generic for the cryptographic variants: they
//! never say *why* an unwrap or decrypt failed, and they never carry key
//! material. The CLI and relay layers map these to exit codes and HTTP
//! statuses.

use thiserror::Error;

/// Result type alias for Sealnote operations.
pub type Result<T> = std::result::Result<T, SealnoteError>;

/// Core error type for Sealnote operations.
#[derive(Debug, Error)]
pub enum SealnoteError {
    /// Malformed caller input, rejected before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    /// Master key unwrap failed (wrong passphrase or corrupted record)
    #[error("Incorrect passphrase")]
    Authentication,

    /// Note ciphertext failed authentication
    #[error("Cannot decrypt note")]
    Integrity,

    /// Session, note, or credential is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session TTL elapsed
    #[error("Expired: {0}")]
    Expired(String),

    /// Write-once field already set, or id already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Session store is full
    #[error("Capacity reached: {0}")]
    Capacity(String),

    /// Backup belongs to a different key lineage than the local vault
    #[error("Backup conflict: {0}")]
    BackupConflict(String),

    /// Encryption primitive failure that is not an authentication failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl SealnoteError {
    /// Whether a caller may retry the same operation later.
    ///
    /// Cryptographic failures are never retryable: the same key will fail
    /// the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SealnoteError::NotFound(_)
                | SealnoteError::Expired(_)
                | SealnoteError::Capacity(_)
                | SealnoteError::Storage(_)
        )
    }
}

impl From<rusqlite::Error> for SealnoteError {
    fn from(err: rusqlite::Error) -> Self {
        SealnoteError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SealnoteError {
    fn from(err: serde_json::Error) -> Self {
        SealnoteError::Validation(err.to_string())
    }
}

impl From<std::io::Error> for SealnoteError {
    fn from(err: std::io::Error) -> Self {
        SealnoteError::Storage(err.to_string())
    }
}

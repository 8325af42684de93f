//! Error types for LexiVault
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using VaultError
pub type Result<T> = std::result::Result<T, VaultError>;

/// Unified error type for LexiVault operations
#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Blob Log Errors
    // -------------------------------------------------------------------------
    #[error("Invalid operation: blob log must be opened before {0}")]
    NotOpen(&'static str),

    #[error("Corrupt file \"{path}\": {details}")]
    CorruptFormat { path: String, details: String },

    #[error("Value for key <{0}> can not be empty")]
    EmptyValue(String),

    #[error("Value for key <{key}> is {size} bytes, maximum is {max}")]
    ValueTooLarge { key: String, size: u64, max: u64 },

    #[error("Key is {size} bytes, maximum is {max}")]
    KeyTooLarge { size: u64, max: u64 },

    // -------------------------------------------------------------------------
    // Document Store Errors
    // -------------------------------------------------------------------------
    #[error("Invalid path \"{path}\": {details}")]
    InvalidPath { path: String, details: String },

    #[error("\"{0}\" already exists")]
    AlreadyExists(String),

    #[error("\"{0}\" not found")]
    NotFound(String),

    #[error("Invalid file \"{path}\": {details}")]
    InvalidFile { path: String, details: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No store named \"{0}\" is configured")]
    UnknownStore(String),
}

impl VaultError {
    pub(crate) fn corrupt(path: &std::path::Path, details: impl Into<String>) -> Self {
        VaultError::CorruptFormat {
            path: path.display().to_string(),
            details: details.into(),
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, details: impl Into<String>) -> Self {
        VaultError::InvalidPath {
            path: path.into(),
            details: details.into(),
        }
    }

    /// HTTP status the web layer should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            VaultError::EmptyValue(_)
            | VaultError::InvalidPath { .. }
            | VaultError::InvalidFile { .. } => 400,
            VaultError::NotFound(_) | VaultError::UnknownStore(_) => 404,
            VaultError::AlreadyExists(_) => 409,
            VaultError::ValueTooLarge { .. } | VaultError::KeyTooLarge { .. } => 413,
            VaultError::Io(_)
            | VaultError::NotOpen(_)
            | VaultError::CorruptFormat { .. }
            | VaultError::Serialization(_)
            | VaultError::Config(_) => 500,
        }
    }

    /// True for errors caused by the request rather than by the server
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

//! Common error types for Lockbox.
//!
//! Error messages carry non-sensitive metadata only. Password and key bytes
//! never appear in any variant.

use thiserror::Error;

/// Top-level error type for Lockbox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed caller input (empty password, zero length, bad parameters).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The bytes are not a recognized vault container.
    #[error("Format error: {0}")]
    Format(String),

    /// The memory-hard KDF failed or rejected its parameters.
    #[error("Key derivation error: {0}")]
    Derivation(String),

    /// AEAD tag verification failed: wrong password or tampered container.
    #[error("Authentication failed: wrong password or corrupted vault")]
    Authentication,

    /// The operating system CSPRNG could not supply bytes.
    #[error("Entropy source error: {0}")]
    Entropy(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pipeline configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A worker task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

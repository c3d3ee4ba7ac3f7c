//! Error types for the extdns system
//!
//! This module defines all error types used throughout the crate.
//! The planner itself never fails; these errors come from sources,
//! registries, providers and configuration.

use thiserror::Error;

/// Result type alias for extdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the extdns system
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint source errors
    #[error("Source error: {0}")]
    Source(String),

    /// Ownership registry errors
    #[error("Registry error: {0}")]
    Registry(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A CIDR range that could not be parsed
    #[error("Invalid CIDR range: {0}")]
    InvalidCidr(String),

    /// Attempt to create a record that already exists
    #[error("Record already exists: {0}")]
    RecordAlreadyExists(String),

    /// Attempt to update or delete a record that does not exist
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// I/O errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a source error
    pub fn source_error(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid CIDR error
    pub fn invalid_cidr(msg: impl Into<String>) -> Self {
        Self::InvalidCidr(msg.into())
    }

    /// Create a "record already exists" error
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::RecordAlreadyExists(name.into())
    }

    /// Create a "record not found" error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::RecordNotFound(name.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

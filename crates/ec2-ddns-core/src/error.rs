//! Error types for the EC2 DNS reconciler
//!
//! This module defines all error types used throughout the crate.
//! Collaborator failures are carried as `Error` values and converted into
//! an [`AbortReason`](crate::reconciler::AbortReason) by the reconciler; they
//! never escape a reconciliation pass.

use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the EC2 DNS reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Instance metadata lookup errors
    #[error("Instance source error: {0}")]
    InstanceSource(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trigger event could not be decoded
    #[error("Event error: {0}")]
    Event(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an instance source error
    pub fn instance_source(msg: impl Into<String>) -> Self {
        Self::InstanceSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an event decoding error
    pub fn event(msg: impl Into<String>) -> Self {
        Self::Event(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

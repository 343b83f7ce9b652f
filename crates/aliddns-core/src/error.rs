//! Error types for the aliddns worker
//!
//! Collaborator failures that are *reported* (a provider response carrying
//! `has_error`, a discovery URL answering `ok == false`) are not errors at this
//! level; they are ordinary responses the reconciliation pass inspects and
//! turns into a `ReconciliationOutcome`. An [`Error`] returned by a
//! collaborator means something unexpected happened (transport failure,
//! malformed payload) and ends the current tick.

use thiserror::Error;

/// Result type alias for aliddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the aliddns worker
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

//! Error types for the backend client.

use thiserror::Error;

/// Errors that can occur when talking to the task backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid base URL or path.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status.
    #[error("backend returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

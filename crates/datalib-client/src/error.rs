//! Error types for API access.

use thiserror::Error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The API base URL is not configured; fatal to any fetch.
    #[error("API base URL is not configured: {0}")]
    Configuration(String),

    /// The server answered outside 2xx. The body text is kept for the
    /// inline error message shown next to retained data.
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Transport-level failure (DNS, TLS, connect, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response was 2xx but not the JSON shape we expect.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// True when retrying with the same configuration cannot help.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ClientError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

//! Error types for generative model calls.

use thiserror::Error;

/// Errors produced by a generative model backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Provider refused the prompt.
    #[error("prompt blocked by provider: {0}")]
    Blocked(String),

    /// Provider returned no text.
    #[error("provider returned no text")]
    EmptyResponse,
}

impl LlmError {
    /// Whether the provider rejected the credential.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}

/// Convenience result alias for model calls.
pub type LlmResult<T> = Result<T, LlmError>;

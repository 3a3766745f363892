//! Error types for material store access.

use thiserror::Error;

/// Errors raised while querying the material store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Store answered with a non-success status.
    #[error("store returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Rows did not match the material schema.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Store URL could not be built.
    #[error("invalid store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenience result alias for store queries.
pub type StoreResult<T> = Result<T, StoreError>;

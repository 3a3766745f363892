//! Error types for the streaming client.

use thiserror::Error;

use crate::messages;

/// Errors returned before a turn starts. Failures during a turn are
/// recorded in the conversation instead.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A turn is already in flight.
    #[error("a chat turn is already in progress")]
    Busy,
    /// Message over the character limit.
    #[error("message has {actual} characters, limit is {max}")]
    MessageTooLong {
        /// Limit.
        max: usize,
        /// Message length.
        actual: usize,
    },
    /// There is no earlier user message to resend.
    #[error("no message to retry")]
    NothingToRetry,
    /// Server URL does not parse.
    #[error("invalid server url: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Localized message for the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => messages::TURN_IN_PROGRESS.to_string(),
            Self::MessageTooLong { max, .. } => messages::message_too_long(*max),
            Self::NothingToRetry => messages::NOTHING_TO_RETRY.to_string(),
            Self::InvalidEndpoint(_) | Self::Http(_) => messages::NETWORK_ERROR.to_string(),
        }
    }
}

/// Convenience result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

//! Error types for chat turns.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::materials::StoreError;
use crate::messages;
use crate::protocol::ErrorBody;

/// Rejected request input. Always reported to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Body is not a chat request.
    #[error("invalid request body: {0}")]
    InvalidFormat(String),
    /// Blank message without image.
    #[error("message is empty and no image is attached")]
    EmptyMessage,
    /// Message over the character limit.
    #[error("message has {actual} characters, limit is {max}")]
    MessageTooLong {
        /// Limit.
        max: usize,
        /// Received length.
        actual: usize,
    },
    /// Image is not a base64 data URI.
    #[error("image is not a base64 data URI")]
    MalformedImage,
    /// Image MIME type outside the allow-list.
    #[error("image type {0} is not accepted")]
    UnsupportedImageType(String),
    /// Decoded image over the size limit.
    #[error("image is {actual} bytes, limit is {max}")]
    ImageTooLarge {
        /// Limit in bytes.
        max: usize,
        /// Decoded size in bytes.
        actual: usize,
    },
}

impl ValidationError {
    /// Localized message for the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidFormat(_) => messages::INVALID_MESSAGE.to_string(),
            Self::EmptyMessage => messages::EMPTY_AFTER_TRIM.to_string(),
            Self::MessageTooLong { max, .. } => messages::message_too_long(*max),
            Self::MalformedImage | Self::UnsupportedImageType(_) => {
                messages::INVALID_IMAGE_TYPE.to_string()
            }
            Self::ImageTooLarge { .. } => messages::IMAGE_TOO_LARGE.to_string(),
        }
    }
}

/// Errors that end a chat turn before streaming starts.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Bad input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The model credential is not configured.
    #[error("generative model credential is not configured")]
    MissingCredential,
    /// Direct material lookup failed (listing endpoint only; chat turns degrade instead).
    #[error("material lookup failed: {0}")]
    Materials(#[from] StoreError),
}

impl ChatError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::Materials(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Localized message for the user. Server-side causes stay generic.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.user_message(),
            Self::MissingCredential => messages::CONFIG_ERROR.to_string(),
            Self::Materials(_) => messages::MATERIALS_FETCH_ERROR.to_string(),
        }
    }

    /// JSON error response, optionally carrying internal details.
    #[must_use]
    pub fn to_response(&self, expose_details: bool) -> Response {
        let body = ErrorBody {
            error: self.user_message(),
            details: expose_details.then(|| self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

/// Convenience result alias for chat turns.
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ChatError::from(ValidationError::EmptyMessage).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::MissingCredential.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_messages_are_localized() {
        let err = ChatError::from(ValidationError::MessageTooLong {
            max: 2000,
            actual: 2001,
        });
        assert_eq!(err.user_message(), messages::message_too_long(2000));
        assert_eq!(
            ChatError::MissingCredential.user_message(),
            messages::CONFIG_ERROR
        );
        assert_eq!(
            ValidationError::UnsupportedImageType("image/bmp".into()).user_message(),
            messages::INVALID_IMAGE_TYPE
        );
    }
}

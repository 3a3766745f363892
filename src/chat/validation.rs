//! Request validation: message length and attached image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::ChatLimits;
use crate::llm::InlineImage;

use super::error::ValidationError;

/// Validate a chat message and return it trimmed.
///
/// The length limit applies to the raw message, in characters.
///
/// # Errors
/// Returns an error if the message is blank without an image, or too long.
pub fn validate_message(
    message: &str,
    has_image: bool,
    limits: &ChatLimits,
) -> Result<String, ValidationError> {
    let trimmed = message.trim();
    if trimmed.is_empty() && !has_image {
        return Err(ValidationError::EmptyMessage);
    }

    let actual = message.chars().count();
    if actual > limits.max_message_chars {
        return Err(ValidationError::MessageTooLong {
            max: limits.max_message_chars,
            actual,
        });
    }

    Ok(trimmed.to_string())
}

/// Split a `data:<mime>;base64,<payload>` URI into a model image part.
///
/// `image/jpg` is accepted and sent as `image/jpeg`.
///
/// # Errors
/// Returns an error if the URI is malformed, the MIME type is not allowed,
/// the payload is not base64, or the decoded image is too large.
pub fn parse_image_data_uri(
    uri: &str,
    limits: &ChatLimits,
) -> Result<InlineImage, ValidationError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(ValidationError::MalformedImage)?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or(ValidationError::MalformedImage)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ValidationError::MalformedImage)?
        .trim()
        .to_ascii_lowercase();

    if !limits.allowed_image_types.iter().any(|allowed| *allowed == mime) {
        return Err(ValidationError::UnsupportedImageType(mime));
    }

    let payload = payload.trim();
    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| ValidationError::MalformedImage)?;
    if decoded.len() > limits.max_image_bytes {
        return Err(ValidationError::ImageTooLarge {
            max: limits.max_image_bytes,
            actual: decoded.len(),
        });
    }

    let mime_type = if mime == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        mime
    };

    Ok(InlineImage {
        mime_type,
        data: payload.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ChatLimits {
        ChatLimits::default()
    }

    #[test]
    fn test_message_is_trimmed() {
        assert_eq!(
            validate_message("  Apa itu inflasi?\n", false, &limits()).unwrap(),
            "Apa itu inflasi?"
        );
    }

    #[test]
    fn test_blank_message_needs_image() {
        assert_eq!(
            validate_message("   ", false, &limits()),
            Err(ValidationError::EmptyMessage)
        );
        assert_eq!(validate_message("   ", true, &limits()).unwrap(), "");
    }

    #[test]
    fn test_length_limit_counts_chars() {
        let at_limit = "é".repeat(2000);
        assert!(validate_message(&at_limit, false, &limits()).is_ok());

        let over = "a".repeat(2001);
        assert_eq!(
            validate_message(&over, false, &limits()),
            Err(ValidationError::MessageTooLong {
                max: 2000,
                actual: 2001
            })
        );
    }

    #[test]
    fn test_parse_png_data_uri() {
        let image = parse_image_data_uri("data:image/png;base64,aGFsbw==", &limits()).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aGFsbw==");
    }

    #[test]
    fn test_jpg_is_normalized() {
        let image = parse_image_data_uri("data:image/jpg;base64,aGFsbw==", &limits()).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[test]
    fn test_rejects_disallowed_mime() {
        assert_eq!(
            parse_image_data_uri("data:image/bmp;base64,aGFsbw==", &limits()),
            Err(ValidationError::UnsupportedImageType("image/bmp".to_string()))
        );
        assert!(matches!(
            parse_image_data_uri("data:application/pdf;base64,aGFsbw==", &limits()),
            Err(ValidationError::UnsupportedImageType(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_uris() {
        for uri in [
            "aGFsbw==",
            "https://example.com/cat.png",
            "data:image/png,aGFsbw==",
            "data:image/png;base64",
            "data:image/png;base64,not base64!",
        ] {
            assert_eq!(
                parse_image_data_uri(uri, &limits()),
                Err(ValidationError::MalformedImage),
                "{uri}"
            );
        }
    }

    #[test]
    fn test_rejects_oversized_image() {
        let small = ChatLimits {
            max_image_bytes: 3,
            ..ChatLimits::default()
        };
        assert_eq!(
            parse_image_data_uri("data:image/png;base64,aGFsbw==", &small),
            Err(ValidationError::ImageTooLarge { max: 3, actual: 4 })
        );
    }
}

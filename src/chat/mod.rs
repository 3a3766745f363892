//! Chat turns: request validation, prompt building and frame emission.

pub mod error;
pub mod handler;
pub mod prompt;
pub mod validation;

pub use error::{ChatError, ChatResult, ValidationError};
pub use handler::{ChatHandler, PreparedTurn};
pub use prompt::{build_chat_prompt, SYSTEM_PROMPT};
pub use validation::{parse_image_data_uri, validate_message};

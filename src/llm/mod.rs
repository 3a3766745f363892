//! Generative model abstraction.
//!
//! The chat handler only talks to [`GenerativeModel`]; [`gemini::GeminiClient`]
//! is the production implementation.

pub mod error;
pub mod gemini;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Image attached to a prompt, already split out of its data URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64 payload, without the data-URI header.
    pub data: String,
}

/// Model input: one text part and an optional image part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    /// Text part.
    pub text: String,
    /// Image part, sent after the text.
    pub image: Option<InlineImage>,
}

impl Prompt {
    /// Text-only prompt.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// Attach an image part.
    #[must_use]
    pub fn with_image(mut self, image: Option<InlineImage>) -> Self {
        self.image = image;
        self
    }
}

/// Incremental model output: each item is the next chunk of text.
pub type TextStream = BoxStream<'static, LlmResult<String>>;

/// A text/vision completion service.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Single-shot generation.
    ///
    /// # Errors
    /// Returns an error if the call fails or yields no text.
    async fn generate(&self, prompt: &Prompt) -> LlmResult<String>;

    /// Streaming generation.
    ///
    /// # Errors
    /// Returns an error if the stream cannot be opened. Errors during the
    /// stream are yielded as items.
    async fn generate_stream(&self, prompt: &Prompt) -> LlmResult<TextStream>;
}

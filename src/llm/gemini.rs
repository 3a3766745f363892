//! Gemini REST client.
//!
//! - `POST {base}/v1beta/models/{model}:generateContent` for single-shot calls.
//! - `POST {base}/v1beta/models/{model}:streamGenerateContent?alt=sse` for
//!   streaming; the body is an event stream of partial responses.
//!
//! The credential travels in the `x-goog-api-key` header, never in the URL,
//! so it does not end up in request logs.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::protocol::line_buffer::LineBuffer;
use crate::protocol::sse::data_payload;

use super::error::{LlmError, LlmResult};
use super::{GenerativeModel, Prompt, TextStream};

const API_KEY_HEADER: &str = "x-goog-api-key";
/// Error bodies are cut to this many characters before logging.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

/// Async Gemini client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    request_timeout: Duration,
}

impl GeminiClient {
    /// Create a client for the configured model.
    ///
    /// Streamed replies are bounded by the idle timeout between chunks,
    /// not by a deadline on the whole body.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> LlmResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.stream_idle_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            request_timeout: config.request_timeout,
        })
    }

    /// Model name this client talks to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{method}", self.base_url, self.model)
    }

    async fn post(
        &self,
        url: &str,
        prompt: &Prompt,
        deadline: Option<Duration>,
    ) -> LlmResult<reqwest::Response> {
        let mut parts = vec![Part::Text { text: &prompt.text }];
        if let Some(image) = &prompt.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            });
        }
        let request = GenerateContentRequest {
            contents: [Content { role: "user", parts }],
        };

        let mut builder = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request);
        if let Some(deadline) = deadline {
            builder = builder.timeout(deadline);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> LlmResult<String> {
        let url = self.endpoint("generateContent");
        let response: GenerateContentResponse = self
            .post(&url, prompt, Some(self.request_timeout))
            .await?
            .json()
            .await?;

        if let Some(reason) = response.block_reason() {
            return Err(LlmError::Blocked(reason.to_string()));
        }

        let text = response.text();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    async fn generate_stream(&self, prompt: &Prompt) -> LlmResult<TextStream> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(&url, prompt, None).await?;
        debug!(model = %self.model, "gemini stream opened");

        let mut bytes = Box::pin(response.bytes_stream());
        let chunks = async_stream::stream! {
            let mut lines = LineBuffer::new();
            let mut finished = false;

            while !finished {
                match bytes.next().await {
                    Some(Ok(chunk)) => lines.push(&chunk),
                    Some(Err(err)) => {
                        yield Err(LlmError::from(err));
                        return;
                    }
                    None => finished = true,
                }

                let mut ready: Vec<String> = std::iter::from_fn(|| lines.next_line()).collect();
                if finished {
                    ready.extend(lines.finish());
                    ready.extend(std::iter::from_fn(|| lines.next_line()));
                }

                for line in ready {
                    match parse_stream_line(&line) {
                        Ok(Some(text)) => {
                            yield Ok(text);
                        }
                        Ok(None) => {}
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(chunks))
    }
}

/// Text carried by one line of the provider's event stream.
fn parse_stream_line(line: &str) -> LlmResult<Option<String>> {
    let Some(payload) = data_payload(line) else {
        return Ok(None);
    };
    let response: GenerateContentResponse = serde_json::from_str(payload)?;
    if let Some(reason) = response.block_reason() {
        return Err(LlmError::Blocked(reason.to_string()));
    }
    let text = response.text();
    Ok((!text.is_empty()).then_some(text))
}

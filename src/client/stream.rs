//! HTTP client for the chat endpoint.
//!
//! The response body is read chunk by chunk; a [`LineBuffer`] reassembles
//! lines across reads and each `data: ` line is applied to the
//! [`Conversation`] as soon as it is complete.

use std::fmt::Display;
use std::pin::pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::ChatLimits;
use crate::messages;
use crate::protocol::{decode_line, ChatRequest, ErrorBody, LineBuffer};
use crate::types::MessageId;

use super::conversation::{Conversation, FrameEffect};
use super::error::{ClientError, ClientResult};

const CHAT_PATH: &str = "api/chat";

/// How a turn ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A `done` frame sealed this message.
    Completed(MessageId),
    /// The turn failed; the message holds `error`.
    Failed {
        /// Assistant message carrying the error text.
        message: MessageId,
        /// Error text.
        error: String,
    },
    /// The stream ended without a terminal frame.
    Interrupted(Option<MessageId>),
}

/// Streaming chat client.
pub struct StreamingChatClient {
    http: Client,
    endpoint: Url,
    max_message_chars: usize,
}

impl StreamingChatClient {
    /// Client for the server at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            endpoint: base.join(CHAT_PATH)?,
            max_message_chars: ChatLimits::default().max_message_chars,
        })
    }

    /// Override the message length limit checked before sending.
    #[must_use]
    pub const fn with_max_message_chars(mut self, max: usize) -> Self {
        self.max_message_chars = max;
        self
    }

    /// Chat endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a message and stream the reply into `conversation`.
    ///
    /// Returns `Ok(None)` when there is nothing to send. `observer` runs
    /// after every change to the conversation.
    ///
    /// # Errors
    /// Returns an error if a turn is already open or the message is too long.
    /// Network and server failures end the turn and are reported through
    /// [`TurnOutcome::Failed`].
    pub async fn send_message<F>(
        &self,
        conversation: &mut Conversation,
        content: &str,
        image: Option<String>,
        mut observer: F,
    ) -> ClientResult<Option<TurnOutcome>>
    where
        F: FnMut(&Conversation, &FrameEffect),
    {
        let message = content.trim();
        let image = image.filter(|uri| !uri.trim().is_empty());
        if message.is_empty() && image.is_none() {
            return Ok(None);
        }
        if conversation.is_busy() {
            return Err(ClientError::Busy);
        }
        let actual = message.chars().count();
        if actual > self.max_message_chars {
            return Err(ClientError::MessageTooLong {
                max: self.max_message_chars,
                actual,
            });
        }

        conversation.push_user(message, image.clone());
        let request = ChatRequest {
            message: message.to_string(),
            image,
        };
        Ok(Some(self.run_turn(conversation, &request, &mut observer).await))
    }

    /// Resend the user message behind `target` as a new turn.
    ///
    /// `target` may be the user message itself or any later message of
    /// its turn, such as a failed reply.
    ///
    /// # Errors
    /// Returns an error if no user message precedes `target`, or as
    /// [`Self::send_message`].
    pub async fn retry_message<F>(
        &self,
        conversation: &mut Conversation,
        target: MessageId,
        observer: F,
    ) -> ClientResult<Option<TurnOutcome>>
    where
        F: FnMut(&Conversation, &FrameEffect),
    {
        let source = conversation
            .user_message_for(target)
            .ok_or(ClientError::NothingToRetry)?;
        let (content, image) = (source.content.clone(), source.image.clone());
        self.send_message(conversation, &content, image, observer).await
    }

    async fn run_turn<F>(
        &self,
        conversation: &mut Conversation,
        request: &ChatRequest,
        observer: &mut F,
    ) -> TurnOutcome
    where
        F: FnMut(&Conversation, &FrameEffect),
    {
        let response = match self.http.post(self.endpoint.clone()).json(request).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "chat request failed");
                return fail_turn(conversation, messages::NETWORK_ERROR, observer);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let text = serde_json::from_str::<ErrorBody>(&body)
                .map_or_else(|_| messages::SERVER_ERROR.to_string(), |body| body.error);
            warn!(status = status.as_u16(), error = %text, "chat request rejected");
            return fail_turn(conversation, &text, observer);
        }

        consume_stream(conversation, response.bytes_stream(), observer).await
    }
}

/// Apply an event-stream body to the open turn of `conversation`.
///
/// Stops at the first terminal frame. Malformed frames are skipped; a
/// transport error fails the turn with the network error message.
pub async fn consume_stream<S, B, E, F>(
    conversation: &mut Conversation,
    body: S,
    observer: &mut F,
) -> TurnOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    F: FnMut(&Conversation, &FrameEffect),
{
    let mut body = pin!(body);
    let mut lines = LineBuffer::new();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => lines.push(bytes.as_ref()),
            Err(err) => {
                warn!(error = %err, "chat stream read failed");
                return fail_turn(conversation, messages::NETWORK_ERROR, observer);
            }
        }
        while let Some(line) = lines.next_line() {
            if let Some(outcome) = apply_line(conversation, &line, observer) {
                return outcome;
            }
        }
    }

    let mut rest: Vec<String> = lines.finish().into_iter().collect();
    rest.extend(std::iter::from_fn(|| lines.next_line()));
    for line in rest {
        if let Some(outcome) = apply_line(conversation, &line, observer) {
            return outcome;
        }
    }

    debug!("chat stream ended without a terminal frame");
    TurnOutcome::Interrupted(conversation.end_of_stream())
}

fn apply_line<F>(conversation: &mut Conversation, line: &str, observer: &mut F) -> Option<TurnOutcome>
where
    F: FnMut(&Conversation, &FrameEffect),
{
    let frame = match decode_line(line)? {
        Ok(frame) => frame,
        Err(err) => {
            warn!(error = %err, "skipping malformed frame");
            return None;
        }
    };

    let effect = conversation.apply_frame(frame);
    observer(conversation, &effect);
    match effect {
        FrameEffect::Finished(id) => Some(TurnOutcome::Completed(id)),
        FrameEffect::Failed(id) => Some(TurnOutcome::Failed {
            message: id,
            error: conversation
                .error()
                .unwrap_or(messages::SERVER_ERROR)
                .to_string(),
        }),
        FrameEffect::Started(_) | FrameEffect::Updated(_) | FrameEffect::Ignored => None,
    }
}

fn fail_turn<F>(conversation: &mut Conversation, text: &str, observer: &mut F) -> TurnOutcome
where
    F: FnMut(&Conversation, &FrameEffect),
{
    let id = conversation.fail(text);
    let effect = FrameEffect::Failed(id);
    observer(conversation, &effect);
    TurnOutcome::Failed {
        message: id,
        error: text.to_string(),
    }
}

//! Conversation state driven by stream frames.
//!
//! A turn opens with [`Conversation::push_user`] and closes on the first
//! terminal frame, a failure, or the end of the stream. While a turn is
//! open at most one assistant message is in progress; once the turn is
//! sealed that message never changes again.

use crate::messages;
use crate::protocol::StreamFrame;
use crate::types::{Message, MessageId, Role};

/// What a frame did to the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEffect {
    /// A new assistant message was created.
    Started(MessageId),
    /// The in-progress message's text changed.
    Updated(MessageId),
    /// The turn completed; the message is sealed.
    Finished(MessageId),
    /// The turn failed; the message holds the error text.
    Failed(MessageId),
    /// No turn was open.
    Ignored,
}

/// In-memory conversation with typing and streaming flags.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    is_typing: bool,
    is_streaming: bool,
    error: Option<String>,
    in_progress: Option<MessageId>,
    turn_open: bool,
}

impl Conversation {
    /// Empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Message by id.
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Waiting for the first frame of the turn.
    #[must_use]
    pub const fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// An assistant message is being streamed.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    /// A turn is open; new sends are refused.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.turn_open
    }

    /// Error banner text, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Dismiss the error banner.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// User message behind `id`, for retries: `id` itself when it is a
    /// user message, otherwise the nearest user message before it.
    #[must_use]
    pub fn user_message_for(&self, id: MessageId) -> Option<&Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        self.messages[..=index]
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
    }

    /// Drop every message and reset the flags. Refused while a turn is open.
    pub fn clear(&mut self) -> bool {
        if self.turn_open {
            return false;
        }
        *self = Self::default();
        true
    }

    /// Append a user message and open a turn.
    pub fn push_user(&mut self, content: impl Into<String>, image: Option<String>) -> MessageId {
        let message = Message::user(content, image);
        let id = message.id;
        self.messages.push(message);
        self.error = None;
        self.in_progress = None;
        self.turn_open = true;
        self.is_typing = true;
        self.is_streaming = false;
        id
    }

    /// Apply one decoded frame.
    pub fn apply_frame(&mut self, frame: StreamFrame) -> FrameEffect {
        if !self.turn_open {
            return FrameEffect::Ignored;
        }

        match frame {
            StreamFrame::Content { .. } => {
                let text = frame.display_text().unwrap_or_default().to_string();
                if let Some(message) = self.in_progress_mut() {
                    message.content = text;
                    return FrameEffect::Updated(message.id);
                }
                let id = self.start_assistant(text);
                self.is_typing = false;
                self.is_streaming = true;
                FrameEffect::Started(id)
            }
            StreamFrame::Done {
                content,
                timestamp,
                materials,
            } => {
                let id = match self.in_progress_mut() {
                    Some(message) => {
                        message.content = content;
                        message.id
                    }
                    None => self.start_assistant(content),
                };
                if let Some(message) = self.in_progress_mut() {
                    if let Some(timestamp) = timestamp {
                        message.timestamp = timestamp;
                    }
                    message.materials = materials;
                }
                self.seal();
                FrameEffect::Finished(id)
            }
            StreamFrame::Error { error } => {
                let text = error.unwrap_or_else(|| messages::SERVER_ERROR.to_string());
                FrameEffect::Failed(self.fail(text))
            }
        }
    }

    /// Record a failure for the open turn and seal it.
    ///
    /// The in-progress message takes the error text; without one, a new
    /// assistant message is appended.
    pub fn fail(&mut self, text: impl Into<String>) -> MessageId {
        let text = text.into();
        let id = match self.in_progress_mut() {
            Some(message) => {
                message.content.clone_from(&text);
                message.id
            }
            None => self.start_assistant(text.clone()),
        };
        self.error = Some(text);
        self.seal();
        id
    }

    /// The stream ended without a terminal frame: keep what arrived and seal.
    pub fn end_of_stream(&mut self) -> Option<MessageId> {
        if !self.turn_open {
            return None;
        }
        let id = self.in_progress;
        self.seal();
        id
    }

    fn start_assistant(&mut self, content: String) -> MessageId {
        let message = Message::assistant(content);
        let id = message.id;
        self.messages.push(message);
        self.in_progress = Some(id);
        id
    }

    fn in_progress_mut(&mut self) -> Option<&mut Message> {
        let id = self.in_progress?;
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }

    fn seal(&mut self) {
        self.in_progress = None;
        self.turn_open = false;
        self.is_typing = false;
        self.is_streaming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::material;
    use crate::types::MaterialType;
    use chrono::{TimeZone, Utc};

    fn assistant_messages(conversation: &Conversation) -> Vec<&Message> {
        conversation
            .messages()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .collect()
    }

    #[test]
    fn test_two_content_frames_then_done() {
        let mut conversation = Conversation::new();
        conversation.push_user("Berikan saya materi ekonomi", None);
        assert!(conversation.is_typing());

        let first = conversation.apply_frame(StreamFrame::content("Berikut ", "Berikut "));
        let FrameEffect::Started(id) = first else {
            panic!("expected start, got {first:?}");
        };
        assert!(conversation.is_streaming());
        assert!(!conversation.is_typing());

        assert_eq!(
            conversation.apply_frame(StreamFrame::content("materinya.", "Berikut materinya.")),
            FrameEffect::Updated(id)
        );

        let finished_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let materials = vec![material(1, "ekonomi", MaterialType::Video, 0)];
        assert_eq!(
            conversation.apply_frame(StreamFrame::done(
                "Berikut materinya.",
                finished_at,
                materials.clone()
            )),
            FrameEffect::Finished(id)
        );

        let replies = assistant_messages(&conversation);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, "Berikut materinya.");
        assert_eq!(replies[0].timestamp, finished_at);
        assert_eq!(replies[0].materials.as_ref(), Some(&materials));
        assert!(!conversation.is_streaming());
        assert!(!conversation.is_busy());
    }

    #[test]
    fn test_cumulative_text_wins_over_deltas() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        conversation.apply_frame(StreamFrame::content("Ha", "Ha"));
        // The "lo" delta was lost; the cumulative field still carries it.
        let effect = conversation.apply_frame(StreamFrame::content(" apa kabar", "Halo apa kabar"));

        let FrameEffect::Updated(id) = effect else {
            panic!("expected update, got {effect:?}");
        };
        assert_eq!(conversation.message(id).unwrap().content, "Halo apa kabar");
    }

    #[test]
    fn test_content_without_cumulative_field_uses_delta() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        let effect = conversation.apply_frame(StreamFrame::Content {
            content: "Hai".to_string(),
            full_content: None,
            materials: None,
        });
        let FrameEffect::Started(id) = effect else {
            panic!("expected start, got {effect:?}");
        };
        assert_eq!(conversation.message(id).unwrap().content, "Hai");
    }

    #[test]
    fn test_error_after_one_content_frame() {
        let mut conversation = Conversation::new();
        conversation.push_user("Apa itu inflasi?", None);
        conversation.apply_frame(StreamFrame::content("Inflasi ", "Inflasi "));
        let effect = conversation.apply_frame(StreamFrame::error(messages::SERVER_ERROR));

        assert!(matches!(effect, FrameEffect::Failed(_)));
        let replies = assistant_messages(&conversation);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, messages::SERVER_ERROR);
        assert!(!conversation.is_streaming());
        assert!(!conversation.is_typing());
        assert_eq!(conversation.error(), Some(messages::SERVER_ERROR));
    }

    #[test]
    fn test_error_before_content_appends_message() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        conversation.apply_frame(StreamFrame::Error { error: None });

        let replies = assistant_messages(&conversation);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, messages::SERVER_ERROR);
    }

    #[test]
    fn test_done_without_content_creates_message() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        let effect = conversation.apply_frame(StreamFrame::done("Hai!", Utc::now(), Vec::new()));

        let FrameEffect::Finished(id) = effect else {
            panic!("expected finish, got {effect:?}");
        };
        let reply = conversation.message(id).unwrap();
        assert_eq!(reply.content, "Hai!");
        assert!(reply.materials.is_none());
    }

    #[test]
    fn test_sealed_turn_ignores_late_frames() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        conversation.apply_frame(StreamFrame::done("Hai!", Utc::now(), Vec::new()));

        assert_eq!(
            conversation.apply_frame(StreamFrame::content("x", "Hai!x")),
            FrameEffect::Ignored
        );
        assert_eq!(assistant_messages(&conversation)[0].content, "Hai!");
    }

    #[test]
    fn test_end_of_stream_keeps_partial_text() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        conversation.apply_frame(StreamFrame::content("Hai", "Hai"));

        let id = conversation.end_of_stream().unwrap();
        assert_eq!(conversation.message(id).unwrap().content, "Hai");
        assert!(!conversation.is_busy());
        assert!(conversation.end_of_stream().is_none());
    }

    #[test]
    fn test_retry_and_banner() {
        let mut conversation = Conversation::new();
        conversation.push_user("Soal fisika", Some("data:image/png;base64,aGFsbw==".into()));
        conversation.fail(messages::NETWORK_ERROR);
        assert_eq!(conversation.error(), Some(messages::NETWORK_ERROR));

        conversation.clear_error();
        assert!(conversation.error().is_none());

        let reply = conversation.messages()[1].id;
        let source = conversation.user_message_for(reply).unwrap();
        assert_eq!(source.content, "Soal fisika");
        assert!(source.image.is_some());
    }

    #[test]
    fn test_retry_source_of_older_reply() {
        let mut conversation = Conversation::new();
        let first = conversation.push_user("Apa itu inflasi?", None);
        conversation.apply_frame(StreamFrame::done("Kenaikan harga.", Utc::now(), Vec::new()));
        let second = conversation.push_user("Apa itu deflasi?", None);
        conversation.apply_frame(StreamFrame::done("Penurunan harga.", Utc::now(), Vec::new()));

        let older_reply = conversation.messages()[1].id;
        assert_eq!(conversation.user_message_for(older_reply).unwrap().id, first);
        assert_eq!(conversation.user_message_for(second).unwrap().id, second);
        assert!(conversation.user_message_for(MessageId::new()).is_none());
    }

    #[test]
    fn test_clear_refused_while_busy() {
        let mut conversation = Conversation::new();
        conversation.push_user("Halo", None);
        assert!(!conversation.clear());
        conversation.end_of_stream();
        assert!(conversation.clear());
        assert!(conversation.messages().is_empty());
    }
}

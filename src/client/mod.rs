//! Streaming chat client.
//!
//! [`Conversation`] is the state machine; [`StreamingChatClient`] feeds it
//! frames read from the server.

pub mod conversation;
pub mod error;
pub mod stream;

pub use conversation::{Conversation, FrameEffect};
pub use error::{ClientError, ClientResult};
pub use stream::{consume_stream, StreamingChatClient, TurnOutcome};

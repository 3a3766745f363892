//! Streaming chat protocol.
//!
//! One HTTP response per chat turn, `text/event-stream`, one JSON
//! [`StreamFrame`] per event:
//!
//! ```text
//! data: {"type":"content","content":"<delta>","fullContent":"<cumulative>"}
//! data: {"type":"done","content":"<full>","timestamp":"<ISO8601>","materials":[...]}
//! data: {"type":"error","error":"<message>"}
//! ```

pub mod body;
pub mod frame;
pub mod line_buffer;
pub mod sse;

pub use body::{ChatRequest, ErrorBody, MaterialsResponse};
pub use frame::StreamFrame;
pub use line_buffer::LineBuffer;
pub use sse::{decode_line, encode_frame, DATA_PREFIX};

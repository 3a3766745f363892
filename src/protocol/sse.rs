//! `data:` line encoding for the event stream.

use super::frame::StreamFrame;

/// Prefix of an event data line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload of a `data:` line, or `None` for any other line (blank separators, comments).
///
/// The space after the colon is optional, as in the event-stream format.
#[must_use]
pub fn data_payload(line: &str) -> Option<&str> {
    let rest = line.trim_end_matches('\r').strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode one line into a frame.
///
/// Returns `None` for lines that carry no data, `Some(Err(_))` for malformed payloads.
#[must_use]
pub fn decode_line(line: &str) -> Option<Result<StreamFrame, serde_json::Error>> {
    data_payload(line).map(serde_json::from_str)
}

/// Encode a frame as a complete event (`data: {json}\n\n`).
///
/// # Errors
/// Returns an error if the frame cannot be serialized.
pub fn encode_frame(frame: &StreamFrame) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(frame)?;
    Ok(format!("{DATA_PREFIX}{json}\n\n"))
}

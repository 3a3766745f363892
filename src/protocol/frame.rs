//! Wire records of the chat stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Material;

/// One server-sent event of a chat turn.
///
/// `content` frames carry both the new delta and the cumulative text so far.
/// Receivers must treat the cumulative text as authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamFrame {
    /// Incremental model output.
    Content {
        /// Text added by this chunk.
        #[serde(default)]
        content: String,
        /// All text produced so far in this turn.
        #[serde(
            rename = "fullContent",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        full_content: Option<String>,
        /// Recommended materials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        materials: Option<Vec<Material>>,
    },
    /// Successful end of the turn.
    Done {
        /// Final full text.
        #[serde(default)]
        content: String,
        /// Completion time.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
        /// Recommended materials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        materials: Option<Vec<Material>>,
    },
    /// Failed end of the turn.
    Error {
        /// User-facing error text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl StreamFrame {
    /// Content frame for one model chunk.
    #[must_use]
    pub fn content(delta: impl Into<String>, full: impl Into<String>) -> Self {
        Self::Content {
            content: delta.into(),
            full_content: Some(full.into()),
            materials: None,
        }
    }

    /// Terminal success frame. An empty material list is left off the wire.
    #[must_use]
    pub fn done(full: impl Into<String>, timestamp: DateTime<Utc>, materials: Vec<Material>) -> Self {
        Self::Done {
            content: full.into(),
            timestamp: Some(timestamp),
            materials: (!materials.is_empty()).then_some(materials),
        }
    }

    /// Terminal failure frame.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: Some(message.into()),
        }
    }

    /// Whether this frame ends the turn.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    /// Text the receiver should display after applying this frame.
    ///
    /// Falls back to the delta when a content frame lacks the cumulative field.
    #[must_use]
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::Content {
                content,
                full_content,
                ..
            } => Some(full_content.as_deref().unwrap_or(content)),
            Self::Done { content, .. } => Some(content),
            Self::Error { .. } => None,
        }
    }
}

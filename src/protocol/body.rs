//! JSON bodies exchanged outside the event stream.

use serde::{Deserialize, Serialize};

use crate::types::Material;

/// Chat request sent by the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User text. May be empty when an image is attached.
    #[serde(default)]
    pub message: String,
    /// Attached image as `data:<mime>;base64,<payload>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body of every non-stream error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// User-facing message.
    pub error: String,
    /// Internal details, only in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Response of the material listing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialsResponse {
    /// Materials, newest first.
    pub materials: Vec<Material>,
    /// Number of materials returned.
    pub count: usize,
}

impl From<Vec<Material>> for MaterialsResponse {
    fn from(materials: Vec<Material>) -> Self {
        let count = materials.len();
        Self { materials, count }
    }
}

//! Chat turn orchestration.
//!
//! A turn runs strictly in sequence: validate, classify, fetch materials,
//! build the prompt, then stream the model output as [`StreamFrame`]s.
//! Everything up to the prompt can fail with a [`ChatError`]; once
//! streaming starts, failures become a single terminal error frame.

use std::sync::Arc;

use chrono::Utc;
use futures::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::{ChatLimits, MaterialsConfig};
use crate::llm::{GenerativeModel, LlmError, Prompt};
use crate::materials::{MaterialClassifier, MaterialQuery, MaterialStore};
use crate::messages;
use crate::protocol::{ChatRequest, StreamFrame};
use crate::types::{Material, MaterialAnalysis, TurnId};

use super::error::{ChatError, ChatResult};
use super::prompt::build_chat_prompt;
use super::validation::{parse_image_data_uri, validate_message};

/// Handles chat turns. Shared across requests; holds no per-turn state.
pub struct ChatHandler {
    model: Option<Arc<dyn GenerativeModel>>,
    store: Arc<dyn MaterialStore>,
    classifier: MaterialClassifier,
    limits: ChatLimits,
    max_materials: usize,
    expose_details: bool,
}

impl ChatHandler {
    /// Create a handler.
    ///
    /// `model` is `None` when no provider credential is configured; every
    /// turn then fails with [`ChatError::MissingCredential`].
    ///
    /// # Errors
    /// Returns an error if the classifier cannot be built.
    pub fn new(
        model: Option<Arc<dyn GenerativeModel>>,
        store: Arc<dyn MaterialStore>,
        limits: &ChatLimits,
        materials: &MaterialsConfig,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            model,
            store,
            classifier: MaterialClassifier::new(&materials.subjects)?,
            limits: limits.clone(),
            max_materials: materials.max_per_request,
            expose_details: false,
        })
    }

    /// Append internal error details to error frames.
    #[must_use]
    pub const fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    /// Whether a model is configured.
    #[must_use]
    pub const fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Whether error details are exposed to users.
    #[must_use]
    pub const fn exposes_details(&self) -> bool {
        self.expose_details
    }

    /// Validate `request` and do everything that precedes generation.
    ///
    /// # Errors
    /// Returns an error if the request is invalid or no model is configured.
    pub async fn prepare(&self, request: ChatRequest) -> ChatResult<PreparedTurn> {
        let turn_id = TurnId::new();
        let image_uri = request
            .image
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty());

        let message = validate_message(&request.message, image_uri.is_some(), &self.limits)?;
        let model = self.model.clone().ok_or(ChatError::MissingCredential)?;
        let image = image_uri
            .map(|uri| parse_image_data_uri(uri, &self.limits))
            .transpose()?;

        let analysis = if message.is_empty() {
            MaterialAnalysis::not_a_request()
        } else {
            self.classifier.analyze(model.as_ref(), &message).await
        };
        debug!(
            %turn_id,
            is_request = analysis.is_request,
            subject = ?analysis.subject,
            material_type = ?analysis.material_type,
            "message classified"
        );

        let materials = self.recommend(&analysis).await;
        let prompt = Prompt::text(build_chat_prompt(&message, &materials)).with_image(image);

        info!(
            %turn_id,
            chars = message.chars().count(),
            has_image = prompt.image.is_some(),
            materials = materials.len(),
            "chat turn prepared"
        );

        Ok(PreparedTurn {
            turn_id,
            model,
            prompt,
            materials,
            expose_details: self.expose_details,
        })
    }

    /// Materials for a classification. Lookup failures yield an empty list.
    pub async fn recommend(&self, analysis: &MaterialAnalysis) -> Vec<Material> {
        if !analysis.is_request {
            return Vec::new();
        }

        let query = MaterialQuery::latest(self.max_materials)
            .with_subject(analysis.subject.clone())
            .with_type(analysis.material_type);

        match self.store.fetch_materials(&query).await {
            Ok(materials) => materials,
            Err(err) => {
                warn!(error = %err, "material lookup failed; continuing without materials");
                Vec::new()
            }
        }
    }
}

/// A validated turn, ready to stream.
pub struct PreparedTurn {
    turn_id: TurnId,
    model: Arc<dyn GenerativeModel>,
    prompt: Prompt,
    materials: Vec<Material>,
    expose_details: bool,
}

impl PreparedTurn {
    /// Turn identifier used in logs.
    #[must_use]
    pub const fn id(&self) -> TurnId {
        self.turn_id
    }

    /// Prompt that will be sent to the model.
    #[must_use]
    pub const fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Materials attached to the final frame.
    #[must_use]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Run generation and emit frames.
    ///
    /// Yields `content` frames with cumulative text, then exactly one
    /// terminal frame (`done` or `error`), then ends.
    pub fn into_frames(self) -> impl Stream<Item = StreamFrame> + Send + 'static {
        let Self {
            turn_id,
            model,
            prompt,
            materials,
            expose_details,
        } = self;

        async_stream::stream! {
            let mut chunks = match model.generate_stream(&prompt).await {
                Ok(chunks) => chunks,
                Err(err) => {
                    yield failure_frame(turn_id, &err, expose_details);
                    return;
                }
            };

            let mut full = String::new();
            let mut count = 0_usize;
            while let Some(item) = chunks.next().await {
                match item {
                    Ok(delta) if delta.is_empty() => {}
                    Ok(delta) => {
                        full.push_str(&delta);
                        count += 1;
                        yield StreamFrame::content(delta, full.clone());
                    }
                    Err(err) => {
                        yield failure_frame(turn_id, &err, expose_details);
                        return;
                    }
                }
            }

            if full.is_empty() {
                warn!(%turn_id, "model stream ended without text");
                yield StreamFrame::error(messages::NO_AI_RESPONSE);
                return;
            }

            info!(
                %turn_id,
                chunks = count,
                chars = full.chars().count(),
                materials = materials.len(),
                "chat turn completed"
            );
            yield StreamFrame::done(full, Utc::now(), materials);
        }
    }
}

fn failure_frame(turn_id: TurnId, err: &LlmError, expose_details: bool) -> StreamFrame {
    error!(%turn_id, error = %err, "chat generation failed");
    let message = if err.is_auth_failure() {
        messages::CONFIG_ERROR
    } else {
        messages::SERVER_ERROR
    };
    if expose_details {
        StreamFrame::error(format!("{message} ({err})"))
    } else {
        StreamFrame::error(message)
    }
}

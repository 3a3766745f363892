//! HTTP route handlers for the learning assistant API.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::chat::{ChatError, ValidationError};
use crate::materials::MaterialQuery;
use crate::protocol::{ChatRequest, MaterialsResponse};
use crate::types::MaterialType;

use super::state::AppState;

/// Create the API router with all routes. Unknown paths fall through to
/// the static front-end directory.
///
/// The chat body limit is sized so that the largest accepted image reaches
/// validation instead of being cut off by the extractor.
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.server.static_dir);
    let body_limit = state.config.chat.request_body_limit();
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/chat",
            post(chat).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/materials", get(list_materials))
        .fallback_service(assets)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.chat.has_model(),
    }))
}

/// Handle one chat turn: validation errors as JSON, the reply as an event stream.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let expose = state.chat.exposes_details();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "chat request body rejected");
            return ChatError::from(ValidationError::InvalidFormat(rejection.body_text()))
                .to_response(expose);
        }
    };

    match state.chat.prepare(request).await {
        Ok(turn) => {
            info!(turn = %turn.id(), materials = turn.materials().len(), "chat turn streaming");
            let events = turn
                .into_frames()
                .map(|frame| Event::default().json_data(frame));
            Sse::new(events).into_response()
        }
        Err(err) => {
            match &err {
                ChatError::Validation(cause) => warn!(error = %cause, "chat request invalid"),
                other => error!(error = %other, "chat request failed"),
            }
            err.to_response(expose)
        }
    }
}

/// Query string of the material listing.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialsParams {
    /// Subject substring.
    pub subject: Option<String>,
    /// Material type; ignored unless it is a known type.
    #[serde(rename = "type")]
    pub material_type: Option<String>,
}

/// List the newest materials, optionally filtered.
async fn list_materials(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MaterialsParams>,
) -> Result<Json<MaterialsResponse>, Response> {
    let material_type = params
        .material_type
        .as_deref()
        .and_then(|t| t.parse::<MaterialType>().ok());
    let query = MaterialQuery::latest(state.config.materials.max_per_request)
        .with_subject(params.subject)
        .with_type(material_type);

    match state.store.fetch_materials(&query).await {
        Ok(materials) => Ok(Json(MaterialsResponse::from(materials))),
        Err(err) => {
            error!(error = %err, "material listing failed");
            Err(ChatError::from(err).to_response(state.chat.exposes_details()))
        }
    }
}

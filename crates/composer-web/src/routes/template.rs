//! Template and plain-text routes.

use axum::extract::State;
use axum::Json;
use notification_core::NotificationTemplate;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// The active notification template.
pub async fn get_template(State(state): State<AppState>) -> Json<NotificationTemplate> {
    Json(state.template.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub struct PlainTextRequest {
    /// Edited message markup.
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PlainTextResponse {
    pub text: String,
}

/// Convert edited markup to the plain text that will be delivered.
pub async fn plain_text(
    State(state): State<AppState>,
    Json(req): Json<PlainTextRequest>,
) -> Json<PlainTextResponse> {
    Json(PlainTextResponse {
        text: state.normalizer.normalize(&req.content),
    })
}

//! Delivery routes: Slack, PagerDuty notes and status updates.
//!
//! Every message is normalized with the state's plain-text normalizer before
//! it leaves the service, so edited markup and plain text are delivered
//! identically.

use axum::extract::State;
use axum::Json;
use pagerduty_client::{Note, StatusUpdateOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WebError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SlackRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct IncidentMessageRequest {
    /// PagerDuty incident object ID.
    pub incident_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeliveryResponse<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> DeliveryResponse<T> {
    fn ok(message: &'static str, data: Option<T>) -> Json<Self> {
        Json(Self {
            success: true,
            message,
            data,
        })
    }
}

fn normalized(state: &AppState, message: &str) -> Result<String> {
    let text = state.normalizer.normalize(message);
    if text.is_empty() {
        return Err(WebError::BadRequest("message is empty".to_string()));
    }
    Ok(text)
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WebError::BadRequest(format!("{} is required", field)));
    }
    Ok(value)
}

/// Post the message to the Slack channel.
pub async fn send_slack(
    State(state): State<AppState>,
    Json(req): Json<SlackRequest>,
) -> Result<Json<DeliveryResponse<()>>> {
    let text = normalized(&state, &req.message)?;
    let broadcaster = state.broadcaster.as_ref().ok_or(WebError::SlackDisabled)?;

    broadcaster.send_notification(&text).await?;
    Ok(DeliveryResponse::ok("Notification sent successfully", None))
}

/// Add the message as a note on the incident.
pub async fn add_note(
    State(state): State<AppState>,
    Json(req): Json<IncidentMessageRequest>,
) -> Result<Json<DeliveryResponse<Note>>> {
    let incident_id = required("incident_id", &req.incident_id)?;
    let text = normalized(&state, &req.message)?;

    let note = state.pagerduty.add_note(incident_id, &text).await?;
    Ok(DeliveryResponse::ok("Note added successfully", Some(note)))
}

/// Post the message as a status update, which also adds it as a note.
pub async fn status_update(
    State(state): State<AppState>,
    Json(req): Json<IncidentMessageRequest>,
) -> Result<Json<DeliveryResponse<StatusUpdateOutcome>>> {
    let incident_id = required("incident_id", &req.incident_id)?;
    let text = normalized(&state, &req.message)?;

    let outcome = state.pagerduty.send_status_update(incident_id, &text).await?;
    info!(incident_id = %incident_id, "Status update delivered");
    Ok(DeliveryResponse::ok(
        "Status update and note sent successfully",
        Some(outcome),
    ))
}

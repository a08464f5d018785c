//! Incident fetch and render routes.

use axum::extract::{Path, State};
use axum::Json;
use notification_core::{IncidentFacts, RenderRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

fn first_update() -> u32 {
    1
}

/// Request to fetch an incident and render a notification.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub ticket_number: String,
    #[serde(default = "first_update")]
    pub update_number: u32,
    #[serde(default)]
    pub resolve: bool,
    #[serde(default)]
    pub downgrade: bool,
}

/// Request to re-render from facts the client already holds.
#[derive(Debug, Deserialize)]
pub struct RenderBody {
    pub incident: IncidentFacts,
    pub ticket_number: String,
    #[serde(default = "first_update")]
    pub update_number: u32,
    #[serde(default)]
    pub resolve: bool,
    #[serde(default)]
    pub downgrade: bool,
}

/// Rendered message together with the facts it was rendered from.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub notification_message: String,
    pub incident: IncidentFacts,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub notification_message: String,
}

/// Fetch incident facts from PagerDuty and render the first message.
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let facts = state.pagerduty.incident_facts(&req.ticket_number).await?;

    let request = RenderRequest::new(facts, &req.ticket_number)
        .with_update_number(req.update_number)
        .with_resolve(req.resolve)
        .with_downgrade(req.downgrade);
    let notification_message = state.renderer.render(&state.template, &request)?;

    info!(
        ticket = %req.ticket_number,
        update = req.update_number,
        "Generated notification"
    );
    Ok(Json(GenerateResponse {
        notification_message,
        incident: request.facts,
    }))
}

/// Fetch incident facts only.
pub async fn get_incident(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> Result<Json<IncidentFacts>> {
    let facts = state.pagerduty.incident_facts(&ticket_number).await?;
    Ok(Json(facts))
}

/// Render from client-held facts without calling PagerDuty.
pub async fn render(
    State(state): State<AppState>,
    Json(body): Json<RenderBody>,
) -> Result<Json<RenderResponse>> {
    let request = RenderRequest::new(body.incident, body.ticket_number)
        .with_update_number(body.update_number)
        .with_resolve(body.resolve)
        .with_downgrade(body.downgrade);
    let notification_message = state.renderer.render(&state.template, &request)?;

    Ok(Json(RenderResponse {
        notification_message,
    }))
}

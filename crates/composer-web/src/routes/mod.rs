//! Route handlers for the composer web API.

pub mod delivery;
pub mod health;
pub mod incident;
pub mod template;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Composition
        .route("/api/template", get(template::get_template))
        .route("/api/generate", post(incident::generate))
        .route("/api/incident/:ticket_number", get(incident::get_incident))
        .route("/api/render", post(incident::render))
        .route("/api/plain-text", post(template::plain_text))
        // Delivery
        .route("/api/slack/send", post(delivery::send_slack))
        .route("/api/add-note", post(delivery::add_note))
        .route("/api/status-update", post(delivery::status_update))
}

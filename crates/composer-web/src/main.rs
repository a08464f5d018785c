//! HTTP API for composing incident notifications.
//!
//! Fetches incidents from PagerDuty, renders notification text from the
//! configured template, and delivers it to Slack and PagerDuty.

mod config;
mod error;
mod routes;
mod state;

use broadcaster::Broadcaster;
use notification_core::{
    fetch_or_default, template_source_from_env, PlainTextNormalizer, Renderer, TemplateOrigin,
};
use pagerduty_client::PagerDutyClient;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("composer_web=info".parse()?)
                .add_directive("notification_core=info".parse()?),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting composer web server");

    // Load the template once; failures fall back to the built-in record
    let source = template_source_from_env()?;
    let (template, origin) = fetch_or_default(source.as_ref()).await;
    if let TemplateOrigin::BuiltIn { reason } = &origin {
        warn!(reason = %reason, "Using built-in notification template");
    }

    let pagerduty = PagerDutyClient::new(config.pagerduty.clone())?;
    let broadcaster = match config.slack.clone() {
        Some(slack) => Some(Broadcaster::new(slack)?),
        None => {
            warn!("SLACK_WEBHOOK_URL not set, Slack delivery disabled");
            None
        }
    };

    // Build application state
    let links = config.render_links();
    let normalizer = PlainTextNormalizer::for_links(&links)?;
    let renderer = Renderer::with_links(links);
    let state = AppState::new(template, renderer, normalizer, pagerduty, broadcaster);

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Composer web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

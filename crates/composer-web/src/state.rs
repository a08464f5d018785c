//! Application state shared across handlers.

use std::sync::Arc;

use broadcaster::Broadcaster;
use notification_core::{NotificationTemplate, PlainTextNormalizer, Renderer};
use pagerduty_client::PagerDutyClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Template loaded at startup.
    pub template: Arc<NotificationTemplate>,
    /// Renderer used by every render path.
    pub renderer: Arc<Renderer>,
    /// Normalizer matching the renderer's incident links.
    pub normalizer: Arc<PlainTextNormalizer>,
    /// PagerDuty client.
    pub pagerduty: PagerDutyClient,
    /// Slack broadcaster, when a webhook is configured.
    pub broadcaster: Option<Broadcaster>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        template: NotificationTemplate,
        renderer: Renderer,
        normalizer: PlainTextNormalizer,
        pagerduty: PagerDutyClient,
        broadcaster: Option<Broadcaster>,
    ) -> Self {
        Self {
            template: Arc::new(template),
            renderer: Arc::new(renderer),
            normalizer: Arc::new(normalizer),
            pagerduty,
            broadcaster,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use notification_core::RenderLinks;
    use pagerduty_client::PagerDutyConfig;

    let pagerduty = PagerDutyClient::new(
        PagerDutyConfig::new("test-token").with_api_url("http://127.0.0.1:1"),
    )
    .unwrap();
    let links = RenderLinks::for_web_url("https://acme.pagerduty.com");
    AppState::new(
        NotificationTemplate::builtin(),
        Renderer::with_links(links.clone()),
        PlainTextNormalizer::for_links(&links).unwrap(),
        pagerduty,
        None,
    )
}

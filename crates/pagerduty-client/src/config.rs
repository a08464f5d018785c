//! Configuration types for pagerduty-client.

use std::env;

use crate::error::PagerDutyError;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

/// Default web UI base URL, used for links in status updates.
pub const DEFAULT_WEB_URL: &str = "https://discoveryinc.pagerduty.com";

/// Configuration for connecting to the PagerDuty REST API.
#[derive(Clone)]
pub struct PagerDutyConfig {
    /// REST API token.
    pub token: String,
    /// Base URL of the REST API (e.g., "https://api.pagerduty.com").
    pub api_url: String,
    /// Base URL of the account's web UI.
    pub web_url: String,
}

impl PagerDutyConfig {
    /// Create a configuration for the public API.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
        }
    }

    /// Point the client at a different API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = web_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `PAGER_DUTY_TOKEN` | REST API token | (required) |
    /// | `PAGERDUTY_API_URL` | REST API base URL | `https://api.pagerduty.com` |
    /// | `PAGERDUTY_WEB_URL` | Web UI base URL | `https://discoveryinc.pagerduty.com` |
    pub fn from_env() -> Result<Self, PagerDutyError> {
        let token = env::var("PAGER_DUTY_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                PagerDutyError::Config("PAGER_DUTY_TOKEN environment variable is required".into())
            })?;

        Ok(Self::new(token).with_env_urls())
    }

    /// Apply `PAGERDUTY_API_URL` and `PAGERDUTY_WEB_URL` when they are set.
    pub fn with_env_urls(mut self) -> Self {
        if let Ok(api_url) = env::var("PAGERDUTY_API_URL") {
            self = self.with_api_url(api_url);
        }
        if let Ok(web_url) = env::var("PAGERDUTY_WEB_URL") {
            self = self.with_web_url(web_url);
        }
        self
    }

    /// Get the incident endpoint URL. Accepts an incident number or ID.
    pub fn incident_url(&self, incident: &str) -> String {
        format!(
            "{}/incidents/{}",
            self.api_url,
            urlencoding::encode(incident)
        )
    }

    /// Get the log entries endpoint URL for an incident ID.
    pub fn log_entries_url(&self, incident_id: &str) -> String {
        format!("{}/log_entries", self.incident_url(incident_id))
    }

    pub fn notes_url(&self, incident_id: &str) -> String {
        format!("{}/notes", self.incident_url(incident_id))
    }

    pub fn status_updates_url(&self, incident_id: &str) -> String {
        format!("{}/status_updates", self.incident_url(incident_id))
    }

    /// Get the endpoint for the token's own user.
    pub fn current_user_url(&self) -> String {
        format!("{}/users/me", self.api_url)
    }

    /// Web UI link to an incident.
    pub fn incident_web_url(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}", self.web_url, incident_id)
    }

    /// Web UI link to a service.
    pub fn service_web_url(&self, service_id: &str) -> String {
        format!("{}/service-directory/{}", self.web_url, service_id)
    }

    /// Status page link to an incident.
    pub fn status_page_url(&self, incident_id: &str) -> String {
        format!("{}/status-dashboard/incidents/{}", self.web_url, incident_id)
    }
}

impl std::fmt::Debug for PagerDutyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("web_url", &self.web_url)
            .finish()
    }
}

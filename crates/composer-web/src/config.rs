//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use broadcaster::SlackConfig;
use notification_core::RenderLinks;
use pagerduty_client::{PagerDutyConfig, PagerDutyError};

/// Composer web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// PagerDuty API settings.
    pub pagerduty: PagerDutyConfig,
    /// Slack webhook settings, if delivery to Slack is enabled.
    pub slack: Option<SlackConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `COMPOSER_ADDR` | Server bind address | `127.0.0.1:8000` |
    /// | `PAGER_DUTY_TOKEN` | PagerDuty REST API token | (required) |
    /// | `PAGERDUTY_API_URL` | PagerDuty REST API base URL | `https://api.pagerduty.com` |
    /// | `PAGERDUTY_WEB_URL` | PagerDuty web UI base URL | `https://discoveryinc.pagerduty.com` |
    /// | `SLACK_WEBHOOK_URL` | Slack incoming webhook | (Slack disabled) |
    ///
    /// The template source is chosen by
    /// [`notification_core::template_source_from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("COMPOSER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let pagerduty = PagerDutyConfig::from_env()?;
        let slack = SlackConfig::from_env();

        Ok(Self {
            addr,
            pagerduty,
            slack,
        })
    }

    /// Incident and status dashboard links for rendered messages.
    pub fn render_links(&self) -> RenderLinks {
        RenderLinks::for_web_url(&self.pagerduty.web_url)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid COMPOSER_ADDR format")]
    InvalidAddr,

    #[error(transparent)]
    PagerDuty(#[from] PagerDutyError),
}

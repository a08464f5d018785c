//! Slack delivery for incident notifications.
//!
//! This crate posts finished notification text to a Slack incoming webhook
//! as a single Block Kit section, mentioning `@here`.
//!
//! # Example
//!
//! ```no_run
//! use broadcaster::{Broadcaster, SlackConfig};
//!
//! # async fn example() -> Result<(), broadcaster::Error> {
//! let config = SlackConfig::new("https://hooks.slack.com/services/T000/B000/XXXX");
//! let broadcaster = Broadcaster::new(config)?;
//!
//! broadcaster.send_notification("SEV 2 | API errors spiking").await?;
//! # Ok(())
//! # }
//! ```

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Mention appended to every notification.
const MENTION: &str = "@here";

/// Errors that can occur during broadcast operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Slack did not answer in time.
    #[error("Slack request timed out")]
    Timeout,

    /// Slack answered with a non-200 status.
    #[error("Slack API error {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The request could not be sent.
    #[error("Slack request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(err)
        }
    }
}

/// Slack webhook settings.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Incoming webhook URL.
    pub webhook_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SlackConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `SLACK_WEBHOOK_URL`. Returns `None` when unset or empty.
    pub fn from_env() -> Option<Self> {
        env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
    }
}

/// Webhook body: plain fallback text plus one mrkdwn section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackPayload {
    pub text: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: &'static str,
    pub text: BlockText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
}

impl SlackPayload {
    /// Build the payload for a notification, appending the `@here` mention.
    pub fn notification(message: &str) -> Self {
        let text = format!("{}\n\n{}", message, MENTION);
        Self {
            blocks: vec![Block {
                block_type: "section",
                text: BlockText {
                    text_type: "mrkdwn",
                    text: text.clone(),
                },
            }],
            text,
        }
    }
}

/// A broadcaster for posting notifications to Slack.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    http: Client,
    config: SlackConfig,
}

impl Broadcaster {
    /// Create a broadcaster for a webhook.
    pub fn new(config: SlackConfig) -> Result<Self, Error> {
        if config.webhook_url.trim().is_empty() {
            return Err(Error::Config("webhook URL is empty".into()));
        }

        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Post a notification message.
    pub async fn send_notification(&self, message: &str) -> Result<(), Error> {
        let payload = SlackPayload::notification(message);
        info!(chars = message.len(), "Sending Slack notification");

        let response = self
            .http
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Slack rejected notification");
            return Err(Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Get the configuration.
    pub fn config(&self) -> &SlackConfig {
        &self.config
    }
}

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    async fn spawn_webhook(status: StatusCode, delay: Duration) -> (String, Arc<Mutex<Vec<Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route(
                "/hook",
                post(
                    move |State(received): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                        tokio::time::sleep(delay).await;
                        received.lock().unwrap().push(body);
                        (status, "ok")
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}/hook", addr), received)
    }

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(SlackPayload::notification("Line one\nLine two")).unwrap();
        assert_eq!(
            payload,
            json!({
                "text": "Line one\nLine two\n\n@here",
                "blocks": [{
                    "type": "section",
                    "text": {"type": "mrkdwn", "text": "Line one\nLine two\n\n@here"}
                }]
            })
        );
    }

    #[test]
    fn test_empty_webhook_rejected() {
        assert!(matches!(
            Broadcaster::new(SlackConfig::new(" ")),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_send_notification() {
        let (url, received) = spawn_webhook(StatusCode::OK, Duration::ZERO).await;
        let broadcaster = Broadcaster::new(SlackConfig::new(url)).unwrap();

        broadcaster.send_notification("Resolved").await.unwrap();
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["text"], "Resolved\n\n@here");
    }

    #[tokio::test]
    async fn test_non_200_is_rejected() {
        let (url, _) = spawn_webhook(StatusCode::FORBIDDEN, Duration::ZERO).await;
        let broadcaster = Broadcaster::new(SlackConfig::new(url)).unwrap();

        match broadcaster.send_notification("x").await.unwrap_err() {
            Error::Rejected { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "ok");
            }
            e => panic!("Unexpected error type: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_slow_webhook_times_out() {
        let (url, _) = spawn_webhook(StatusCode::OK, Duration::from_secs(2)).await;
        let config = SlackConfig::new(url).with_timeout(Duration::from_millis(100));
        let broadcaster = Broadcaster::new(config).unwrap();

        assert!(matches!(
            broadcaster.send_notification("x").await,
            Err(Error::Timeout)
        ));
    }
}

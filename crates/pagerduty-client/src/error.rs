//! Error types for pagerduty-client.

use notification_core::{DataError, SourceError};
use thiserror::Error;

/// Errors that can occur when talking to the PagerDuty REST API.
#[derive(Debug, Error)]
pub enum PagerDutyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with an unexpected status.
    #[error("PagerDuty API error {status}: {body}")]
    Api { status: u16, body: String },

    /// No incident exists for the given number or ID.
    #[error("Incident {0} not found")]
    NotFound(String),

    /// The incident lacks a field notifications need.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<PagerDutyError> for SourceError {
    fn from(err: PagerDutyError) -> Self {
        match err {
            PagerDutyError::Http(err) => SourceError::Http(err),
            PagerDutyError::Json(err) => SourceError::Json(err),
            PagerDutyError::Api { status, body } => SourceError::Status { status, body },
            PagerDutyError::NotFound(ticket) => SourceError::NotFound(ticket),
            PagerDutyError::Data(err) => SourceError::Data(err),
            PagerDutyError::Config(msg) => SourceError::Malformed(msg),
        }
    }
}

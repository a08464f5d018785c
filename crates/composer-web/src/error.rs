//! Error types for the composer web API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notification_core::RenderError;
use pagerduty_client::PagerDutyError;
use thiserror::Error;

/// Errors that can occur in the composer web API.
#[derive(Debug, Error)]
pub enum WebError {
    /// The message cannot be rendered from this template and data.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// PagerDuty call failed.
    #[error(transparent)]
    PagerDuty(#[from] PagerDutyError),

    /// Slack delivery failed.
    #[error(transparent)]
    Slack(#[from] broadcaster::Error),

    /// No Slack webhook is configured.
    #[error("SLACK_WEBHOOK_URL is not configured")]
    SlackDisabled,

    /// The request is missing required content.
    #[error("{0}")]
    BadRequest(String),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::PagerDuty(PagerDutyError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::PagerDuty(PagerDutyError::Data(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::PagerDuty(_) => StatusCode::BAD_GATEWAY,
            WebError::Slack(broadcaster::Error::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            WebError::Slack(_) => StatusCode::BAD_GATEWAY,
            WebError::SlackDisabled => StatusCode::SERVICE_UNAVAILABLE,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", self);
        } else {
            tracing::warn!(status = %status, "Request rejected: {}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for composer handlers.
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use notification_core::DataError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            WebError::from(RenderError::TemplateNotLoaded).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            WebError::from(PagerDutyError::NotFound("1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(PagerDutyError::Data(DataError::new("priority_name", "is missing")))
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            WebError::from(PagerDutyError::Api {
                status: 500,
                body: String::new()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            WebError::from(broadcaster::Error::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(WebError::SlackDisabled.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_body_is_json() {
        let response = WebError::BadRequest("message is empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

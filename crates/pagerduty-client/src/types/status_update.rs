//! Status update payloads.

use chrono::{DateTime, Utc};
use notification_core::{format_pagerduty_date, parse_utc};
use serde::{Deserialize, Serialize};

use super::incident::Incident;
use super::log::Note;
use crate::config::PagerDutyConfig;

/// Body of `POST /incidents/{id}/status_updates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// Plain-text update.
    pub message: String,
    /// Email subject line.
    pub subject: String,
    /// Email body.
    pub html_message: String,
}

impl StatusUpdateRequest {
    /// Build the request for `incident` with the communication template
    /// body.
    pub fn new(
        config: &PagerDutyConfig,
        incident: &Incident,
        message: &str,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let status = title_case(&incident.status);
        Self {
            message: message.to_string(),
            subject: format!("[PagerDuty Status]: {}: {}", status, incident.title),
            html_message: status_update_html(config, incident, message, updated_by, now),
        }
    }
}

/// Result of a status update, including the copy added as a note.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateOutcome {
    pub status_update: serde_json::Value,
    pub note: Note,
}

/// `"TRIGGERED"` becomes `"Triggered"`.
pub fn title_case(status: &str) -> String {
    let lower = status.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn status_update_html(
    config: &PagerDutyConfig,
    incident: &Incident,
    message: &str,
    updated_by: &str,
    now: DateTime<Utc>,
) -> String {
    let opened = parse_utc(&incident.created_at)
        .map(format_pagerduty_date)
        .unwrap_or_else(|_| incident.created_at.clone());
    let service = incident.service.clone().unwrap_or_default();

    let mut html = String::new();
    html.push_str("<div style=\"font-family: Helvetica; font-size: 14px;\">\n");
    html.push_str("<p style=\"margin-bottom: 3px;\"><b>Update</b></p>\n");
    html.push_str(&format!(
        "<div style=\"white-space: pre-wrap; line-height: 1.5; margin: 20px 0;\">{}</div>\n",
        escape_html(message)
    ));
    html.push_str("<p style=\"margin-bottom: 3px;\"><b>Incident</b></p>\n");
    html.push_str(&format!(
        "<a href=\"{}\">#<span>{} [{}] {}</span></a>\n",
        config.incident_web_url(&incident.id),
        incident.incident_number,
        incident.status.to_uppercase(),
        escape_html(&incident.title)
    ));
    html.push_str("<p style=\"margin-bottom: 3px;\"><b>Opened</b></p>\n");
    html.push_str(&format!("<span>{}</span>\n", opened));
    if !service.id.is_empty() {
        html.push_str("<p style=\"margin-bottom: 3px;\"><b>Impacted Service</b></p>\n");
        html.push_str(&format!(
            "<a href=\"{}\"><span>{}</span></a>\n",
            config.service_web_url(&service.id),
            escape_html(service.summary.as_deref().unwrap_or_default())
        ));
    }
    html.push_str("<p style=\"margin-bottom: 3px;\"><b>Current Status</b></p>\n");
    html.push_str(&format!(
        "<div style=\"color: #d14905;\"><span>{}</span></div>\n",
        title_case(&incident.status)
    ));
    html.push_str(&format!(
        "<p>For more information,&nbsp;<a href=\"{}\">visit the status page.</a></p>\n",
        config.status_page_url(&incident.id)
    ));
    html.push_str(&format!(
        "<hr>\n<p>Updated by <span>{}</span> at {}.</p>\n",
        escape_html(updated_by),
        format_pagerduty_date(now)
    ));
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::incident::Reference;

    fn incident() -> Incident {
        Incident {
            id: "Q1ABC".to_string(),
            incident_number: 2668960,
            title: "SEV2 | Page | API <errors>".to_string(),
            status: "acknowledged".to_string(),
            created_at: "2025-09-12T19:28:02Z".to_string(),
            priority: None,
            escalation_policy: None,
            service: Some(Reference {
                id: "PSVC1".to_string(),
                summary: Some("Streaming API".to_string()),
                name: None,
            }),
            conference_bridge: None,
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("TRIGGERED"), "Triggered");
        assert_eq!(title_case("acknowledged"), "Acknowledged");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_request_subject_and_body() {
        let config = PagerDutyConfig::new("t");
        let now = parse_utc("2025-09-12T20:00:00Z").unwrap();
        let request = StatusUpdateRequest::new(&config, &incident(), "Fixed & verified", "Ada Lovelace", now);

        assert_eq!(request.message, "Fixed & verified");
        assert_eq!(
            request.subject,
            "[PagerDuty Status]: Acknowledged: SEV2 | Page | API <errors>"
        );

        let html = &request.html_message;
        assert!(html.contains(">Fixed &amp; verified</div>"));
        assert!(html.contains(
            "<a href=\"https://discoveryinc.pagerduty.com/incidents/Q1ABC\">#<span>2668960 [ACKNOWLEDGED] SEV2 | Page | API &lt;errors&gt;</span></a>"
        ));
        assert!(html.contains("<span>09/12/2025 03:28pm (America/New_York)</span>"));
        assert!(html.contains("service-directory/PSVC1\"><span>Streaming API</span>"));
        assert!(html.contains("<span>Acknowledged</span>"));
        assert!(html.contains("Updated by <span>Ada Lovelace</span> at 09/12/2025 04:00pm (America/New_York)."));
    }
}

//! Incident facts used as render input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, TimestampError};
use crate::timestamp;

/// Slack channel linked to an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackChannel {
    pub name: Option<String>,
    pub web_link: Option<String>,
}

/// Immutable snapshot of the incident fields a notification needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentFacts {
    /// Raw incident title, usually `<prefix> | <prefix> | <alert>`.
    pub title: String,
    pub incident_number: u64,
    /// Priority display name ending in the severity digit, e.g. `P2`.
    pub priority_name: String,
    /// Escalation policy display name, optionally `<Team> - <rest>`.
    pub escalation_policy_name: String,
    /// Creation time as the ISO-8601 UTC string the incident source reports.
    pub created_at: String,

    /// PagerDuty object ID, used for notes and status updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_channel: Option<SlackChannel>,
}

impl IncidentFacts {
    /// Create facts with only the fields the renderer reads.
    pub fn new(
        title: impl Into<String>,
        incident_number: u64,
        priority_name: impl Into<String>,
        escalation_policy_name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            incident_number,
            priority_name: priority_name.into(),
            escalation_policy_name: escalation_policy_name.into(),
            created_at: created_at.into(),
            incident_id: None,
            status: None,
            slack_channel: None,
        }
    }

    /// Attach the PagerDuty incident ID.
    pub fn with_incident_id(mut self, incident_id: impl Into<String>) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// Severity digit taken from the last character of the priority name.
    pub fn severity(&self) -> Result<u32, DataError> {
        let last = self
            .priority_name
            .trim_end()
            .chars()
            .last()
            .ok_or_else(|| DataError::new("priority_name", "is empty"))?;

        last.to_digit(10).ok_or_else(|| {
            DataError::new(
                "priority_name",
                format!("`{}` does not end in a severity digit", self.priority_name),
            )
        })
    }

    /// Team name: the escalation policy name up to the first `" - "`.
    pub fn team_name(&self) -> &str {
        match self.escalation_policy_name.find(" - ") {
            Some(end) => &self.escalation_policy_name[..end],
            None => &self.escalation_policy_name,
        }
    }

    /// Alert title: the trimmed text after the last `|`, or the whole title.
    pub fn alert_title(&self) -> &str {
        match self.title.rfind('|') {
            Some(pipe) => self.title[pipe + 1..].trim(),
            None => self.title.trim(),
        }
    }

    /// Parsed creation time.
    pub fn created_at_utc(&self) -> Result<DateTime<Utc>, TimestampError> {
        timestamp::parse_utc(&self.created_at)
    }

    /// Check the text fields the renderer cannot work without.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.title.trim().is_empty() {
            return Err(DataError::new("title", "is empty"));
        }
        if self.escalation_policy_name.trim().is_empty() {
            return Err(DataError::new("escalation_policy_name", "is empty"));
        }
        self.severity()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(title: &str, priority: &str, policy: &str) -> IncidentFacts {
        IncidentFacts::new(title, 42, priority, policy, "2025-09-12T19:28:02Z")
    }

    #[test]
    fn test_severity_from_priority_suffix() {
        assert_eq!(facts("t", "P2", "p").severity(), Ok(2));
        assert_eq!(facts("t", "SEV-4", "p").severity(), Ok(4));
    }

    #[test]
    fn test_severity_rejects_empty_priority() {
        let err = facts("t", "", "p").severity().unwrap_err();
        assert_eq!(err.field, "priority_name");
        assert_eq!(err.to_string(), "invalid incident data: `priority_name` is empty");
    }

    #[test]
    fn test_severity_rejects_non_digit_suffix() {
        let err = facts("t", "High", "p").severity().unwrap_err();
        assert_eq!(err.field, "priority_name");
    }

    #[test]
    fn test_team_name_takes_first_segment() {
        assert_eq!(facts("t", "P1", "Platform - On Call").team_name(), "Platform");
        assert_eq!(facts("t", "P1", "Core SRE").team_name(), "Core SRE");
        assert_eq!(facts("t", "P1", "A - B - C").team_name(), "A");
        assert_eq!(facts("t", "P1", "Data-Eng").team_name(), "Data-Eng");
    }

    #[test]
    fn test_alert_title_after_last_pipe() {
        assert_eq!(
            facts("A | B | Disk full on host1", "P1", "p").alert_title(),
            "Disk full on host1"
        );
        assert_eq!(facts("No pipes here", "P1", "p").alert_title(), "No pipes here");
        assert_eq!(facts("  padded  ", "P1", "p").alert_title(), "padded");
        assert_eq!(facts("Brand | Alert", "P1", "p").alert_title(), "Alert");
    }

    #[test]
    fn test_validate_names_offending_field() {
        assert_eq!(facts(" ", "P1", "p").validate().unwrap_err().field, "title");
        assert_eq!(
            facts("t", "P1", "").validate().unwrap_err().field,
            "escalation_policy_name"
        );
        assert!(facts("t", "P1", "p").validate().is_ok());
    }

    #[test]
    fn test_optional_fields_skipped_in_json() {
        let json = serde_json::to_value(facts("t", "P1", "p")).unwrap();
        assert!(json.get("incident_id").is_none());
        assert!(json.get("slack_channel").is_none());

        let parsed: IncidentFacts = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.incident_id, None);
    }
}

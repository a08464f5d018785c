//! Incident types from the PagerDuty REST API.

use notification_core::{DataError, IncidentFacts, SlackChannel};
use serde::{Deserialize, Serialize};

/// A reference to another PagerDuty object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub id: String,

    /// Short human-readable name.
    #[serde(default)]
    pub summary: Option<String>,

    /// Full name, present on priorities.
    #[serde(default)]
    pub name: Option<String>,
}

impl Reference {
    /// `name` when present, else `summary`.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.summary.as_deref())
    }
}

/// Dial-in details attached with `include[]=conference_bridge`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConferenceBridge {
    #[serde(default)]
    pub conference_number: Option<String>,
    #[serde(default)]
    pub conference_url: Option<String>,
}

/// A PagerDuty incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Object ID (e.g., "Q2ABCDEF").
    pub id: String,

    /// Account-wide incident number shown to operators.
    pub incident_number: u64,

    pub title: String,

    /// `triggered`, `acknowledged` or `resolved`.
    #[serde(default)]
    pub status: String,

    /// ISO-8601 creation time in UTC.
    pub created_at: String,

    #[serde(default)]
    pub priority: Option<Reference>,

    #[serde(default)]
    pub escalation_policy: Option<Reference>,

    #[serde(default)]
    pub service: Option<Reference>,

    #[serde(default)]
    pub conference_bridge: Option<ConferenceBridge>,
}

impl Incident {
    /// Convert to render input.
    pub fn to_facts(&self, slack_channel: Option<SlackChannel>) -> Result<IncidentFacts, DataError> {
        let priority_name = self
            .priority
            .as_ref()
            .and_then(Reference::display_name)
            .ok_or_else(|| DataError::new("priority_name", "is missing"))?;
        let escalation_policy_name = self
            .escalation_policy
            .as_ref()
            .and_then(Reference::display_name)
            .ok_or_else(|| DataError::new("escalation_policy_name", "is missing"))?;

        let mut facts = IncidentFacts::new(
            self.title.clone(),
            self.incident_number,
            priority_name,
            escalation_policy_name,
            self.created_at.clone(),
        )
        .with_incident_id(self.id.clone());
        facts.status = Some(self.status.clone()).filter(|status| !status.is_empty());
        facts.slack_channel = slack_channel;
        Ok(facts)
    }
}

/// Response wrapper for single-incident endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentEnvelope {
    pub incident: Incident,
}

/// An incident with the Slack channel found in its log.
#[derive(Debug, Clone)]
pub struct IncidentDetails {
    pub incident: Incident,
    pub slack_channel: Option<SlackChannel>,
}

impl IncidentDetails {
    pub fn to_facts(&self) -> Result<IncidentFacts, DataError> {
        self.incident.to_facts(self.slack_channel.clone())
    }
}

/// A PagerDuty user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// First and last name when known, else the account name.
    pub fn display_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().filter(|s| !s.is_empty());
        let last = self.last_name.as_deref().filter(|s| !s.is_empty());

        match (first, last) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => self.name.clone().filter(|name| !name.is_empty()),
        }
    }
}

/// Response wrapper for `/users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

//! PagerDuty REST API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use notification_core::{FactsSource, IncidentFacts, SlackChannel, SourceError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::PagerDutyConfig;
use crate::error::PagerDutyError;
use crate::types::{
    Incident, IncidentDetails, IncidentEnvelope, LogEntriesPage, LogEntry, NewNote, Note,
    NoteEnvelope, NotesPage, StatusUpdateOutcome, StatusUpdateRequest, UserEnvelope,
};

/// Media type selecting version 2 of the REST API.
const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

/// Name shown on status updates when the token's user cannot be resolved.
const FALLBACK_USER_NAME: &str = "System";

/// Client for the PagerDuty REST API.
#[derive(Clone)]
pub struct PagerDutyClient {
    http: Client,
    config: PagerDutyConfig,
}

impl PagerDutyClient {
    /// Create a client. Fails when the token cannot be sent as a header.
    pub fn new(config: PagerDutyConfig) -> Result<Self, PagerDutyError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V2));

        let mut auth = HeaderValue::from_str(&format!("Token token={}", config.token))
            .map_err(|_| PagerDutyError::Config("token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &PagerDutyConfig {
        &self.config
    }

    /// Fetch an incident by number, with its conference bridge and Slack
    /// channel.
    ///
    /// Slack channel lookup failures are logged and leave the channel empty.
    pub async fn get_incident(&self, ticket_number: &str) -> Result<IncidentDetails, PagerDutyError> {
        debug!(ticket = %ticket_number, "Fetching incident");

        let response = self
            .http
            .get(self.config.incident_url(ticket_number))
            .query(&[("include[]", "conference_bridge")])
            .send()
            .await?;
        let envelope: IncidentEnvelope = read_json(response, ticket_number).await?;
        let incident = envelope.incident;

        let slack_channel = match self.find_slack_channel(&incident.id).await {
            Ok(channel) => channel,
            Err(e) => {
                warn!(incident_id = %incident.id, error = %e, "Slack channel lookup failed");
                None
            }
        };

        info!(
            ticket = %ticket_number,
            incident_id = %incident.id,
            has_slack_channel = slack_channel.is_some(),
            "Fetched incident"
        );
        Ok(IncidentDetails {
            incident,
            slack_channel,
        })
    }

    /// Fetch an incident and convert it to render input.
    pub async fn incident_facts(&self, ticket_number: &str) -> Result<IncidentFacts, PagerDutyError> {
        let details = self.get_incident(ticket_number).await?;
        Ok(details.to_facts()?)
    }

    /// Fetch an incident by object ID, without extra lookups.
    pub async fn get_incident_by_id(&self, incident_id: &str) -> Result<Incident, PagerDutyError> {
        let response = self
            .http
            .get(self.config.incident_url(incident_id))
            .send()
            .await?;
        let envelope: IncidentEnvelope = read_json(response, incident_id).await?;
        Ok(envelope.incident)
    }

    /// Find the Slack channel linked to an incident, scanning its log page by
    /// page.
    pub async fn find_slack_channel(
        &self,
        incident_id: &str,
    ) -> Result<Option<SlackChannel>, PagerDutyError> {
        let mut offset = 0;
        loop {
            let page = self.log_entries_page(incident_id, offset).await?;

            if let Some(entry) = page.log_entries.iter().find(|e| e.is_chat_channel_event()) {
                return Ok(Some(SlackChannel {
                    name: entry.chat_channel_name.clone(),
                    web_link: entry.chat_channel_web_link.clone(),
                }));
            }

            match page.pagination.next_offset(offset, page.log_entries.len()) {
                Some(next) => offset = next,
                None => return Ok(None),
            }
        }
    }

    /// Status update log entries, oldest first.
    pub async fn get_status_updates(&self, incident_id: &str) -> Result<Vec<LogEntry>, PagerDutyError> {
        let mut updates = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.log_entries_page(incident_id, offset).await?;
            let next = page.pagination.next_offset(offset, page.log_entries.len());
            updates.extend(page.log_entries.into_iter().filter(LogEntry::is_status_update));

            match next {
                Some(next) => offset = next,
                None => break,
            }
        }

        updates.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(updates)
    }

    /// Notes on an incident, oldest first.
    pub async fn get_notes(&self, incident_id: &str) -> Result<Vec<Note>, PagerDutyError> {
        let mut notes = Vec::new();
        let mut offset = 0;
        loop {
            let page: NotesPage = self
                .get_page(&self.config.notes_url(incident_id), incident_id, offset)
                .await?;
            let next = page.pagination.next_offset(offset, page.notes.len());
            notes.extend(page.notes);

            match next {
                Some(next) => offset = next,
                None => break,
            }
        }

        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(notes)
    }

    /// Add a note to an incident.
    pub async fn add_note(&self, incident_id: &str, message: &str) -> Result<Note, PagerDutyError> {
        let body = NoteEnvelope {
            note: NewNote {
                content: message.to_string(),
            },
        };

        let response = self
            .http
            .post(self.config.notes_url(incident_id))
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }

        let created: NoteEnvelope<Note> = response.json().await?;
        info!(incident_id = %incident_id, note_id = %created.note.id, "Added note");
        Ok(created.note)
    }

    /// Post a status update, then add the same message as a note.
    pub async fn send_status_update(
        &self,
        incident_id: &str,
        message: &str,
    ) -> Result<StatusUpdateOutcome, PagerDutyError> {
        let incident = self.get_incident_by_id(incident_id).await?;
        let updated_by = self.current_user_name().await;
        let body = StatusUpdateRequest::new(&self.config, &incident, message, &updated_by, Utc::now());

        let response = self
            .http
            .post(self.config.status_updates_url(incident_id))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let status_update: serde_json::Value = response.json().await?;
        info!(incident_id = %incident_id, "Sent status update");

        let note = self.add_note(incident_id, message).await?;
        Ok(StatusUpdateOutcome {
            status_update,
            note,
        })
    }

    /// Display name of the token's user, or `"System"` when unavailable.
    pub async fn current_user_name(&self) -> String {
        let result: Result<UserEnvelope, PagerDutyError> = async {
            let response = self.http.get(self.config.current_user_url()).send().await?;
            read_json(response, "me").await
        }
        .await;

        match result {
            Ok(envelope) => envelope
                .user
                .display_name()
                .unwrap_or_else(|| FALLBACK_USER_NAME.to_string()),
            Err(e) => {
                debug!(error = %e, "Could not resolve current user");
                FALLBACK_USER_NAME.to_string()
            }
        }
    }

    async fn log_entries_page(
        &self,
        incident_id: &str,
        offset: u64,
    ) -> Result<LogEntriesPage, PagerDutyError> {
        self.get_page(&self.config.log_entries_url(incident_id), incident_id, offset)
            .await
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        incident_id: &str,
        offset: u64,
    ) -> Result<T, PagerDutyError> {
        let mut request = self.http.get(url);
        if offset > 0 {
            request = request.query(&[("offset", offset)]);
        }
        let response = request.send().await?;
        read_json(response, incident_id).await
    }
}

#[async_trait]
impl FactsSource for PagerDutyClient {
    async fn fetch_facts(&self, ticket_number: &str) -> Result<IncidentFacts, SourceError> {
        Ok(self.incident_facts(ticket_number).await?)
    }
}

impl std::fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Decode a success response, mapping 404 to `NotFound(what)`.
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, PagerDutyError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(PagerDutyError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        return Err(api_error(response).await);
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

async fn api_error(response: Response) -> PagerDutyError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    PagerDutyError::Api { status, body }
}

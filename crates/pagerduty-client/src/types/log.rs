//! Paged list types: log entries and notes.

use serde::{Deserialize, Serialize};

use super::incident::Reference;

/// Log entry type recorded when a chat channel is linked to an incident.
pub const CHAT_CHANNEL_EVENT: &str = "integration_chat_channel_event_log_entry";

/// Log entry types recorded for status updates.
pub const STATUS_UPDATE_EVENTS: [&str; 2] =
    ["status_update_log_entry", "incident_status_update_log_entry"];

/// Classic pagination fields shared by list responses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub more: bool,
}

impl Pagination {
    /// Offset of the next page, if there is one.
    ///
    /// `requested` is the offset the page was fetched with. An empty page, or
    /// one whose `offset + limit` does not move past `requested`, ends the
    /// listing even when `more` is set.
    pub fn next_offset(&self, requested: u64, page_len: usize) -> Option<u64> {
        let next = self.offset.saturating_add(self.limit);
        (self.more && page_len > 0 && next > requested).then_some(next)
    }
}

/// One entry in an incident's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub entry_type: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub chat_channel_name: Option<String>,

    #[serde(default)]
    pub chat_channel_web_link: Option<String>,
}

impl LogEntry {
    pub fn is_chat_channel_event(&self) -> bool {
        self.entry_type == CHAT_CHANNEL_EVENT
    }

    pub fn is_status_update(&self) -> bool {
        STATUS_UPDATE_EVENTS.contains(&self.entry_type.as_str())
    }
}

/// One page of `/incidents/{id}/log_entries`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntriesPage {
    #[serde(default)]
    pub log_entries: Vec<LogEntry>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// An incident note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub user: Option<Reference>,
}

/// One page of `/incidents/{id}/notes`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesPage {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Request and response wrapper for a single note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEnvelope<T> {
    pub note: T,
}

/// Body of a new note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    pub content: String,
}

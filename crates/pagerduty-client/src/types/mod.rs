//! PagerDuty REST API types.

pub mod incident;
pub mod log;
pub mod status_update;

pub use incident::{
    ConferenceBridge, Incident, IncidentDetails, IncidentEnvelope, Reference, User, UserEnvelope,
};
pub use log::{
    LogEntriesPage, LogEntry, NewNote, Note, NoteEnvelope, NotesPage, Pagination,
    CHAT_CHANNEL_EVENT, STATUS_UPDATE_EVENTS,
};
pub use status_update::{title_case, StatusUpdateOutcome, StatusUpdateRequest};

//! Error types for notification rendering.

use thiserror::Error;

use crate::template::{BulletKey, Section, StatusPrefix};

/// A template that cannot produce a complete message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A bullet the renderer needs has no template.
    #[error("template is missing bullet `{0}`")]
    MissingBullet(BulletKey),

    /// A status prefix label is not defined.
    #[error("template is missing status prefix `{0}`")]
    MissingStatusPrefix(StatusPrefix),

    /// A section does not reference a value the renderer supplies for it.
    #[error("{section} template is missing placeholder `{{{placeholder}}}`")]
    MissingPlaceholder {
        section: Section,
        placeholder: &'static str,
    },

    /// A section references a value the renderer does not supply.
    #[error("{section} template uses unknown placeholder `{{{placeholder}}}`")]
    UnknownPlaceholder { section: Section, placeholder: String },
}

/// Incident facts that are missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid incident data: `{field}` {reason}")]
pub struct DataError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl DataError {
    /// Create a new data error for a field.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors returned by a render call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No template record has been loaded yet.
    #[error("template not loaded")]
    TemplateNotLoaded,

    /// No incident facts are cached for the requested ticket.
    #[error("no incident data cached for ticket {0}")]
    NoIncidentData(String),

    /// The template cannot render this message.
    #[error("configuration error: {0}")]
    Configuration(#[from] TemplateError),

    /// The incident facts cannot render this message.
    #[error(transparent)]
    Data(#[from] DataError),
}

/// A timestamp that could not be converted for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("invalid timestamp `{input}`: {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Errors from template and incident-facts sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a local file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload was not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload parsed but cannot be used.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// No incident exists for the ticket number.
    #[error("Incident {0} not found")]
    NotFound(String),

    /// The incident payload lacks a required field.
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Errors from fetching facts and rendering in one step.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

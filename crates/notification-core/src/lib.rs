//! Core types for composing incident notifications.
//!
//! This crate turns a small set of incident facts into the fixed-layout
//! notification message posted to Slack and PagerDuty. It provides:
//!
//! - [`NotificationTemplate`] - The configurable template record
//! - [`TemplateStore`] - Loads the template once, with a built-in fallback
//! - [`Renderer`] - Renders a message for one update of an incident
//! - [`PlainTextNormalizer`] / [`to_plain_text`] - Turns edited markup back into plain text
//! - [`ComposerSession`] - Caches facts for one incident between re-renders
//! - [`TemplateSource`] / [`FactsSource`] - Traits for template and incident providers
//!
//! # Example
//!
//! ```rust
//! use notification_core::{render, IncidentFacts, NotificationTemplate, RenderRequest};
//!
//! let facts = IncidentFacts::new(
//!     "SEV2 | Page | API errors spiking",
//!     2668960,
//!     "P2",
//!     "Streaming - Tier1",
//!     "2025-09-12T19:28:02Z",
//! );
//! let request = RenderRequest::new(facts, "2668960");
//! let message = render(&NotificationTemplate::builtin(), &request).unwrap();
//!
//! assert!(message.starts_with("SEV 2 | SEV2 | Page | API errors spiking | "));
//! assert!(message.contains("Update 1 | 12-September-2025 | 3:28 PM EDT"));
//! ```

mod error;
mod facts;
mod plain_text;
mod render;
mod session;
mod source;
mod store;
mod template;
mod timestamp;

pub use error::{
    ComposeError, DataError, RenderError, SourceError, TemplateError, TimestampError,
};
pub use facts::{IncidentFacts, SlackChannel};
pub use plain_text::{
    to_plain_text, to_rich_text, BoundaryRule, PlainTextNormalizer, DEFAULT_FOOTER_LABEL,
};
pub use render::{
    plan_bullets, render, Clock, FixedClock, RenderLinks, RenderRequest, Renderer, SystemClock,
    DEFAULT_INCIDENT_BASE_URL, DEFAULT_STATUS_DASHBOARD_URL,
};
pub use session::{ComposerSession, FetchTicket, UpdateOptions};
pub use source::{
    template_source_from_env, DefaultTemplateSource, FactsSource, HttpTemplateSource,
    JsonFileTemplateSource, TemplateSource,
};
pub use store::{fetch_or_default, TemplateOrigin, TemplateStore};
pub use template::{BulletKey, NotificationTemplate, Section, StatusPrefix};
pub use timestamp::{
    format_eastern, format_eastern_or_error, format_pagerduty_date, parse_utc, try_format_eastern,
};

// Re-export async_trait for source implementations
pub use async_trait::async_trait;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! PagerDuty REST API client library.
//!
//! This crate provides the PagerDuty calls the notification composer needs:
//!
//! - Fetching an incident with its conference bridge and linked Slack channel
//! - Converting it into [`notification_core::IncidentFacts`] (via [`FactsSource`](notification_core::FactsSource))
//! - Reading notes and status updates
//! - Adding notes and posting status updates
//!
//! # Example
//!
//! ```no_run
//! use pagerduty_client::{PagerDutyClient, PagerDutyConfig};
//!
//! # async fn example() -> Result<(), pagerduty_client::PagerDutyError> {
//! let client = PagerDutyClient::new(PagerDutyConfig::from_env()?)?;
//!
//! let facts = client.incident_facts("2668960").await?;
//! println!("{} ({})", facts.title, facts.priority_name);
//!
//! if let Some(id) = &facts.incident_id {
//!     client.add_note(id, "Mitigation deployed").await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::PagerDutyClient;
pub use config::{PagerDutyConfig, DEFAULT_API_URL, DEFAULT_WEB_URL};
pub use error::PagerDutyError;
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! US Eastern timestamp formatting.

use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use tracing::warn;

use crate::error::TimestampError;

/// Display format, e.g. `12-September-2025 | 3:28 PM EDT`.
const DISPLAY_FORMAT: &str = "%-d-%B-%Y | %-I:%M %p %Z";

/// PagerDuty communication template format, e.g. `09/12/2025 03:28pm`.
const PAGERDUTY_FORMAT: &str = "%m/%d/%Y %I:%M%p";

/// Parse an ISO-8601 timestamp into UTC.
pub fn parse_utc(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| TimestampError::Parse {
            input: input.to_string(),
            source,
        })
}

/// Format an instant in US Eastern time with the zone abbreviation.
pub fn format_eastern(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&New_York)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Parse and format a UTC timestamp string in US Eastern time.
pub fn try_format_eastern(input: &str) -> Result<String, TimestampError> {
    parse_utc(input).map(format_eastern)
}

/// Like [`try_format_eastern`], but a conversion failure is reported inside
/// the returned text so the message can still be emitted.
pub fn format_eastern_or_error(input: &str) -> String {
    match try_format_eastern(input) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(error = %err, "Timestamp conversion failed");
            format!("Error converting date: {}", err)
        }
    }
}

/// Format an instant the way PagerDuty status update pages show dates.
pub fn format_pagerduty_date(instant: DateTime<Utc>) -> String {
    let local = instant
        .with_timezone(&New_York)
        .format(PAGERDUTY_FORMAT)
        .to_string()
        .to_lowercase();
    format!("{} (America/New_York)", local)
}

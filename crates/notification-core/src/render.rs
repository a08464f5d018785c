//! Notification message renderer.
//!
//! One renderer serves both the fetch-then-render path and the re-render of
//! cached facts, so the two always produce the same text for the same input.
//! The only ambient input is the clock, read for follow-up updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, RenderError};
use crate::facts::IncidentFacts;
use crate::template::{
    self, BulletKey, NotificationTemplate, Section, StatusPrefix, ALERT_TITLE, CREATED_AT,
    INCIDENT_URL, NEW_SEVERITY, SEVERITY, STATUS_DASHBOARD_URL, TEAM_NAME, TITLE,
    UPDATE_NUMBER, UPDATE_PREFIX,
};
use crate::timestamp;

/// Default base URL for incident links; the incident number is appended.
pub const DEFAULT_INCIDENT_BASE_URL: &str = "https://discoveryinc.pagerduty.com/incidents/";

/// Default status dashboard URL.
pub const DEFAULT_STATUS_DASHBOARD_URL: &str =
    "https://discoveryinc.pagerduty.com/status-dashboard";

/// Separator between status prefix labels and the update line.
const PREFIX_SEPARATOR: &str = " | ";

/// Fixed links substituted into the header and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLinks {
    pub incident_base_url: String,
    pub status_dashboard_url: String,
}

impl RenderLinks {
    pub fn new(incident_base_url: impl Into<String>, status_dashboard_url: impl Into<String>) -> Self {
        Self {
            incident_base_url: incident_base_url.into(),
            status_dashboard_url: status_dashboard_url.into(),
        }
    }

    /// Links under a PagerDuty web UI base such as
    /// `https://acme.pagerduty.com`.
    pub fn for_web_url(web_url: &str) -> Self {
        let base = web_url.trim_end_matches('/');
        Self::new(
            format!("{}/incidents/", base),
            format!("{}/status-dashboard", base),
        )
    }

    /// Link to an incident by number.
    pub fn incident_url(&self, incident_number: u64) -> String {
        format!("{}{}", self.incident_base_url, incident_number)
    }
}

impl Default for RenderLinks {
    fn default() -> Self {
        Self::new(DEFAULT_INCIDENT_BASE_URL, DEFAULT_STATUS_DASHBOARD_URL)
    }
}

/// Source of the current time for follow-up updates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Everything one render call needs besides the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub facts: IncidentFacts,
    pub ticket_number: String,
    pub update_number: u32,
    #[serde(default)]
    pub resolve: bool,
    #[serde(default)]
    pub downgrade: bool,
}

impl RenderRequest {
    /// First update for a ticket, with no status flags.
    pub fn new(facts: IncidentFacts, ticket_number: impl Into<String>) -> Self {
        Self {
            facts,
            ticket_number: ticket_number.into(),
            update_number: 1,
            resolve: false,
            downgrade: false,
        }
    }

    pub fn with_update_number(mut self, update_number: u32) -> Self {
        self.update_number = update_number;
        self
    }

    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_downgrade(mut self, downgrade: bool) -> Self {
        self.downgrade = downgrade;
        self
    }
}

/// Bullets for an update, in message order.
///
/// Exactly one of the closing bullets (`no_further_updates`,
/// `further_updates_initial`, `further_updates_followup`) is always last.
pub fn plan_bullets(update_number: u32, resolve: bool, downgrade: bool) -> Vec<BulletKey> {
    let mut bullets = Vec::with_capacity(5);

    if update_number == 1 {
        bullets.push(BulletKey::InitialSroReport);
        bullets.push(BulletKey::TeamEngaged);
    } else {
        bullets.push(BulletKey::TeamHas);
    }

    if downgrade {
        bullets.push(BulletKey::Downgraded);
    }
    if resolve {
        bullets.push(BulletKey::Resolved);
    }

    if resolve || downgrade {
        bullets.push(BulletKey::NoFurtherUpdates);
    } else if update_number == 1 {
        bullets.push(BulletKey::FurtherUpdatesInitial);
    } else {
        bullets.push(BulletKey::FurtherUpdatesFollowup);
    }

    bullets
}

/// Renders notification messages from a template and incident facts.
#[derive(Debug, Clone, Default)]
pub struct Renderer<C = SystemClock> {
    links: RenderLinks,
    clock: C,
}

impl Renderer<SystemClock> {
    /// Renderer with the default links and the wall clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer with custom links and the wall clock.
    pub fn with_links(links: RenderLinks) -> Self {
        Self {
            links,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Renderer<C> {
    /// Renderer with custom links and clock.
    pub fn with_clock(links: RenderLinks, clock: C) -> Self {
        Self { links, clock }
    }

    pub fn links(&self) -> &RenderLinks {
        &self.links
    }

    /// Render the full message text.
    pub fn render(
        &self,
        template: &NotificationTemplate,
        request: &RenderRequest,
    ) -> Result<String, RenderError> {
        let facts = &request.facts;
        facts.validate()?;
        if request.update_number == 0 {
            return Err(DataError::new("update_number", "must be a positive integer").into());
        }

        let severity = facts.severity()?;
        let created_at = if request.update_number == 1 {
            timestamp::format_eastern_or_error(&facts.created_at)
        } else {
            timestamp::format_eastern(self.clock.now())
        };

        let bullets = self.bullets(template, request, severity)?;
        let update_prefix = update_prefix(template, request.resolve, request.downgrade)?;

        let header = template::fill(
            Section::Header,
            &template.header_template,
            &[
                (SEVERITY, &severity.to_string()),
                (TITLE, &facts.title),
                (INCIDENT_URL, &self.links.incident_url(facts.incident_number)),
            ],
        )?;
        let update_line = template::fill(
            Section::UpdateLine,
            &template.update_line_template,
            &[
                (UPDATE_PREFIX, &update_prefix),
                (UPDATE_NUMBER, &request.update_number.to_string()),
                (CREATED_AT, &created_at),
            ],
        )?;
        let footer = template::fill(
            Section::Footer,
            &template.footer_template,
            &[(STATUS_DASHBOARD_URL, &self.links.status_dashboard_url)],
        )?;

        let mut message = String::new();
        message.push_str(&header);
        message.push_str("\n\n");
        message.push_str(&update_line);
        for bullet in &bullets {
            message.push_str("\n- ");
            message.push_str(bullet);
        }
        message.push_str("\n\n");
        message.push_str(&footer);

        debug!(
            ticket = %request.ticket_number,
            update = request.update_number,
            resolve = request.resolve,
            downgrade = request.downgrade,
            "Rendered notification"
        );

        Ok(message.trim().to_string())
    }

    /// Render the bullet lines without the `"- "` marker.
    pub fn bullets(
        &self,
        template: &NotificationTemplate,
        request: &RenderRequest,
        severity: u32,
    ) -> Result<Vec<String>, RenderError> {
        let facts = &request.facts;
        let new_severity = (severity + 1).to_string();

        plan_bullets(request.update_number, request.resolve, request.downgrade)
            .into_iter()
            .map(|key| {
                let value = match key {
                    BulletKey::InitialSroReport => Some((ALERT_TITLE, facts.alert_title())),
                    BulletKey::TeamEngaged | BulletKey::TeamHas => {
                        Some((TEAM_NAME, facts.team_name()))
                    }
                    BulletKey::Downgraded => Some((NEW_SEVERITY, new_severity.as_str())),
                    _ => None,
                };
                let values: Vec<(&'static str, &str)> = value.into_iter().collect();
                template::fill(Section::Bullet(key), template.bullet(key)?, &values)
                    .map_err(RenderError::from)
            })
            .collect()
    }
}

/// Status labels for the update line, with a trailing separator when any.
fn update_prefix(
    template: &NotificationTemplate,
    resolve: bool,
    downgrade: bool,
) -> Result<String, RenderError> {
    let mut labels = Vec::with_capacity(2);
    if resolve {
        labels.push(template.status_prefix(StatusPrefix::Resolved)?);
    }
    if downgrade {
        labels.push(template.status_prefix(StatusPrefix::Downgraded)?);
    }

    if labels.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{}{}", labels.join(PREFIX_SEPARATOR), PREFIX_SEPARATOR))
    }
}

/// Render with the default links and the wall clock.
pub fn render(
    template: &NotificationTemplate,
    request: &RenderRequest,
) -> Result<String, RenderError> {
    Renderer::new().render(template, request)
}

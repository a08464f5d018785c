//! Notification template record and placeholder substitution.
//!
//! A template is a set of string patterns with `{name}` placeholders. The
//! renderer fills each section with a fixed set of values; a section that
//! omits one of its values, or names a value the renderer does not know, is
//! rejected instead of rendering a half-filled message.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

pub(crate) const SEVERITY: &str = "severity";
pub(crate) const TITLE: &str = "title";
pub(crate) const INCIDENT_URL: &str = "incident_url";
pub(crate) const UPDATE_PREFIX: &str = "update_prefix";
pub(crate) const UPDATE_NUMBER: &str = "update_number";
pub(crate) const CREATED_AT: &str = "created_at";
pub(crate) const ALERT_TITLE: &str = "alert_title";
pub(crate) const TEAM_NAME: &str = "team_name";
pub(crate) const NEW_SEVERITY: &str = "new_severity";
pub(crate) const STATUS_DASHBOARD_URL: &str = "status_dashboard_url";

const HEADER_PLACEHOLDERS: &[&str] = &[SEVERITY, TITLE, INCIDENT_URL];
const UPDATE_LINE_PLACEHOLDERS: &[&str] = &[UPDATE_PREFIX, UPDATE_NUMBER, CREATED_AT];
const FOOTER_PLACEHOLDERS: &[&str] = &[STATUS_DASHBOARD_URL];

/// Identifies one bullet line template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BulletKey {
    InitialSroReport,
    TeamEngaged,
    TeamHas,
    Downgraded,
    Resolved,
    NoFurtherUpdates,
    FurtherUpdatesInitial,
    FurtherUpdatesFollowup,
}

impl BulletKey {
    /// Every bullet a complete template defines.
    pub const ALL: [BulletKey; 8] = [
        BulletKey::InitialSroReport,
        BulletKey::TeamEngaged,
        BulletKey::TeamHas,
        BulletKey::Downgraded,
        BulletKey::Resolved,
        BulletKey::NoFurtherUpdates,
        BulletKey::FurtherUpdatesInitial,
        BulletKey::FurtherUpdatesFollowup,
    ];

    /// Key used in the template record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialSroReport => "initial_sro_report",
            Self::TeamEngaged => "team_engaged",
            Self::TeamHas => "team_has",
            Self::Downgraded => "downgraded",
            Self::Resolved => "resolved",
            Self::NoFurtherUpdates => "no_further_updates",
            Self::FurtherUpdatesInitial => "further_updates_initial",
            Self::FurtherUpdatesFollowup => "further_updates_followup",
        }
    }

    /// Placeholders the renderer fills in this bullet.
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            Self::InitialSroReport => &[ALERT_TITLE],
            Self::TeamEngaged | Self::TeamHas => &[TEAM_NAME],
            Self::Downgraded => &[NEW_SEVERITY],
            Self::Resolved
            | Self::NoFurtherUpdates
            | Self::FurtherUpdatesInitial
            | Self::FurtherUpdatesFollowup => &[],
        }
    }
}

impl fmt::Display for BulletKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status label prepended to the update line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusPrefix {
    Resolved,
    Downgraded,
}

impl StatusPrefix {
    pub const ALL: [StatusPrefix; 2] = [StatusPrefix::Resolved, StatusPrefix::Downgraded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Downgraded => "downgraded",
        }
    }
}

impl fmt::Display for StatusPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template section, used to locate configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    UpdateLine,
    Footer,
    Bullet(BulletKey),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::UpdateLine => f.write_str("update line"),
            Self::Footer => f.write_str("footer"),
            Self::Bullet(key) => write!(f, "bullet `{}`", key),
        }
    }
}

/// The notification template record.
///
/// Serialized with the field names the template endpoint has always used,
/// so `update_line_template` travels as `update_template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    /// Header line: `{severity}`, `{title}`, `{incident_url}`.
    pub header_template: String,

    /// Update line: `{update_prefix}`, `{update_number}`, `{created_at}`.
    #[serde(rename = "update_template", alias = "update_line_template")]
    pub update_line_template: String,

    /// Bullet templates keyed by [`BulletKey::as_str`].
    pub bullet_templates: BTreeMap<String, String>,

    /// Footer: `{status_dashboard_url}`.
    pub footer_template: String,

    /// Status labels keyed by [`StatusPrefix::as_str`].
    pub status_prefixes: BTreeMap<String, String>,
}

impl NotificationTemplate {
    /// The built-in record used whenever no other template is available.
    pub fn builtin() -> Self {
        let bullets = [
            (
                BulletKey::InitialSroReport,
                "SRO US received a report stating \"{alert_title}\".",
            ),
            (
                BulletKey::TeamEngaged,
                "The {team_name} team has engaged to investigate the incident.",
            ),
            (BulletKey::TeamHas, "The {team_name} team has"),
            (
                BulletKey::Downgraded,
                "The severity of this incident has been downgraded to a SEV {new_severity}.",
            ),
            (BulletKey::Resolved, "This incident is resolved."),
            (
                BulletKey::NoFurtherUpdates,
                "No further updates will be provided for this incident.",
            ),
            (
                BulletKey::FurtherUpdatesInitial,
                "Further updates will be provided as they become available.",
            ),
            (
                BulletKey::FurtherUpdatesFollowup,
                "Further updates will be provided within 2 hours.",
            ),
        ];

        Self {
            header_template: "SEV {severity} | {title} | {incident_url}".to_string(),
            update_line_template: "{update_prefix}Update {update_number} | {created_at}"
                .to_string(),
            bullet_templates: bullets
                .into_iter()
                .map(|(key, text)| (key.as_str().to_string(), text.to_string()))
                .collect(),
            footer_template: "Status Dashboard - {status_dashboard_url}".to_string(),
            status_prefixes: [
                (StatusPrefix::Resolved, "Resolved"),
                (StatusPrefix::Downgraded, "Downgraded"),
            ]
            .into_iter()
            .map(|(key, label)| (key.as_str().to_string(), label.to_string()))
            .collect(),
        }
    }

    /// Look up a bullet template.
    pub fn bullet(&self, key: BulletKey) -> Result<&str, TemplateError> {
        self.bullet_templates
            .get(key.as_str())
            .map(String::as_str)
            .ok_or(TemplateError::MissingBullet(key))
    }

    /// Look up a status prefix label.
    pub fn status_prefix(&self, prefix: StatusPrefix) -> Result<&str, TemplateError> {
        self.status_prefixes
            .get(prefix.as_str())
            .map(String::as_str)
            .ok_or(TemplateError::MissingStatusPrefix(prefix))
    }

    /// Check that every section can be rendered.
    ///
    /// Returns the first problem found. Extra bullet or prefix keys are
    /// ignored.
    pub fn validate(&self) -> Result<(), TemplateError> {
        check(Section::Header, &self.header_template, HEADER_PLACEHOLDERS)?;
        check(
            Section::UpdateLine,
            &self.update_line_template,
            UPDATE_LINE_PLACEHOLDERS,
        )?;
        check(Section::Footer, &self.footer_template, FOOTER_PLACEHOLDERS)?;

        for key in BulletKey::ALL {
            check(Section::Bullet(key), self.bullet(key)?, key.placeholders())?;
        }
        for prefix in StatusPrefix::ALL {
            self.status_prefix(prefix)?;
        }

        Ok(())
    }
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literal text and `{identifier}` placeholders.
///
/// Braces that do not enclose an identifier are literal text.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                if open > 0 {
                    out.push(Segment::Literal(&rest[..open]));
                }
                out.push(Segment::Placeholder(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                out.push(Segment::Literal(&rest[..=open]));
                rest = after;
            }
        }
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check(section: Section, template: &str, names: &[&'static str]) -> Result<(), TemplateError> {
    let values: Vec<(&'static str, &str)> = names.iter().map(|name| (*name, "")).collect();
    fill(section, template, &values).map(|_| ())
}

/// Substitute every placeholder in `template`.
///
/// Each supplied value must be referenced at least once and every
/// placeholder must have a value. Substituted text is never re-scanned.
pub(crate) fn fill(
    section: Section,
    template: &str,
    values: &[(&'static str, &str)],
) -> Result<String, TemplateError> {
    let mut used = vec![false; values.len()];
    let mut out = String::with_capacity(template.len());

    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let index = values
                    .iter()
                    .position(|(key, _)| *key == name)
                    .ok_or_else(|| TemplateError::UnknownPlaceholder {
                        section,
                        placeholder: name.to_string(),
                    })?;
                used[index] = true;
                out.push_str(values[index].1);
            }
        }
    }

    if let Some(index) = used.iter().position(|seen| !seen) {
        return Err(TemplateError::MissingPlaceholder {
            section,
            placeholder: values[index].0,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_template_is_valid() {
        assert_eq!(NotificationTemplate::builtin().validate(), Ok(()));
    }

    #[test]
    fn test_segments_treat_non_identifiers_as_literal() {
        assert_eq!(
            segments("a {b} {not valid} {}{c}"),
            vec![
                Segment::Literal("a "),
                Segment::Placeholder("b"),
                Segment::Literal(" {"),
                Segment::Literal("not valid} {"),
                Segment::Literal("}"),
                Segment::Placeholder("c"),
            ]
        );
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let out = fill(
            Section::Header,
            "{title} / {title}",
            &[(TITLE, "Disk full")],
        )
        .unwrap();
        assert_eq!(out, "Disk full / Disk full");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill(Section::Header, "[{title}]", &[(TITLE, "{severity}")]).unwrap();
        assert_eq!(out, "[{severity}]");
    }

    #[test]
    fn test_fill_rejects_unknown_placeholder() {
        let err = fill(
            Section::Footer,
            "{status_dashboard_url} {owner}",
            &[(STATUS_DASHBOARD_URL, "x")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                section: Section::Footer,
                placeholder: "owner".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "footer template uses unknown placeholder `{owner}`"
        );
    }

    #[test]
    fn test_fill_rejects_missing_placeholder() {
        let err = fill(
            Section::Bullet(BulletKey::TeamHas),
            "The team has",
            &[(TEAM_NAME, "Core")],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "bullet `team_has` template is missing placeholder `{team_name}`"
        );
    }

    #[test]
    fn test_validate_reports_missing_bullet() {
        let mut template = NotificationTemplate::builtin();
        template.bullet_templates.remove("resolved");
        assert_eq!(
            template.validate(),
            Err(TemplateError::MissingBullet(BulletKey::Resolved))
        );
    }

    #[test]
    fn test_validate_reports_missing_prefix() {
        let mut template = NotificationTemplate::builtin();
        template.status_prefixes.remove("downgraded");
        assert_eq!(
            template.validate(),
            Err(TemplateError::MissingStatusPrefix(StatusPrefix::Downgraded))
        );
    }

    #[test]
    fn test_template_json_uses_update_template_key() {
        let json = serde_json::to_value(NotificationTemplate::builtin()).unwrap();
        assert!(json.get("update_template").is_some());
        assert!(json.get("update_line_template").is_none());

        let parsed: NotificationTemplate = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, NotificationTemplate::builtin());
    }

    #[test]
    fn test_template_json_accepts_update_line_alias() {
        let mut json = serde_json::to_value(NotificationTemplate::builtin()).unwrap();
        let object = json.as_object_mut().unwrap();
        let update = object.remove("update_template").unwrap();
        object.insert("update_line_template".to_string(), update);

        let parsed: NotificationTemplate = serde_json::from_value(json).unwrap();
        assert_eq!(
            parsed.update_line_template,
            "{update_prefix}Update {update_number} | {created_at}"
        );
    }
}

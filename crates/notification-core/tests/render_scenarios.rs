//! End-to-end rendering scenarios for notification-core.
//!
//! Run with:
//!   cargo test -p notification-core --test render_scenarios

use chrono::{DateTime, Utc};
use notification_core::{
    plan_bullets, to_plain_text, to_rich_text, BulletKey, FixedClock, IncidentFacts,
    NotificationTemplate, PlainTextNormalizer, RenderLinks, RenderRequest, Renderer,
};

fn renderer() -> Renderer<FixedClock> {
    let now: DateTime<Utc> = "2025-09-15T13:45:00Z".parse().unwrap();
    Renderer::with_clock(RenderLinks::default(), FixedClock(now))
}

fn streaming_incident(priority: &str) -> IncidentFacts {
    IncidentFacts::new(
        "SEV2 | Page | API errors spiking",
        2668960,
        priority,
        "Streaming - Tier1",
        "2025-09-12T19:28:02Z",
    )
}

fn bullet_lines(message: &str) -> Vec<&str> {
    message
        .lines()
        .filter_map(|line| line.strip_prefix("- "))
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_initial_update() {
        let request = RenderRequest::new(streaming_incident("P2"), "2668960");
        let message = renderer()
            .render(&NotificationTemplate::builtin(), &request)
            .unwrap();

        assert!(message.starts_with(
            "SEV 2 | SEV2 | Page | API errors spiking | https://discoveryinc.pagerduty.com/incidents/2668960\n\n"
        ));
        assert_eq!(
            bullet_lines(&message),
            vec![
                "SRO US received a report stating \"API errors spiking\".",
                "The Streaming team has engaged to investigate the incident.",
                "Further updates will be provided as they become available.",
            ]
        );
    }

    #[test]
    fn test_initial_update_resolved() {
        let request = RenderRequest::new(streaming_incident("P2"), "2668960").with_resolve(true);
        let message = renderer()
            .render(&NotificationTemplate::builtin(), &request)
            .unwrap();

        assert!(message.contains("\n\nResolved | Update 1 | 12-September-2025 | 3:28 PM EDT\n"));
        let bullets = bullet_lines(&message);
        assert_eq!(
            bullets[bullets.len() - 2..],
            [
                "This incident is resolved.",
                "No further updates will be provided for this incident.",
            ]
        );
    }

    #[test]
    fn test_third_update_downgraded() {
        let request = RenderRequest::new(streaming_incident("P3"), "2668960")
            .with_update_number(3)
            .with_downgrade(true);
        let message = renderer()
            .render(&NotificationTemplate::builtin(), &request)
            .unwrap();

        assert!(message.starts_with("SEV 3 | "));
        assert!(message.contains("\n\nDowngraded | Update 3 | 15-September-2025 | 9:45 AM EDT\n"));
        assert_eq!(
            bullet_lines(&message),
            vec![
                "The Streaming team has",
                "The severity of this incident has been downgraded to a SEV 4.",
                "No further updates will be provided for this incident.",
            ]
        );
    }
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;

    #[test]
    fn test_render_is_idempotent() {
        let renderer = renderer();
        let template = NotificationTemplate::builtin();
        for update in [1, 2, 5] {
            let request = RenderRequest::new(streaming_incident("P1"), "2668960")
                .with_update_number(update)
                .with_resolve(update == 5);
            assert_eq!(
                renderer.render(&template, &request).unwrap(),
                renderer.render(&template, &request).unwrap()
            );
        }
    }

    #[test]
    fn test_rich_text_round_trip() {
        let renderer = renderer();
        let template = NotificationTemplate::builtin();
        for (update, resolve, downgrade) in [(1, false, false), (1, true, false), (4, true, true)] {
            let request = RenderRequest::new(streaming_incident("P2"), "2668960")
                .with_update_number(update)
                .with_resolve(resolve)
                .with_downgrade(downgrade);
            let message = renderer.render(&template, &request).unwrap();
            assert_eq!(to_plain_text(&to_rich_text(&message)), message);
        }
    }

    #[test]
    fn test_configured_links_survive_normalization() {
        let links = RenderLinks::for_web_url("https://acme.pagerduty.com");
        let now: DateTime<Utc> = "2025-09-15T13:45:00Z".parse().unwrap();
        let renderer = Renderer::with_clock(links.clone(), FixedClock(now));
        let normalizer = PlainTextNormalizer::for_links(&links).unwrap();

        let mut incident = streaming_incident("P2");
        incident.incident_number = 77;
        let request = RenderRequest::new(incident, "77").with_update_number(2);
        let message = renderer
            .render(&NotificationTemplate::builtin(), &request)
            .unwrap();
        assert!(message.contains("https://acme.pagerduty.com/incidents/77\n\nUpdate 2"));

        let squashed = message.replace("\n\n", " ");
        assert_eq!(normalizer.normalize(&squashed), message);
        assert_eq!(normalizer.normalize(&to_rich_text(&message)), message);
    }

    #[test]
    fn test_downgrade_severity_arithmetic() {
        for severity in 1..=4u32 {
            let request = RenderRequest::new(streaming_incident(&format!("P{}", severity)), "1")
                .with_update_number(2)
                .with_downgrade(true);
            let message = renderer()
                .render(&NotificationTemplate::builtin(), &request)
                .unwrap();
            assert!(message.contains(&format!("downgraded to a SEV {}.", severity + 1)));
        }
    }

    #[test]
    fn test_closing_bullet_is_exclusive() {
        let closing = [
            BulletKey::NoFurtherUpdates,
            BulletKey::FurtherUpdatesInitial,
            BulletKey::FurtherUpdatesFollowup,
        ];
        for update in 1..=3 {
            for resolve in [false, true] {
                for downgrade in [false, true] {
                    let count = plan_bullets(update, resolve, downgrade)
                        .iter()
                        .filter(|key| closing.contains(key))
                        .count();
                    assert_eq!(count, 1);
                }
            }
        }
    }

    #[test]
    fn test_team_and_alert_title_extraction() {
        let mut facts = streaming_incident("P2");
        facts.escalation_policy_name = "Platform - On Call".to_string();
        facts.title = "A | B | Disk full on host1".to_string();
        assert_eq!(facts.team_name(), "Platform");
        assert_eq!(facts.alert_title(), "Disk full on host1");

        facts.escalation_policy_name = "Core SRE".to_string();
        facts.title = "No pipes here".to_string();
        assert_eq!(facts.team_name(), "Core SRE");
        assert_eq!(facts.alert_title(), "No pipes here");
    }
}

// ============================================================================
// Custom templates
// ============================================================================

mod template_tests {
    use super::*;

    #[test]
    fn test_template_from_json_record() {
        let mut record = serde_json::to_value(NotificationTemplate::builtin()).unwrap();
        record["header_template"] = "[SEV{severity}] {title} ({incident_url})".into();
        let template: NotificationTemplate = serde_json::from_value(record).unwrap();
        template.validate().unwrap();

        let request = RenderRequest::new(streaming_incident("P2"), "2668960");
        let message = renderer().render(&template, &request).unwrap();
        assert!(message.starts_with(
            "[SEV2] SEV2 | Page | API errors spiking (https://discoveryinc.pagerduty.com/incidents/2668960)\n\n"
        ));
    }

    #[test]
    fn test_unknown_placeholder_is_reported() {
        let mut template = NotificationTemplate::builtin();
        template.footer_template = "Dashboard {dashboard}".to_string();

        let request = RenderRequest::new(streaming_incident("P2"), "2668960");
        let err = renderer().render(&template, &request).unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: footer template uses unknown placeholder `{dashboard}`"
        );
    }
}

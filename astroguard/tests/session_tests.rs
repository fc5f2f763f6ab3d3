//! Multi-turn sessions and proactive alerts over a shared dataset

mod test_helpers;

use astroguard::alerts::{Alert, ProactiveAlerts};
use astroguard::query::{QueryAction, TimeRange};
use astroguard::session::{AuditLogEntry, MessageRole, QuerySession, WELCOME_MESSAGE};
use astroguard::Dataset;
use astroguard_common::{EventType, Severity};
use test_helpers::{events, fixed_now, seeded_config, seeded_dataset, SecurityEventBuilder};

fn session() -> QuerySession {
    QuerySession::new(
        Dataset::from_events(events::mixed()),
        &seeded_config(0, 1),
    )
}

mod conversation_flow {
    use super::*;

    #[test]
    fn should_narrow_results_across_turns() {
        let mut session = session();

        let first = session
            .submit_at("show failed logins in the last 7 days", fixed_now())
            .events
            .len();
        let second = session.submit_at("filter high risk", fixed_now());

        assert_eq!(first, 2);
        assert_eq!(second.intent.action, QueryAction::Filter);
        assert_eq!(
            second.intent.entities.time_range,
            Some(TimeRange::Last7Days)
        );
        assert_eq!(second.events.len(), 1);
        assert_eq!(second.events[0].severity, Severity::High);
    }

    #[test]
    fn should_start_fresh_after_reset() {
        let mut session = session();
        session.submit_at("show malware", fixed_now());

        session.reset_context();
        let result = session.submit_at("filter high risk", fixed_now()).clone();

        assert_eq!(result.intent.entities.event_type, None);
        assert_eq!(result.events.len(), 3);
        assert_eq!(session.previous_intent(), Some(&result.intent));
    }

    #[test]
    fn should_keep_transcript_in_order() {
        let mut session = session();

        session.submit_at("show vpn", fixed_now());
        session.submit_at("count malware", fixed_now());

        let roles: Vec<_> = session.conversation().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
            ]
        );
        assert_eq!(session.conversation()[0].content, WELCOME_MESSAGE);
        assert_eq!(session.conversation()[3].content, "count malware");
    }

    #[tokio::test]
    async fn should_answer_submitted_question_without_delay() {
        let mut session = QuerySession::new(seeded_dataset(100, 4), &seeded_config(100, 4));

        let total = session.submit("show everything").await.stats.total;

        assert_eq!(total, 100);
        assert_eq!(session.audit_log_len(), 1);
    }

    #[test]
    fn should_record_last_result_when_driven_synchronously() {
        let mut session = session();

        let summary = tokio_test::block_on(session.submit("count vpn")).summary.clone();

        assert_eq!(
            summary,
            "Found 1 security events matching type: vpn connection (1 low severity)."
        );
        assert_eq!(
            session.last_result().map(|r| r.summary.as_str()),
            Some(summary.as_str())
        );
    }
}

mod audit_trail {
    use super::*;

    #[test]
    fn should_export_newest_entry_first() {
        let mut session = session();
        session.submit_at("show vpn", fixed_now());
        session.submit_at("how many failed logins today", fixed_now());

        let json = session.audit_log_json().unwrap();
        let entries: Vec<AuditLogEntry> = serde_json::from_str(&json).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "how many failed logins today");
        assert_eq!(entries[0].intent, QueryAction::Count);
        assert_eq!(entries[0].results_count, 1);
        assert_eq!(entries[0].confidence, 0.9);
        assert_eq!(entries[1].query, "show vpn");
    }

    #[test]
    fn should_use_camel_case_export_fields() {
        let mut session = session();
        session.submit_at("show malware", fixed_now());

        let json: serde_json::Value =
            serde_json::from_str(&session.audit_log_json().unwrap()).unwrap();

        let entry = &json[0];
        assert_eq!(entry["resultsCount"], 2);
        assert_eq!(entry["kqlQuery"], "eventType:(malware_detection)");
        assert_eq!(entry["intent"], "show");
    }
}

mod proactive_alerting {
    use super::*;

    fn brute_force_burst() -> Vec<astroguard_common::SecurityEvent> {
        (1..=6)
            .map(|i| {
                SecurityEventBuilder::new(i, EventType::FailedLogin)
                    .hours_ago(i as i64)
                    .severity(Severity::Medium)
                    .ip("203.0.113.7")
                    .build()
            })
            .collect()
    }

    #[test]
    fn should_raise_brute_force_alert_for_repeated_failures() {
        let alerts = ProactiveAlerts::default().detect(&brute_force_burst());

        assert_eq!(
            alerts,
            vec![Alert::BruteForce {
                ip: "203.0.113.7".to_string(),
                attempts: 6,
            }]
        );
    }

    #[test]
    fn should_stop_reporting_dismissed_brute_force() {
        let mut alerts = ProactiveAlerts::default();

        assert!(alerts.dismiss("brute-force-203.0.113.7"));

        assert!(alerts.detect(&brute_force_burst()).is_empty());
    }

    #[test]
    fn should_cap_high_risk_alerts_on_generated_dataset() {
        let dataset = seeded_dataset(500, 8);

        let high_risk = ProactiveAlerts::default()
            .detect(dataset.events())
            .into_iter()
            .filter(|alert| matches!(alert, Alert::HighRisk { .. }))
            .count();

        assert_eq!(high_risk, 5);
    }

    #[test]
    fn should_backfill_after_dismissing_high_risk_alert() {
        let dataset = seeded_dataset(500, 8);
        let mut alerts = ProactiveAlerts::default();
        let first = alerts.detect(dataset.events())[0].id();

        alerts.dismiss(&first);
        let after: Vec<_> = alerts
            .detect(dataset.events())
            .into_iter()
            .filter(|alert| matches!(alert, Alert::HighRisk { .. }))
            .collect();

        assert_eq!(after.len(), 5);
        assert!(after.iter().all(|alert| alert.id() != first));
    }
}

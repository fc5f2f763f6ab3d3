//! Keyword rule tables for entity extraction and action classification.
//!
//! Every rule is a list of trigger phrases matched as substrings of the
//! lower-cased query. Time range and action rules stop at the first match;
//! event type and severity rules all fire independently.

use std::sync::OnceLock;

use astroguard_common::{EventType, Severity};
use regex::Regex;

use super::{Entities, QueryAction, TimeRange};

#[derive(Debug, Clone, Copy)]
pub struct Rule<T> {
    pub triggers: &'static [&'static str],
    pub effect: T,
}

impl<T> Rule<T> {
    pub fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|trigger| lowered.contains(trigger))
    }
}

pub const TIME_RANGE_RULES: [Rule<TimeRange>; 6] = [
    Rule { triggers: &["yesterday"], effect: TimeRange::Yesterday },
    Rule { triggers: &["today"], effect: TimeRange::Today },
    Rule { triggers: &["last 7 days", "past week"], effect: TimeRange::Last7Days },
    Rule { triggers: &["last 24 hours"], effect: TimeRange::Last24Hours },
    Rule { triggers: &["last 30 days", "past month"], effect: TimeRange::Last30Days },
    Rule { triggers: &["last hour"], effect: TimeRange::LastHour },
];

pub const EVENT_TYPE_RULES: [Rule<&[EventType]>; 10] = [
    Rule { triggers: &["failed login", "login fail"], effect: &[EventType::FailedLogin] },
    Rule { triggers: &["vpn"], effect: &[EventType::VpnConnection] },
    Rule { triggers: &["malware"], effect: &[EventType::MalwareDetection] },
    Rule {
        triggers: &["successful login", "login success"],
        effect: &[EventType::SuccessfulLogin],
    },
    Rule { triggers: &["firewall"], effect: &[EventType::FirewallBlock] },
    Rule {
        triggers: &["ground station", "ground-station"],
        effect: &[EventType::GroundStationAccess],
    },
    Rule { triggers: &["telemetry"], effect: &[EventType::TelemetryDataAccess] },
    Rule {
        triggers: &["command", "control", "c&c"],
        effect: &[EventType::CommandControlAccess],
    },
    Rule {
        triggers: &["satellite", "comm anomaly"],
        effect: &[EventType::SatelliteCommAnomaly],
    },
    Rule {
        triggers: &["mission critical", "mission-critical"],
        effect: &EventType::MISSION_CRITICAL,
    },
];

pub const SEVERITY_RULES: [Rule<Severity>; 3] = [
    Rule { triggers: &["high risk", "critical"], effect: Severity::High },
    Rule { triggers: &["medium"], effect: Severity::Medium },
    Rule { triggers: &["low"], effect: Severity::Low },
];

pub const ACTION_RULES: [Rule<QueryAction>; 4] = [
    Rule { triggers: &["show", "display", "list"], effect: QueryAction::Show },
    Rule { triggers: &["filter", "only"], effect: QueryAction::Filter },
    Rule { triggers: &["count", "how many"], effect: QueryAction::Count },
    Rule { triggers: &["analyze", "summary"], effect: QueryAction::Analyze },
];

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)user(?:name)?\s+["']?(\w+\.?\w*)["']?"#)
            .expect("username pattern is a valid regex")
    })
}

pub fn extract_time_range(lowered: &str) -> Option<TimeRange> {
    TIME_RANGE_RULES
        .iter()
        .find(|rule| rule.matches(lowered))
        .map(|rule| rule.effect)
}

/// Collects the types of every matching rule, dropping repeats so that
/// "mission critical telemetry" lists telemetry once.
pub fn extract_event_types(lowered: &str) -> Option<Vec<EventType>> {
    let mut types = Vec::new();
    for rule in EVENT_TYPE_RULES.iter().filter(|rule| rule.matches(lowered)) {
        for event_type in rule.effect {
            if !types.contains(event_type) {
                types.push(*event_type);
            }
        }
    }
    (!types.is_empty()).then_some(types)
}

pub fn extract_severities(lowered: &str) -> Option<Vec<Severity>> {
    let severities: Vec<Severity> = SEVERITY_RULES
        .iter()
        .filter(|rule| rule.matches(lowered))
        .map(|rule| rule.effect)
        .collect();
    (!severities.is_empty()).then_some(severities)
}

pub fn extract_username(text: &str) -> Option<String> {
    if let Some(captures) = username_pattern().captures(text) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    text.to_lowercase()
        .contains("admin")
        .then(|| "admin".to_string())
}

pub fn classify_action(lowered: &str) -> QueryAction {
    ACTION_RULES
        .iter()
        .find(|rule| rule.matches(lowered))
        .map(|rule| rule.effect)
        .unwrap_or_default()
}

pub fn extract_entities(text: &str) -> Entities {
    let lowered = text.to_lowercase();
    Entities {
        event_type: extract_event_types(&lowered),
        time_range: extract_time_range(&lowered),
        severity: extract_severities(&lowered),
        username: extract_username(text),
        ip: None,
    }
}

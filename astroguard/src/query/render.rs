//! Query-language renderings of an intent.
//!
//! The two renderers share nothing but the trait; a change to one dialect
//! must never leak into the other.

use super::QueryIntent;

pub trait QueryRenderer {
    fn name(&self) -> &'static str;
    fn render(&self, intent: &QueryIntent) -> String;
}

/// Renders the in-house `SEARCH ... AND ...` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DslRenderer;

impl QueryRenderer for DslRenderer {
    fn name(&self) -> &'static str {
        "DSL"
    }

    fn render(&self, intent: &QueryIntent) -> String {
        let entities = &intent.entities;
        let mut parts = vec!["SEARCH".to_string()];

        if let Some(types) = &entities.event_type {
            let quoted: Vec<String> = types.iter().map(|t| format!("\"{}\"", t)).collect();
            parts.push(format!("event_type IN [{}]", quoted.join(", ")));
        }
        if let Some(range) = entities.time_range {
            parts.push(format!("time_range=\"{}\"", range));
        }
        if let Some(severities) = &entities.severity {
            let quoted: Vec<String> = severities.iter().map(|s| format!("\"{}\"", s)).collect();
            parts.push(format!("severity IN [{}]", quoted.join(", ")));
        }
        if let Some(username) = &entities.username {
            parts.push(format!("username=\"{}\"", username));
        }

        parts.join(" AND ")
    }
}

/// Renders a Kibana-style query string; `*` when nothing was extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct KqlRenderer;

impl QueryRenderer for KqlRenderer {
    fn name(&self) -> &'static str {
        "KQL"
    }

    fn render(&self, intent: &QueryIntent) -> String {
        let entities = &intent.entities;
        let mut parts = Vec::new();

        if let Some(types) = &entities.event_type {
            let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
            parts.push(format!("eventType:({})", names.join(" OR ")));
        }
        if let Some(range) = entities.time_range {
            parts.push(format!("@timestamp:{}", range));
        }
        if let Some(severities) = &entities.severity {
            let names: Vec<&str> = severities.iter().map(|s| s.as_str()).collect();
            parts.push(format!("severity:({})", names.join(" OR ")));
        }
        if let Some(username) = &entities.username {
            parts.push(format!("username:\"{}\"", username));
        }

        if parts.is_empty() {
            "*".to_string()
        } else {
            parts.join(" AND ")
        }
    }
}

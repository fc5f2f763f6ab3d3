//! Human-readable summary sentence and severity counts for a query result.

use super::{QueryIntent, QueryStats};

/// Replaces only the first underscore, so `last_24_hours` reads
/// `last 24_hours`.
pub fn humanize_tag(tag: &str) -> String {
    tag.replacen('_', " ", 1)
}

/// One-sentence description of a query result.
pub fn summarize(intent: &QueryIntent, stats: &QueryStats) -> String {
    let mut parts = vec![format!("Found {} security events", stats.total)];

    if let Some(types) = &intent.entities.event_type {
        let names: Vec<String> = types.iter().map(|t| humanize_tag(t.as_str())).collect();
        parts.push(format!("matching type: {}", names.join(", ")));
    }

    if let Some(range) = intent.entities.time_range {
        parts.push(format!("from {}", humanize_tag(range.as_str())));
    }

    let mut severity_parts = Vec::new();
    if stats.high_severity > 0 {
        severity_parts.push(format!("{} high", stats.high_severity));
    }
    if stats.medium_severity > 0 {
        severity_parts.push(format!("{} medium", stats.medium_severity));
    }
    if stats.low_severity > 0 {
        severity_parts.push(format!("{} low", stats.low_severity));
    }
    if !severity_parts.is_empty() {
        parts.push(format!("({} severity)", severity_parts.join(", ")));
    }

    format!("{}.", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Entities, QueryAction, TimeRange};
    use astroguard_common::EventType;

    fn intent(entities: Entities) -> QueryIntent {
        QueryIntent {
            action: QueryAction::Show,
            confidence: entities.confidence(),
            entities,
        }
    }

    #[test]
    fn should_summarize_count_only_for_empty_result() {
        let summary = summarize(&intent(Entities::default()), &QueryStats::default());

        assert_eq!(summary, "Found 0 security events.");
    }

    #[test]
    fn should_include_types_range_and_non_zero_buckets() {
        let entities = Entities {
            event_type: Some(vec![EventType::FailedLogin, EventType::GroundStationAccess]),
            time_range: Some(TimeRange::Last7Days),
            ..Default::default()
        };
        let stats = QueryStats {
            total: 5,
            high_severity: 2,
            medium_severity: 0,
            low_severity: 3,
        };

        assert_eq!(
            summarize(&intent(entities), &stats),
            "Found 5 security events matching type: failed login, ground station_access \
             from last 7_days (2 high, 3 low severity)."
        );
    }

    #[test]
    fn should_replace_only_first_underscore() {
        assert_eq!(humanize_tag("last_24_hours"), "last 24_hours");
        assert_eq!(humanize_tag("today"), "today");
    }
}

//! Natural-language query processing.
//!
//! A query is turned into a [`QueryIntent`] by keyword rule tables
//! ([`extract`]), rendered as two query-language strings ([`render`]), applied
//! to the dataset as a chain of filters ([`filter`]) and described in one
//! sentence ([`summary`]). Processing never fails: nonsense input yields the
//! full dataset with the base confidence.

pub mod extract;
pub mod filter;
pub mod render;
pub mod summary;

use std::fmt;

use astroguard_common::{EventType, SecurityEvent, Severity};
use chrono::{DateTime, Local, TimeZone};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use render::{DslRenderer, KqlRenderer, QueryRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryAction {
    Filter,
    #[default]
    Show,
    Count,
    Analyze,
}

impl QueryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryAction::Filter => "filter",
            QueryAction::Show => "show",
            QueryAction::Count => "count",
            QueryAction::Analyze => "analyze",
        }
    }
}

impl fmt::Display for QueryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_24_hours")]
    Last24Hours,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_hour")]
    LastHour,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Yesterday => "yesterday",
            TimeRange::Today => "today",
            TimeRange::Last7Days => "last_7_days",
            TimeRange::Last24Hours => "last_24_hours",
            TimeRange::Last30Days => "last_30_days",
            TimeRange::LastHour => "last_hour",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities extracted from a query. `None` means the entity was not
/// mentioned and its filter is skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Vec<EventType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Vec<Severity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Never extracted from text; set only on intents built by callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.event_type.is_none()
            && self.time_range.is_none()
            && self.severity.is_none()
            && self.username.is_none()
            && self.ip.is_none()
    }

    /// Additive confidence in tenths: 5 base, +2 type, +2 time range, +1 each
    /// for severity, username and ip, capped at 10.
    pub fn confidence(&self) -> f64 {
        let mut tenths = 5u8;
        if self.event_type.is_some() {
            tenths += 2;
        }
        if self.time_range.is_some() {
            tenths += 2;
        }
        if self.severity.is_some() {
            tenths += 1;
        }
        if self.username.is_some() {
            tenths += 1;
        }
        if self.ip.is_some() {
            tenths += 1;
        }
        f64::from(tenths.min(10)) / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub action: QueryAction,
    pub entities: Entities,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    pub total: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
}

impl QueryStats {
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a SecurityEvent>,
    {
        events.into_iter().fold(Self::default(), |mut stats, event| {
            stats.total += 1;
            match event.severity {
                Severity::High => stats.high_severity += 1,
                Severity::Medium => stats.medium_severity += 1,
                Severity::Low => stats.low_severity += 1,
            }
            stats
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub intent: QueryIntent,
    pub dsl_query: String,
    pub kql_query: String,
    pub summary: String,
    pub events: Vec<SecurityEvent>,
    pub stats: QueryStats,
}

/// Turns free text into a filtered, summarised result.
#[derive(Debug, Clone)]
pub struct QueryProcessor {
    carry_over_context: bool,
    dsl: DslRenderer,
    kql: KqlRenderer,
}

impl QueryProcessor {
    pub fn new() -> Self {
        Self {
            carry_over_context: true,
            dsl: DslRenderer,
            kql: KqlRenderer,
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self {
            carry_over_context: config.carry_over_context(),
            ..Self::new()
        }
    }

    /// Process a query against the local wall clock.
    pub fn process(
        &self,
        text: &str,
        events: &[SecurityEvent],
        previous: Option<&QueryIntent>,
    ) -> QueryResult {
        self.process_at(text, events, previous, Local::now())
    }

    /// Process a query with an injected "now"; calendar windows such as
    /// `today` are computed in `now`'s time zone.
    pub fn process_at<Tz: TimeZone>(
        &self,
        text: &str,
        events: &[SecurityEvent],
        previous: Option<&QueryIntent>,
        now: DateTime<Tz>,
    ) -> QueryResult {
        let intent = self.parse(text, previous);
        debug!(
            "Parsed '{}' as {} with entities {:?}",
            text, intent.action, intent.entities
        );

        let dsl_query = self.dsl.render(&intent);
        let kql_query = self.kql.render(&intent);

        let matched = filter::filter_events(events, &intent.entities, &now);
        debug!("{} of {} events matched", matched.len(), events.len());

        let stats = QueryStats::from_events(matched.iter());
        let summary = summary::summarize(&intent, &stats);

        QueryResult {
            intent,
            dsl_query,
            kql_query,
            summary,
            events: matched,
            stats,
        }
    }

    /// Build the intent for `text`, carrying over the previous event types and
    /// time range for bare follow-up filters.
    pub fn parse(&self, text: &str, previous: Option<&QueryIntent>) -> QueryIntent {
        let lowered = text.to_lowercase();
        let mut entities = extract::extract_entities(text);

        if let Some(previous) = previous {
            if self.carry_over_context
                && lowered.contains("filter")
                && entities.event_type.is_none()
                && entities.time_range.is_none()
            {
                if previous.entities.event_type.is_some() {
                    entities.event_type = previous.entities.event_type.clone();
                }
                if previous.entities.time_range.is_some() {
                    entities.time_range = previous.entities.time_range;
                }
            }
        }

        let confidence = entities.confidence();
        QueryIntent {
            action: extract::classify_action(&lowered),
            entities,
            confidence,
        }
    }
}

impl Default for QueryProcessor {
    fn default() -> Self {
        Self::new()
    }
}

//! Aggregations behind the dashboard and reports.

use std::collections::{BTreeMap, HashMap};

use astroguard_common::{EventType, SecurityEvent, Severity};
use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::Serialize;

use crate::query::QueryStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskBucket {
    pub label: &'static str,
    pub min: u8,
    pub max: u8,
    pub count: usize,
}

pub const RISK_BUCKETS: [(&str, u8, u8); 4] = [
    ("0-25", 0, 25),
    ("26-50", 26, 50),
    ("51-75", 51, 75),
    ("76-100", 76, 100),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TimelinePoint {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            high: 0,
            medium: 0,
            low: 0,
        }
    }

    fn record(&mut self, severity: Severity) {
        self.total += 1;
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRisk {
    pub username: String,
    pub avg_risk: u32,
    pub events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_events: usize,
    pub high_risk_events: usize,
    pub active_threats: usize,
    pub mission_critical_events: usize,
    pub foreign_access: usize,
    pub average_risk: Option<f64>,
}

impl DashboardMetrics {
    pub fn from_events(events: &[SecurityEvent]) -> Self {
        Self {
            total_events: events.len(),
            high_risk_events: events
                .iter()
                .filter(|e| e.severity == Severity::High)
                .count(),
            active_threats: events.iter().filter(|e| is_active_threat(e)).count(),
            mission_critical_events: events.iter().filter(|e| e.is_mission_critical).count(),
            foreign_access: events.iter().filter(|e| !e.is_domestic()).count(),
            average_risk: average_risk(events),
        }
    }
}

/// Malware, or a failed login that was rated high severity.
pub fn is_active_threat(event: &SecurityEvent) -> bool {
    event.event_type == EventType::MalwareDetection
        || (event.event_type == EventType::FailedLogin && event.severity == Severity::High)
}

/// `None` for an empty slice.
pub fn average_risk(events: &[SecurityEvent]) -> Option<f64> {
    if events.is_empty() {
        return None;
    }
    let total: u64 = events.iter().map(|e| u64::from(e.risk_score)).sum();
    Some(total as f64 / events.len() as f64)
}

pub fn severity_distribution(events: &[SecurityEvent]) -> QueryStats {
    QueryStats::from_events(events)
}

/// Event counts per type, largest first; ties ordered by tag.
pub fn event_type_distribution(events: &[SecurityEvent]) -> Vec<(EventType, usize)> {
    let mut counts: HashMap<EventType, usize> = HashMap::new();
    for event in events {
        *counts.entry(event.event_type).or_insert(0) += 1;
    }

    let mut distribution: Vec<_> = counts.into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    distribution
}

/// Risk score histogram; empty buckets are omitted.
pub fn risk_distribution(events: &[SecurityEvent]) -> Vec<RiskBucket> {
    RISK_BUCKETS
        .iter()
        .map(|&(label, min, max)| RiskBucket {
            label,
            min,
            max,
            count: events
                .iter()
                .filter(|e| (min..=max).contains(&e.risk_score))
                .count(),
        })
        .filter(|bucket| bucket.count > 0)
        .collect()
}

/// Per-day counts for every calendar day that has events, oldest first.
pub fn daily_timeline<Tz: TimeZone>(events: &[SecurityEvent], tz: &Tz) -> Vec<TimelinePoint> {
    let mut days: BTreeMap<NaiveDate, TimelinePoint> = BTreeMap::new();
    for event in events {
        let date = event.timestamp.with_timezone(tz).date_naive();
        days.entry(date)
            .or_insert_with(|| TimelinePoint::empty(date))
            .record(event.severity);
    }
    days.into_values().collect()
}

/// Per-day counts for the `days` calendar days ending with `now`'s date,
/// including days without events.
pub fn recent_timeline<Tz: TimeZone>(
    events: &[SecurityEvent],
    now: &DateTime<Tz>,
    days: u32,
) -> Vec<TimelinePoint> {
    let today = now.date_naive();
    let tz = now.timezone();
    let mut points: Vec<TimelinePoint> = (0..i64::from(days))
        .rev()
        .map(|back| TimelinePoint::empty(today - Duration::days(back)))
        .collect();

    for event in events {
        let date = event.timestamp.with_timezone(&tz).date_naive();
        if let Some(point) = points.iter_mut().find(|p| p.date == date) {
            point.record(event.severity);
        }
    }
    points
}

/// Users with the highest rounded average risk score.
pub fn top_risky_users(events: &[SecurityEvent], limit: usize) -> Vec<UserRisk> {
    let mut totals: HashMap<&str, (u64, usize)> = HashMap::new();
    for event in events {
        let entry = totals.entry(event.username.as_str()).or_insert((0, 0));
        entry.0 += u64::from(event.risk_score);
        entry.1 += 1;
    }

    let mut users: Vec<UserRisk> = totals
        .into_iter()
        .map(|(username, (total, count))| UserRisk {
            username: username.to_string(),
            avg_risk: (total as f64 / count as f64).round() as u32,
            events: count,
        })
        .collect();
    users.sort_by(|a, b| {
        b.avg_risk
            .cmp(&a.avg_risk)
            .then_with(|| a.username.cmp(&b.username))
    });
    users.truncate(limit);
    users
}

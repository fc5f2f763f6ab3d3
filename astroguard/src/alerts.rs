//! Proactive alerting over the event dataset.
//!
//! Detectors are independent; `ProactiveAlerts` runs all of them and hides
//! alerts the operator has dismissed.

use std::collections::{HashMap, HashSet};

use astroguard_common::{EventType, SecurityEvent, Severity};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::configuration::Configuration;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    HighRisk {
        event_id: String,
        event_type: EventType,
        risk_score: u8,
        ip: String,
        username: String,
        timestamp: DateTime<Utc>,
        details: String,
    },
    BruteForce {
        ip: String,
        attempts: usize,
    },
}

impl Alert {
    /// Identifier used for dismissal: the event id, or `brute-force-<ip>`.
    pub fn id(&self) -> String {
        match self {
            Alert::HighRisk { event_id, .. } => event_id.clone(),
            Alert::BruteForce { ip, .. } => format!("brute-force-{}", ip),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Alert::HighRisk { event_type, .. } => {
                event_type.as_str().replacen('_', " ", 1).to_uppercase()
            }
            Alert::BruteForce { .. } => "ANOMALY DETECTED".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Alert::HighRisk {
                risk_score,
                ip,
                username,
                timestamp,
                details,
                ..
            } => format!(
                "Risk {} | {} | {} | {} | {}",
                risk_score,
                ip,
                username,
                timestamp.format("%H:%M:%S"),
                details
            ),
            Alert::BruteForce { ip, attempts } => format!(
                "Multiple failed login attempts from {}: {} failed attempts detected - possible brute force attack",
                ip, attempts
            ),
        }
    }
}

pub trait AlertDetector {
    fn name(&self) -> &'static str;
    fn detect(&self, events: &[SecurityEvent], dismissed: &HashSet<String>) -> Vec<Alert>;
}

/// Flags high-severity events and events at or above the risk threshold,
/// capped at `max_alerts` in dataset order after dismissals are removed.
#[derive(Debug, Clone)]
pub struct HighRiskDetector {
    pub risk_score_threshold: u8,
    pub max_alerts: usize,
}

impl AlertDetector for HighRiskDetector {
    fn name(&self) -> &'static str {
        "high-risk"
    }

    fn detect(&self, events: &[SecurityEvent], dismissed: &HashSet<String>) -> Vec<Alert> {
        events
            .iter()
            .filter(|e| e.severity == Severity::High || e.risk_score >= self.risk_score_threshold)
            .filter(|e| !dismissed.contains(&e.id))
            .take(self.max_alerts)
            .map(|e| Alert::HighRisk {
                event_id: e.id.clone(),
                event_type: e.event_type,
                risk_score: e.risk_score,
                ip: e.ip.clone(),
                username: e.username.clone(),
                timestamp: e.timestamp,
                details: e.details.clone(),
            })
            .collect()
    }
}

/// Flags source IPs with at least `threshold` failed logins, in order of
/// first appearance.
#[derive(Debug, Clone)]
pub struct BruteForceDetector {
    pub threshold: usize,
}

impl AlertDetector for BruteForceDetector {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn detect(&self, events: &[SecurityEvent], dismissed: &HashSet<String>) -> Vec<Alert> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for event in events.iter().filter(|e| e.event_type == EventType::FailedLogin) {
            let count = counts.entry(event.ip.as_str()).or_insert(0);
            if *count == 0 {
                order.push(event.ip.as_str());
            }
            *count += 1;
        }

        order
            .into_iter()
            .filter_map(|ip| {
                let attempts = counts.get(ip).copied().unwrap_or(0);
                (attempts >= self.threshold).then(|| Alert::BruteForce {
                    ip: ip.to_string(),
                    attempts,
                })
            })
            .filter(|alert| !dismissed.contains(&alert.id()))
            .collect()
    }
}

pub struct ProactiveAlerts {
    detectors: Vec<Box<dyn AlertDetector>>,
    dismissed: HashSet<String>,
}

impl ProactiveAlerts {
    pub fn new(detectors: Vec<Box<dyn AlertDetector>>) -> Self {
        Self {
            detectors,
            dismissed: HashSet::new(),
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(vec![
            Box::new(HighRiskDetector {
                risk_score_threshold: config.alerts.risk_score_threshold,
                max_alerts: config.alerts.max_high_risk_alerts,
            }),
            Box::new(BruteForceDetector {
                threshold: config.alerts.brute_force_threshold,
            }),
        ])
    }

    pub fn detect(&self, events: &[SecurityEvent]) -> Vec<Alert> {
        self.detectors
            .iter()
            .flat_map(|detector| {
                let alerts = detector.detect(events, &self.dismissed);
                debug!("{} detector raised {} alerts", detector.name(), alerts.len());
                alerts
            })
            .collect()
    }

    /// Returns `false` if the alert was already dismissed.
    pub fn dismiss(&mut self, alert_id: &str) -> bool {
        self.dismissed.insert(alert_id.to_string())
    }

    pub fn is_dismissed(&self, alert_id: &str) -> bool {
        self.dismissed.contains(alert_id)
    }
}

impl Default for ProactiveAlerts {
    fn default() -> Self {
        Self::new(vec![
            Box::new(HighRiskDetector {
                risk_score_threshold: 80,
                max_alerts: 5,
            }),
            Box::new(BruteForceDetector { threshold: 5 }),
        ])
    }
}

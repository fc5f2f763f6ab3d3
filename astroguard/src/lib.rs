use astroguard_common::SecurityEvent;

pub mod alerts;
pub mod analytics;
pub mod cli;
pub mod configuration;
pub mod errors;
pub mod generator;
pub mod output_strategy;
pub mod query;
pub mod report;
pub mod session;

pub use alerts::{Alert, ProactiveAlerts};
pub use configuration::Configuration;
pub use errors::{AstroGuardError, Result};
pub use generator::{Dataset, EventGenerator};
pub use query::{QueryIntent, QueryProcessor, QueryResult};
pub use report::{ReportGenerator, ReportKind, SecurityReport};
pub use session::QuerySession;

const DETAILS_WIDTH: usize = 40;

/// Fixed-width table rows for terminal output.
pub struct EventFormatter {
    verbose: bool,
}

impl EventFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn header(&self) -> String {
        if self.verbose {
            format!(
                "{:<10} {:<19} {:<22} {:<6} {:<4} {:<14} {:<15} {:<24} {:<10} {}",
                "ID",
                "TIMESTAMP",
                "EVENT_TYPE",
                "SEV",
                "RISK",
                "USER",
                "IP",
                "LOCATION",
                "MITRE",
                "DETAILS"
            )
        } else {
            format!(
                "{:<10} {:<19} {:<22} {:<6} {:<4} {:<14} {:<15} {}",
                "ID", "TIMESTAMP", "EVENT_TYPE", "SEV", "RISK", "USER", "IP", "DETAILS"
            )
        }
    }

    pub fn separator(&self) -> String {
        if self.verbose {
            "-".repeat(160)
        } else {
            "-".repeat(137)
        }
    }

    pub fn format_event(&self, event: &SecurityEvent) -> String {
        let timestamp = event.timestamp.format("%Y-%m-%d %H:%M:%S");

        if self.verbose {
            format!(
                "{:<10} {:<19} {:<22} {:<6} {:<4} {:<14} {:<15} {:<24} {:<10} {}",
                event.id,
                timestamp,
                event.event_type,
                event.severity,
                event.risk_score,
                event.username,
                event.ip,
                event.location,
                event.mitre_attack.as_deref().unwrap_or("-"),
                event.details
            )
        } else {
            format!(
                "{:<10} {:<19} {:<22} {:<6} {:<4} {:<14} {:<15} {}",
                event.id,
                timestamp,
                event.event_type,
                event.severity,
                event.risk_score,
                event.username,
                event.ip,
                truncate(&event.details, DETAILS_WIDTH)
            )
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

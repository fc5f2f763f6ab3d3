use crate::analytics;
use crate::configuration::OutputFormat;
use crate::errors::AstroGuardError;
use crate::EventFormatter;
use anyhow::Result;
use astroguard_common::{SecurityEvent, Severity};
use chrono::SecondsFormat;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: &str = "ID,Timestamp,Event Type,Severity,IP,Username,Location,Details,Risk Score";

pub trait OutputStrategy {
    fn format_event(&self, event: &SecurityEvent) -> String;
    fn format_header(&self) -> String;
    fn format_summary(&self, events: &[SecurityEvent]) -> String;

    /// Full document: header, one line per event, then the summary.
    fn render(&self, events: &[SecurityEvent]) -> String {
        let mut output = String::new();

        let header = self.format_header();
        if !header.is_empty() {
            output.push_str(&header);
            output.push('\n');
        }

        for event in events {
            output.push_str(&self.format_event(event));
            output.push('\n');
        }

        output.push_str(&self.format_summary(events));
        output
    }

    fn save_to_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = File::create(path).map_err(|e| AstroGuardError::ExportError {
            message: format!("cannot create {}: {}", path.display(), e),
        })?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Pretty-printed JSON array of events.
pub struct JsonOutputStrategy;

impl OutputStrategy for JsonOutputStrategy {
    fn format_event(&self, event: &SecurityEvent) -> String {
        serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_header(&self) -> String {
        "".to_string() // JSON doesn't need headers
    }

    fn format_summary(&self, _events: &[SecurityEvent]) -> String {
        "".to_string()
    }

    fn render(&self, events: &[SecurityEvent]) -> String {
        serde_json::to_string_pretty(events).unwrap_or_else(|_| "[]".to_string())
    }
}

pub struct CsvOutputStrategy {
    include_header: bool,
}

impl CsvOutputStrategy {
    pub fn new(include_header: bool) -> Self {
        Self { include_header }
    }
}

impl Default for CsvOutputStrategy {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OutputStrategy for CsvOutputStrategy {
    fn format_event(&self, event: &SecurityEvent) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            escape_csv(&event.id),
            event
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            event.event_type,
            event.severity,
            escape_csv(&event.ip),
            escape_csv(&event.username),
            escape_csv(&event.location),
            escape_csv(&event.details),
            event.risk_score
        )
    }

    fn format_header(&self) -> String {
        if self.include_header {
            CSV_HEADER.to_string()
        } else {
            "".to_string()
        }
    }

    fn format_summary(&self, _events: &[SecurityEvent]) -> String {
        "".to_string()
    }
}

pub struct PlainTextOutputStrategy {
    formatter: EventFormatter,
    include_header: bool,
}

impl PlainTextOutputStrategy {
    pub fn new(verbose: bool, include_header: bool) -> Self {
        Self {
            formatter: EventFormatter::new(verbose),
            include_header,
        }
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "🔴",
        Severity::Medium => "🟡",
        Severity::Low => "🟢",
    }
}

impl OutputStrategy for PlainTextOutputStrategy {
    fn format_event(&self, event: &SecurityEvent) -> String {
        self.formatter.format_event(event)
    }

    fn format_header(&self) -> String {
        if self.include_header {
            format!("{}\n{}", self.formatter.header(), self.formatter.separator())
        } else {
            "".to_string()
        }
    }

    fn format_summary(&self, events: &[SecurityEvent]) -> String {
        let stats = analytics::severity_distribution(events);
        let mut summary = String::new();
        let _ = writeln!(&mut summary, "\n📊 Security Event Summary");
        let _ = writeln!(&mut summary, "=========================");
        let _ = writeln!(&mut summary, "Total Events: {}", stats.total);

        let _ = writeln!(&mut summary, "\n🚨 Severity Breakdown:");
        for (severity, count) in [
            (Severity::High, stats.high_severity),
            (Severity::Medium, stats.medium_severity),
            (Severity::Low, stats.low_severity),
        ] {
            let _ = writeln!(
                &mut summary,
                "  {} {}: {}",
                severity_icon(severity),
                severity.as_str().to_uppercase(),
                count
            );
        }

        let distribution = analytics::event_type_distribution(events);
        if !distribution.is_empty() {
            let _ = writeln!(&mut summary, "\n📋 Event Types:");
            for (event_type, count) in &distribution {
                let _ = writeln!(&mut summary, "  {}: {}", event_type, count);
            }
        }

        let high_risk: Vec<_> = events
            .iter()
            .filter(|e| e.severity == Severity::High)
            .collect();
        if !high_risk.is_empty() {
            let _ = writeln!(&mut summary, "\n⚠️  High Risk Events:");
            for event in high_risk.iter().take(5) {
                let _ = writeln!(
                    &mut summary,
                    "  • {} - {} (Risk: {})",
                    event.event_type.title(),
                    event.details,
                    event.risk_score
                );
            }
            if high_risk.len() > 5 {
                let _ = writeln!(
                    &mut summary,
                    "  ... and {} more high-risk events",
                    high_risk.len() - 5
                );
            }
        }

        summary
    }
}

/// Quotes a field when it contains a separator, quote or line break.
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Strategy matching a configured output format.
pub fn strategy_for(format: OutputFormat, verbose: bool, no_header: bool) -> Box<dyn OutputStrategy> {
    match format {
        OutputFormat::Table => Box::new(PlainTextOutputStrategy::new(verbose, !no_header)),
        OutputFormat::Json => Box::new(JsonOutputStrategy),
        OutputFormat::Csv => Box::new(CsvOutputStrategy::new(!no_header)),
    }
}

pub struct OutputContext<S: OutputStrategy + ?Sized> {
    strategy: Box<S>,
}

impl<S: OutputStrategy + ?Sized> OutputContext<S> {
    pub fn new(strategy: Box<S>) -> Self {
        Self { strategy }
    }

    pub fn process_events(&self, events: &[SecurityEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| self.strategy.format_event(event))
            .collect()
    }

    pub fn generate_report(&self, events: &[SecurityEvent]) -> String {
        self.strategy.render(events)
    }

    pub fn save_report(&self, path: &Path, events: &[SecurityEvent]) -> Result<()> {
        let report = self.generate_report(events);
        self.strategy.save_to_file(path, &report)
    }
}

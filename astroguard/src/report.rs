use std::{fmt, fs::File, io::Write, path::Path, str::FromStr};

use anyhow::Result;
use astroguard_common::{EventType, SecurityEvent, Severity};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::analytics::{self, TimelinePoint};
use crate::errors::AstroGuardError;

pub const TOP_EVENTS_LIMIT: usize = 10;
pub const TIMELINE_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Executive,
    Detailed,
    Compliance,
    Threat,
}

impl ReportKind {
    pub fn all() -> Vec<ReportKind> {
        vec![
            Self::Executive,
            Self::Detailed,
            Self::Compliance,
            Self::Threat,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Executive => "executive",
            ReportKind::Detailed => "detailed",
            ReportKind::Compliance => "compliance",
            ReportKind::Threat => "threat",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Executive => "Executive Security Report",
            ReportKind::Detailed => "Detailed Security Report",
            ReportKind::Compliance => "Compliance Security Report",
            ReportKind::Threat => "Threat Security Report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AstroGuardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ReportKind::all()
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AstroGuardError::InvalidReportKind {
                kind: s.to_string(),
                valid_kinds: ReportKind::all()
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl ReportFormat {
    pub fn all() -> Vec<ReportFormat> {
        vec![Self::Markdown, Self::Json, Self::Html]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = AstroGuardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            _ => Err(AstroGuardError::InvalidOutputFormat {
                format: s.to_string(),
                valid_formats: ReportFormat::all()
                    .iter()
                    .map(|f| f.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub mission_critical: usize,
    pub foreign_access: usize,
    pub malware: usize,
    pub mitre_tagged: usize,
    /// Rounded mean risk score; `None` when there are no events.
    pub avg_risk_score: Option<u32>,
}

impl ReportStats {
    pub fn from_events(events: &[SecurityEvent]) -> Self {
        let severities = analytics::severity_distribution(events);
        Self {
            total: severities.total,
            high: severities.high_severity,
            medium: severities.medium_severity,
            low: severities.low_severity,
            mission_critical: events.iter().filter(|e| e.is_mission_critical).count(),
            foreign_access: events.iter().filter(|e| !e.is_domestic()).count(),
            malware: events
                .iter()
                .filter(|e| e.event_type == EventType::MalwareDetection)
                .count(),
            mitre_tagged: events.iter().filter(|e| e.mitre_attack.is_some()).count(),
            avg_risk_score: analytics::average_risk(events).map(|avg| avg.round() as u32),
        }
    }

    fn avg_risk_label(&self) -> String {
        self.avg_risk_score
            .map_or_else(|| "N/A".to_string(), |avg| avg.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelledCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub event_types: Vec<LabelledCount>,
    pub severity: Vec<LabelledCount>,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub ip: String,
    pub username: String,
    pub risk_score: u8,
    pub mitre: Option<String>,
}

impl ReportRow {
    fn from_event(event: &SecurityEvent) -> Self {
        Self {
            id: event.id.clone(),
            timestamp: event.timestamp,
            event_type: event.event_type.as_str().replace('_', " "),
            ip: event.ip.clone(),
            username: event.username.clone(),
            risk_score: event.risk_score,
            mitre: event.mitre_attack.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub metadata: ReportMetadata,
    pub summary: String,
    pub stats: ReportStats,
    pub chart_data: ChartData,
    pub top_events: Vec<ReportRow>,
    pub recommendations: Vec<String>,
}

impl SecurityReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.metadata.title));
        md.push_str(&format!(
            "- **Generated**: {}\n",
            self.metadata.generated_at.to_rfc3339()
        ));
        md.push_str(&format!("- **Version**: {}\n", self.metadata.version));
        md.push_str("- **Classification**: RESTRICTED\n\n");

        md.push_str("## Summary\n\n");
        md.push_str(&format!("{}\n\n", self.summary));

        md.push_str("## Key Statistics\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Total Events | {} |\n", self.stats.total));
        md.push_str(&format!("| High Severity | {} |\n", self.stats.high));
        md.push_str(&format!("| Medium Severity | {} |\n", self.stats.medium));
        md.push_str(&format!("| Low Severity | {} |\n", self.stats.low));
        md.push_str(&format!(
            "| Mission Critical | {} |\n",
            self.stats.mission_critical
        ));
        md.push_str(&format!(
            "| Foreign Access | {} |\n",
            self.stats.foreign_access
        ));
        md.push_str(&format!("| Malware | {} |\n", self.stats.malware));
        md.push_str(&format!(
            "| Avg Risk Score | {} |\n\n",
            self.stats.avg_risk_label()
        ));

        if !self.chart_data.event_types.is_empty() {
            md.push_str("## Event Types\n\n");
            for entry in &self.chart_data.event_types {
                md.push_str(&format!("- {}: {}\n", entry.name, entry.count));
            }
            md.push('\n');
        }

        md.push_str("## Last 7 Days\n\n");
        md.push_str("| Date | Total | High |\n");
        md.push_str("|------|-------|------|\n");
        for point in &self.chart_data.timeline {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                point.date.format("%b %-d"),
                point.total,
                point.high
            ));
        }
        md.push('\n');

        if self.top_events.is_empty() {
            md.push_str("✅ No high severity events detected.\n\n");
        } else {
            md.push_str("## Top High-Risk Events\n\n");
            md.push_str("| Event ID | Timestamp | Type | IP Address | Username | Risk Score | MITRE ATT&CK |\n");
            md.push_str("|----------|-----------|------|------------|----------|------------|--------------|\n");
            for row in &self.top_events {
                md.push_str(&format!(
                    "| {} | {} | {} | `{}` | {} | {} | {} |\n",
                    row.id,
                    row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    row.event_type,
                    row.ip,
                    row.username,
                    row.risk_score,
                    row.mitre.as_deref().unwrap_or("N/A")
                ));
            }
            md.push('\n');
        }

        md.push_str("## Recommendations\n\n");
        for recommendation in &self.recommendations {
            md.push_str(&format!("- {}\n", recommendation));
        }

        md
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str(&format!(
            "  <title>{}</title>\n",
            escape_html(&self.metadata.title)
        ));
        html.push_str(HTML_STYLE);
        html.push_str("</head>\n<body>\n");

        html.push_str("  <div class=\"header\">\n");
        html.push_str(&format!("    <h1>{}</h1>\n", escape_html(&self.metadata.title)));
        html.push_str(&format!(
            "    <p>Generated: {}</p>\n",
            self.metadata.generated_at.to_rfc3339()
        ));
        html.push_str("    <p><strong>Classification: RESTRICTED</strong></p>\n");
        html.push_str("  </div>\n");

        html.push_str("  <div class=\"summary\">\n    <h2>Summary</h2>\n");
        html.push_str(&format!("    <p>{}</p>\n  </div>\n", escape_html(&self.summary)));

        html.push_str("  <h2>Key Statistics</h2>\n  <div class=\"stats\">\n");
        for (label, value) in [
            ("Total Events", self.stats.total.to_string()),
            ("High Severity", self.stats.high.to_string()),
            ("Mission Critical", self.stats.mission_critical.to_string()),
            ("Avg Risk Score", self.stats.avg_risk_label()),
        ] {
            html.push_str(&format!(
                "    <div class=\"stat-card\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">{}</div></div>\n",
                value, label
            ));
        }
        html.push_str("  </div>\n");

        html.push_str("  <h2>Top High-Risk Events</h2>\n  <table>\n");
        html.push_str("    <thead><tr><th>Event ID</th><th>Timestamp</th><th>Type</th><th>IP Address</th><th>Username</th><th>Risk Score</th><th>MITRE ATT&amp;CK</th></tr></thead>\n");
        html.push_str("    <tbody>\n");
        for row in &self.top_events {
            html.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td><td>{}</td><td><code>{}</code></td><td>{}</td><td><span class=\"badge badge-high\">{}</span></td><td>{}</td></tr>\n",
                escape_html(&row.id),
                row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                escape_html(&row.event_type),
                escape_html(&row.ip),
                escape_html(&row.username),
                row.risk_score,
                escape_html(row.mitre.as_deref().unwrap_or("N/A"))
            ));
        }
        html.push_str("    </tbody>\n  </table>\n");

        html.push_str("  <h2>Recommendations</h2>\n  <ul>\n");
        for recommendation in &self.recommendations {
            html.push_str(&format!("    <li>{}</li>\n", escape_html(recommendation)));
        }
        html.push_str("  </ul>\n");

        html.push_str("  <div class=\"footer\"><p><strong>CONFIDENTIAL - For Official Use Only</strong></p></div>\n");
        html.push_str("</body>\n</html>\n");
        html
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Markdown => Ok(self.to_markdown()),
            ReportFormat::Html => Ok(self.to_html()),
        }
    }
}

const HTML_STYLE: &str = r#"  <style>
    body { font-family: Arial, sans-serif; margin: 40px; }
    h1 { color: #ff6b35; border-bottom: 3px solid #ff6b35; padding-bottom: 10px; }
    .header { text-align: center; margin-bottom: 30px; }
    .summary { background: #f5f5f5; padding: 20px; border-left: 4px solid #ff6b35; margin: 20px 0; }
    .stats { display: grid; grid-template-columns: repeat(4, 1fr); gap: 15px; margin: 20px 0; }
    .stat-card { border: 1px solid #ddd; padding: 15px; border-radius: 8px; }
    .stat-value { font-size: 32px; font-weight: bold; color: #ff6b35; }
    .stat-label { color: #666; font-size: 14px; }
    table { width: 100%; border-collapse: collapse; margin: 20px 0; }
    th { background: #ff6b35; color: white; padding: 12px; text-align: left; }
    td { padding: 10px; border-bottom: 1px solid #ddd; }
    .badge-high { background: #fee; color: #d00; padding: 4px 8px; border-radius: 4px; }
    .footer { margin-top: 50px; text-align: center; color: #666; font-size: 12px; }
  </style>
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub struct ReportGenerator {
    kind: ReportKind,
    lookback_days: u32,
}

impl ReportGenerator {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            lookback_days: 30,
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn generate<Tz: TimeZone>(&self, events: &[SecurityEvent], now: &DateTime<Tz>) -> SecurityReport {
        let stats = ReportStats::from_events(events);

        SecurityReport {
            metadata: ReportMetadata {
                kind: self.kind,
                title: self.kind.title().to_string(),
                generated_at: now.with_timezone(&Utc),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            summary: self.summary(&stats),
            chart_data: Self::chart_data(events, now),
            top_events: events
                .iter()
                .filter(|e| e.severity == Severity::High)
                .take(TOP_EVENTS_LIMIT)
                .map(ReportRow::from_event)
                .collect(),
            recommendations: Self::recommendations(&stats),
            stats,
        }
    }

    fn summary(&self, stats: &ReportStats) -> String {
        match self.kind {
            ReportKind::Executive => format!(
                "Executive Summary: Analyzed {} security events over the past {} days. \
                 Detected {} high-severity incidents requiring immediate attention. \
                 {} mission-critical events identified affecting ISRO ground stations, \
                 telemetry systems, and satellite operations.",
                stats.total, self.lookback_days, stats.high, stats.mission_critical
            ),
            ReportKind::Detailed => format!(
                "Detailed Analysis: Comprehensive examination of {} security events reveals \
                 {} high-severity threats, {} medium-severity incidents, and {} low-severity \
                 events. Mission-critical infrastructure affected in {} cases.",
                stats.total, stats.high, stats.medium, stats.low, stats.mission_critical
            ),
            ReportKind::Compliance => format!(
                "Compliance Report: Security audit covering {} events for CERT-In compliance. \
                 All incidents logged with complete audit trail. {} high-priority incidents \
                 flagged for mandatory reporting. MITRE ATT&CK framework applied to {} events.",
                stats.total, stats.high, stats.mitre_tagged
            ),
            ReportKind::Threat => format!(
                "Threat Intelligence Report: Active threat landscape analysis of {} security \
                 events. {} critical threats detected with {} malware incidents and {} foreign \
                 access attempts identified.",
                stats.total, stats.high, stats.malware, stats.foreign_access
            ),
        }
    }

    fn chart_data<Tz: TimeZone>(events: &[SecurityEvent], now: &DateTime<Tz>) -> ChartData {
        let severities = analytics::severity_distribution(events);
        ChartData {
            event_types: analytics::event_type_distribution(events)
                .into_iter()
                .map(|(event_type, count)| LabelledCount {
                    name: event_type.title(),
                    count,
                })
                .collect(),
            severity: vec![
                LabelledCount {
                    name: "High".to_string(),
                    count: severities.high_severity,
                },
                LabelledCount {
                    name: "Medium".to_string(),
                    count: severities.medium_severity,
                },
                LabelledCount {
                    name: "Low".to_string(),
                    count: severities.low_severity,
                },
            ],
            timeline: analytics::recent_timeline(events, now, TIMELINE_DAYS),
        }
    }

    fn recommendations(stats: &ReportStats) -> Vec<String> {
        vec![
            format!(
                "Immediate investigation required for {} high-severity incidents",
                stats.high
            ),
            format!(
                "Review and strengthen access controls for {} mission-critical systems",
                stats.mission_critical
            ),
            format!(
                "Implement geo-blocking for {} unauthorized foreign access attempts",
                stats.foreign_access
            ),
            format!(
                "Update malware signatures and conduct full system scan ({} detections)",
                stats.malware
            ),
            "Conduct security awareness training for affected users".to_string(),
        ]
    }

    pub fn save(report: &SecurityReport, path: &Path, format: ReportFormat) -> Result<()> {
        let content = report.render(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    pub fn print_summary(report: &SecurityReport) {
        println!("\n📊 {}", report.metadata.title);
        println!("===============================");
        println!("{}", report.summary);
        println!("Total Events: {}", report.stats.total);
        println!("Mission Critical: {}", report.stats.mission_critical);
        println!("Foreign Access: {}", report.stats.foreign_access);
        println!("Avg Risk Score: {}", report.stats.avg_risk_label());

        if report.stats.high > 0 {
            println!("⚠️  High Severity Events: {}", report.stats.high);
        } else {
            println!("✅ No high severity events detected");
        }
    }
}

//! Reports and exports built from a generated dataset

mod test_helpers;

use astroguard::analytics::DashboardMetrics;
use astroguard::configuration::OutputFormat;
use astroguard::output_strategy::{strategy_for, OutputContext, CSV_HEADER};
use astroguard::report::{ReportFormat, ReportGenerator, ReportKind};
use astroguard_common::Severity;
use tempfile::tempdir;
use test_helpers::{events, fixed_now, seeded_dataset};

mod report_generation {
    use super::*;

    #[test]
    fn should_agree_with_dashboard_metrics() {
        let dataset = seeded_dataset(300, 77);
        let metrics = DashboardMetrics::from_events(dataset.events());

        let report = ReportGenerator::new(ReportKind::Detailed).generate(dataset.events(), &fixed_now());

        assert_eq!(report.stats.total, metrics.total_events);
        assert_eq!(report.stats.high, metrics.high_risk_events);
        assert_eq!(report.stats.mission_critical, metrics.mission_critical_events);
        assert_eq!(report.stats.foreign_access, metrics.foreign_access);
        assert_eq!(
            report.stats.high + report.stats.medium + report.stats.low,
            report.stats.total
        );
    }

    #[test]
    fn should_keep_top_events_high_severity_and_newest_first() {
        let dataset = seeded_dataset(300, 78);

        let report = ReportGenerator::new(ReportKind::Threat).generate(dataset.events(), &fixed_now());

        assert_eq!(report.top_events.len(), 10);
        assert!(report
            .top_events
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
        let high_ids: Vec<_> = dataset
            .events()
            .iter()
            .filter(|e| e.severity == Severity::High)
            .map(|e| e.id.clone())
            .collect();
        assert!(report.top_events.iter().all(|row| high_ids.contains(&row.id)));
    }

    #[test]
    fn should_mention_lookback_in_executive_summary() {
        let report = ReportGenerator::new(ReportKind::Executive)
            .with_lookback_days(14)
            .generate(&events::mixed(), &fixed_now());

        assert!(report
            .summary
            .starts_with("Executive Summary: Analyzed 6 security events over the past 14 days."));
    }

    #[test]
    fn should_handle_empty_dataset() {
        let report = ReportGenerator::new(ReportKind::Compliance).generate(&[], &fixed_now());

        assert_eq!(report.stats.total, 0);
        assert_eq!(report.stats.avg_risk_score, None);
        assert!(report.top_events.is_empty());
        assert!(report.to_markdown().contains("| Avg Risk Score | N/A |"));
    }
}

mod report_files {
    use super::*;

    #[test]
    fn should_save_every_format() {
        let dir = tempdir().unwrap();
        let report = ReportGenerator::new(ReportKind::Executive).generate(&events::mixed(), &fixed_now());

        for (format, name) in [
            (ReportFormat::Markdown, "report.md"),
            (ReportFormat::Json, "report.json"),
            (ReportFormat::Html, "report.html"),
        ] {
            let path = dir.path().join(name);
            ReportGenerator::save(&report, &path, format).unwrap();

            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains("Executive"), "{} missing title", name);
        }

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(json["metadata"]["kind"], "executive");
        assert_eq!(json["stats"]["total"], 6);
    }

    #[test]
    fn should_fail_for_missing_directory() {
        let dir = tempdir().unwrap();
        let report = ReportGenerator::new(ReportKind::Threat).generate(&events::mixed(), &fixed_now());

        let result = ReportGenerator::save(
            &report,
            &dir.path().join("missing").join("report.md"),
            ReportFormat::Markdown,
        );

        assert!(result.is_err());
    }
}

mod dataset_export {
    use super::*;

    #[test]
    fn should_export_one_csv_row_per_event() {
        let dataset = seeded_dataset(50, 5);
        let context = OutputContext::new(strategy_for(OutputFormat::Csv, false, false));

        let csv = context.generate_report(dataset.events());

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 51);
        assert!(lines[1].starts_with(&dataset.events()[0].id));
    }

    #[test]
    fn should_export_json_array_readable_as_events() {
        let dataset = seeded_dataset(20, 6);
        let context = OutputContext::new(strategy_for(OutputFormat::Json, false, false));
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");

        context.save_report(&path, dataset.events()).unwrap();

        let exported: Vec<astroguard_common::SecurityEvent> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported.as_slice(), dataset.events());
    }
}

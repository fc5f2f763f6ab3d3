use std::io::Write;
use std::path::Path;

use astroguard::{
    alerts::ProactiveAlerts,
    analytics::{self, DashboardMetrics},
    cli::{self, CliApp, CliCommand, CliConfig},
    configuration::{Configuration, OutputFormat},
    output_strategy::{self, OutputContext},
    report::{ReportFormat, ReportGenerator, ReportKind, TIMELINE_DAYS},
    session::{MessageRole, QuerySession},
    Dataset, EventFormatter, QueryResult,
};
use chrono::Local;
use log::{debug, info};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    signal,
};

const TOP_USERS: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = CliApp::new().get_matches();
    let cli = CliConfig::from_matches(&matches)?;

    // Validate arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    env_logger::init();

    match &cli.command {
        CliCommand::ConfigGenerate { output } => return generate_config(output),
        CliCommand::ConfigValidate { file } => return validate_config(file),
        _ => {}
    }

    let config = load_configuration(&cli)?;
    debug!("Effective configuration: {:?}", config);

    let dataset = Dataset::generate(&config);
    info!("Generated {} security events", dataset.len());

    match &cli.command {
        CliCommand::Query { text, output, .. } => {
            run_query(dataset, &config, text, output.as_deref()).await
        }
        CliCommand::Shell => run_shell(dataset, &config).await,
        CliCommand::Report {
            kind,
            format,
            output,
        } => run_report(&dataset, &config, *kind, *format, output.as_deref()),
        CliCommand::Export { format, output } => {
            run_export(&dataset, &config, *format, output.as_deref())
        }
        CliCommand::Alerts => {
            print_alerts(&ProactiveAlerts::from_config(&config), &dataset);
            Ok(())
        }
        CliCommand::Stats => {
            print_stats(&dataset);
            Ok(())
        }
        CliCommand::ConfigGenerate { .. } | CliCommand::ConfigValidate { .. } => Ok(()),
    }
}

/// Configuration file first, then environment, then command-line flags.
fn load_configuration(cli: &CliConfig) -> anyhow::Result<Configuration> {
    let mut builder = Configuration::builder();
    if let Some(path) = &cli.config_file {
        builder = builder.from_config_file(path)?;
    }
    builder = builder.from_environment()?;
    Ok(cli.apply_overrides(builder).build()?)
}

fn generate_config(output: &Path) -> anyhow::Result<()> {
    let file = Configuration::builder().build()?.to_config_file();
    let content = match output.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::to_string_pretty(&file)?,
        Some("json") => serde_json::to_string_pretty(&file)?,
        _ => serde_yaml::to_string(&file)?,
    };
    std::fs::write(output, content)?;
    println!("✅ Configuration written to {}", output.display());
    Ok(())
}

fn validate_config(file: &Path) -> anyhow::Result<()> {
    match Configuration::builder()
        .from_config_file(file)
        .and_then(|builder| builder.build())
    {
        Ok(config) => {
            println!("✅ {} is valid", file.display());
            println!(
                "   {} events over {} days, {} ms processing delay",
                config.event_count(),
                config.lookback_days(),
                config.processing_delay().as_millis()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_query(
    dataset: Dataset,
    config: &Configuration,
    text: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut session = QuerySession::new(dataset, config);
    let result = session.submit(text).await;

    if let Some(path) = output {
        let context = OutputContext::new(output_strategy::strategy_for(
            config.output_format(),
            config.is_verbose(),
            config.output.no_header,
        ));
        context.save_report(path, &result.events)?;
        if !config.is_quiet() {
            println!("{}", result.summary);
            println!("💾 Saved {} events to {}", result.events.len(), path.display());
        }
        return Ok(());
    }

    print_result(result, config);
    Ok(())
}

fn print_result(result: &QueryResult, config: &Configuration) {
    let shown = config
        .output
        .limit
        .map_or(result.events.len(), |limit| limit.min(result.events.len()));
    let events = &result.events[..shown];

    match config.output_format() {
        OutputFormat::Table => {
            if !config.is_quiet() {
                println!("🤖 {}", result.summary);
                println!(
                    "   intent: {} (confidence {:.1})",
                    result.intent.action, result.intent.confidence
                );
                println!("   DSL: {}", result.dsl_query);
                println!("   KQL: {}", result.kql_query);
                println!();
            }

            let formatter = EventFormatter::new(config.is_verbose());
            if !config.output.no_header && !events.is_empty() {
                println!("{}", formatter.header());
                println!("{}", formatter.separator());
            }
            for event in events {
                println!("{}", formatter.format_event(event));
            }
            if shown < result.events.len() && !config.is_quiet() {
                println!("... {} more events", result.events.len() - shown);
            }
        }
        format => {
            let strategy =
                output_strategy::strategy_for(format, config.is_verbose(), config.output.no_header);
            print!("{}", strategy.render(events));
            if format == OutputFormat::Json {
                println!();
            }
        }
    }
}

async fn run_shell(dataset: Dataset, config: &Configuration) -> anyhow::Result<()> {
    let mut alerts = ProactiveAlerts::from_config(config);
    let mut session = QuerySession::new(dataset, config);

    if !config.is_quiet() {
        cli::print_banner();
        if let Some(welcome) = session.conversation().first() {
            println!("\n🤖 {}", welcome.content);
        }
        println!("Type :help for commands, Ctrl+C to exit\n");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("astroguard> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, exiting...");
                break;
            }
        };

        let Some(line) = line else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').map_or((input, ""), |(cmd, rest)| (cmd, rest.trim())) {
            (":quit", _) | (":exit", _) => break,
            (":help", _) => print_shell_help(),
            (":reset", _) => {
                session.reset_context();
                println!("🔄 Context cleared; the next filter starts fresh");
            }
            (":history", _) => {
                for message in session.conversation() {
                    let speaker = match message.role {
                        MessageRole::User => "you",
                        MessageRole::Assistant => "astroguard",
                    };
                    println!(
                        "[{}] {}: {}",
                        message.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                        speaker,
                        message.content
                    );
                }
            }
            (":audit", _) => println!("{}", session.audit_log_json()?),
            (":alerts", _) => print_alerts(&alerts, session.dataset()),
            (":dismiss", id) if !id.is_empty() => {
                if alerts.dismiss(id) {
                    println!("🔕 Dismissed {}", id);
                } else {
                    println!("{} was already dismissed", id);
                }
            }
            (":stats", _) => print_stats(session.dataset()),
            (cmd, _) if cmd.starts_with(':') => {
                println!("Unknown command {}; type :help", cmd);
            }
            _ => {
                let result = session.submit(input).await;
                print_result(result, config);
            }
        }
    }

    info!(
        "Session ended after {} queries",
        session.audit_log_len()
    );
    Ok(())
}

fn print_shell_help() {
    println!("Ask a question in plain English, or use:");
    println!("  :reset          forget the previous question's filters");
    println!("  :history        show the conversation");
    println!("  :audit          print the audit log as JSON");
    println!("  :alerts         show proactive alerts");
    println!("  :dismiss <id>   hide an alert");
    println!("  :stats          show dashboard metrics");
    println!("  :quit           leave the session");
}

fn run_report(
    dataset: &Dataset,
    config: &Configuration,
    kind: ReportKind,
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let report = ReportGenerator::new(kind)
        .with_lookback_days(config.lookback_days())
        .generate(dataset.events(), &Local::now());

    match output {
        Some(path) => {
            ReportGenerator::save(&report, path, format)?;
            if !config.is_quiet() {
                ReportGenerator::print_summary(&report);
                println!("💾 Report saved to {}", path.display());
            }
        }
        None => println!("{}", report.render(format)?),
    }
    Ok(())
}

fn run_export(
    dataset: &Dataset,
    config: &Configuration,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let context = OutputContext::new(output_strategy::strategy_for(
        format,
        config.is_verbose(),
        config.output.no_header,
    ));

    match output {
        Some(path) => {
            context.save_report(path, dataset.events())?;
            if !config.is_quiet() {
                println!("💾 Exported {} events to {}", dataset.len(), path.display());
            }
        }
        None => println!("{}", context.generate_report(dataset.events())),
    }
    Ok(())
}

fn print_alerts(alerts: &ProactiveAlerts, dataset: &Dataset) {
    let raised = alerts.detect(dataset.events());
    if raised.is_empty() {
        println!("✅ No active alerts");
        return;
    }

    println!("🚨 {} active alerts", raised.len());
    for alert in &raised {
        println!("  [{}] {}", alert.id(), alert.title());
        println!("      {}", alert.description());
    }
}

fn print_stats(dataset: &Dataset) {
    let events = dataset.events();
    let metrics = DashboardMetrics::from_events(events);

    println!("📊 Security Dashboard");
    println!("=====================");
    println!("Total Events:       {}", metrics.total_events);
    println!("High Risk Events:   {}", metrics.high_risk_events);
    println!("Active Threats:     {}", metrics.active_threats);
    println!("Mission Critical:   {}", metrics.mission_critical_events);
    println!("Foreign Access:     {}", metrics.foreign_access);
    match metrics.average_risk {
        Some(avg) => println!("Average Risk:       {:.1}", avg),
        None => println!("Average Risk:       N/A"),
    }

    println!("\n📋 Event Types:");
    for (event_type, count) in analytics::event_type_distribution(events) {
        println!("  {:<24} {}", event_type.title(), count);
    }

    println!("\n🎯 Risk Distribution:");
    for bucket in analytics::risk_distribution(events) {
        println!("  {:<8} {}", bucket.label, bucket.count);
    }

    println!("\n📈 Last {} Days:", TIMELINE_DAYS);
    for point in analytics::recent_timeline(events, &Local::now(), TIMELINE_DAYS) {
        println!(
            "  {}  total {:>4}  high {:>3}  medium {:>3}  low {:>3}",
            point.date, point.total, point.high, point.medium, point.low
        );
    }

    println!("\n👤 Top Risky Users:");
    for user in analytics::top_risky_users(events, TOP_USERS) {
        println!(
            "  {:<16} avg risk {:>3} ({} events)",
            user.username, user.avg_risk, user.events
        );
    }
}

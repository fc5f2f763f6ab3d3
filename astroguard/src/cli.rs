use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};

use crate::configuration::{ConfigurationBuilder, OutputFormat};
use crate::report::{ReportFormat, ReportKind};

pub struct CliApp {
    app: Command,
}

impl CliApp {
    pub fn new() -> Self {
        let app = Command::new("astroguard")
            .version(env!("CARGO_PKG_VERSION"))
            .author("astroguard contributors")
            .about("Conversational security event analysis for space operations")
            .long_about("astroguard generates a synthetic security event dataset and answers plain-English questions about it, translating each question into DSL and KQL queries, raising proactive alerts and producing security reports.")
            .arg(
                Arg::new("config")
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .long_help("Path to a YAML, JSON or TOML configuration file. CLI options override values from the file.")
                    .value_parser(clap::value_parser!(PathBuf))
                    .global(true)
            )
            .arg(
                Arg::new("count")
                    .short('n')
                    .long("count")
                    .value_name("EVENTS")
                    .help("Number of synthetic events to generate")
                    .value_parser(clap::value_parser!(usize))
                    .global(true)
            )
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_name("SEED")
                    .help("Seed for a reproducible dataset")
                    .value_parser(clap::value_parser!(u64))
                    .global(true)
            )
            .arg(
                Arg::new("lookback-days")
                    .long("lookback-days")
                    .value_name("DAYS")
                    .help("Spread generated events over this many past days")
                    .value_parser(clap::value_parser!(u32))
                    .global(true)
            )
            .arg(
                Arg::new("delay-ms")
                    .long("delay-ms")
                    .value_name("MILLIS")
                    .help("Simulated processing delay before each query is answered")
                    .value_parser(clap::value_parser!(u64))
                    .global(true)
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Show verbose output including location and MITRE technique")
                    .action(clap::ArgAction::SetTrue)
                    .global(true)
            )
            .arg(
                Arg::new("quiet")
                    .short('q')
                    .long("quiet")
                    .help("Suppress banners and summaries (useful when saving to file)")
                    .action(clap::ArgAction::SetTrue)
                    .conflicts_with("verbose")
                    .global(true)
            )
            .arg(
                Arg::new("no-header")
                    .long("no-header")
                    .help("Suppress column headers in output")
                    .action(clap::ArgAction::SetTrue)
                    .global(true)
            )
            .arg(
                Arg::new("no-context")
                    .long("no-context")
                    .help("Do not carry the previous question's filters into follow-up filters")
                    .action(clap::ArgAction::SetTrue)
                    .global(true)
            )
            .subcommand(
                Command::new("query")
                    .about("Answer a single plain-English question")
                    .arg(
                        Arg::new("text")
                            .value_name("TEXT")
                            .help("Question, e.g. \"show failed logins last 7 days\"")
                            .required(true)
                            .num_args(1..)
                    )
                    .arg(
                        Arg::new("format")
                            .short('f')
                            .long("format")
                            .value_name("FORMAT")
                            .help("Format for matched events")
                            .value_parser(["table", "json", "csv"])
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .value_name("FILE")
                            .help("Save matched events to a file")
                            .value_parser(clap::value_parser!(PathBuf))
                    )
                    .arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_name("ROWS")
                            .help("Show at most this many matched events")
                            .value_parser(clap::value_parser!(usize))
                    )
            )
            .subcommand(
                Command::new("shell")
                    .about("Interactive multi-turn session (default)")
            )
            .subcommand(
                Command::new("report")
                    .about("Generate a security report")
                    .arg(
                        Arg::new("kind")
                            .short('k')
                            .long("kind")
                            .value_name("KIND")
                            .help("Report kind")
                            .value_parser(["executive", "detailed", "compliance", "threat"])
                            .default_value("executive")
                    )
                    .arg(
                        Arg::new("format")
                            .short('f')
                            .long("format")
                            .value_name("FORMAT")
                            .help("Report format")
                            .value_parser(["markdown", "md", "json", "html"])
                            .default_value("markdown")
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .value_name("FILE")
                            .help("Output file for the report")
                            .value_parser(clap::value_parser!(PathBuf))
                    )
            )
            .subcommand(
                Command::new("export")
                    .about("Export the whole event dataset")
                    .arg(
                        Arg::new("format")
                            .short('f')
                            .long("format")
                            .value_name("FORMAT")
                            .help("Export format")
                            .value_parser(["csv", "json"])
                            .default_value("csv")
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .value_name("FILE")
                            .help("Output file (stdout when omitted)")
                            .value_parser(clap::value_parser!(PathBuf))
                    )
            )
            .subcommand(
                Command::new("alerts")
                    .about("Show proactive alerts for the dataset")
            )
            .subcommand(
                Command::new("stats")
                    .about("Show dashboard metrics and distributions")
            )
            .subcommand(
                Command::new("config")
                    .about("Configuration management")
                    .subcommand_required(true)
                    .subcommand(
                        Command::new("generate")
                            .about("Generate a sample configuration file")
                            .arg(
                                Arg::new("output")
                                    .short('o')
                                    .long("output")
                                    .value_name("FILE")
                                    .help("Output configuration file path")
                                    .default_value("astroguard.yaml")
                                    .value_parser(clap::value_parser!(PathBuf))
                            )
                    )
                    .subcommand(
                        Command::new("validate")
                            .about("Validate a configuration file")
                            .arg(
                                Arg::new("file")
                                    .value_name("FILE")
                                    .help("Configuration file to validate")
                                    .required(true)
                                    .value_parser(clap::value_parser!(PathBuf))
                            )
                    )
            );

        Self { app }
    }

    pub fn get_matches(self) -> ArgMatches {
        self.app.get_matches()
    }

    pub fn try_get_matches(self) -> Result<ArgMatches, clap::Error> {
        self.app.try_get_matches()
    }

    pub fn try_get_matches_from<I, T>(self, args: I) -> Result<ArgMatches, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        self.app.try_get_matches_from(args)
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Query {
        text: String,
        format: Option<OutputFormat>,
        output: Option<PathBuf>,
        limit: Option<usize>,
    },
    Shell,
    Report {
        kind: ReportKind,
        format: ReportFormat,
        output: Option<PathBuf>,
    },
    Export {
        format: OutputFormat,
        output: Option<PathBuf>,
    },
    Alerts,
    Stats,
    ConfigGenerate {
        output: PathBuf,
    },
    ConfigValidate {
        file: PathBuf,
    },
}

impl CliCommand {
    /// Config subcommands run without generating a dataset.
    pub fn needs_dataset(&self) -> bool {
        !matches!(
            self,
            CliCommand::ConfigGenerate { .. } | CliCommand::ConfigValidate { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub config_file: Option<PathBuf>,
    pub event_count: Option<usize>,
    pub seed: Option<u64>,
    pub lookback_days: Option<u32>,
    pub delay_ms: Option<u64>,
    pub verbose: bool,
    pub quiet: bool,
    pub no_header: bool,
    pub no_context: bool,
    pub command: CliCommand,
}

impl CliConfig {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let command = match matches.subcommand() {
            Some(("query", sub)) => {
                let text = sub
                    .get_many::<String>("text")
                    .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                let format = sub
                    .get_one::<String>("format")
                    .map(|f| f.parse::<OutputFormat>())
                    .transpose()?;

                CliCommand::Query {
                    text,
                    format,
                    output: sub.get_one::<PathBuf>("output").cloned(),
                    limit: sub.get_one::<usize>("limit").copied(),
                }
            }
            Some(("report", sub)) => CliCommand::Report {
                kind: Self::string_arg(sub, "kind", "executive").parse()?,
                format: Self::string_arg(sub, "format", "markdown").parse()?,
                output: sub.get_one::<PathBuf>("output").cloned(),
            },
            Some(("export", sub)) => CliCommand::Export {
                format: Self::string_arg(sub, "format", "csv").parse()?,
                output: sub.get_one::<PathBuf>("output").cloned(),
            },
            Some(("alerts", _)) => CliCommand::Alerts,
            Some(("stats", _)) => CliCommand::Stats,
            Some(("config", sub)) => match sub.subcommand() {
                Some(("generate", generate)) => CliCommand::ConfigGenerate {
                    output: generate
                        .get_one::<PathBuf>("output")
                        .cloned()
                        .unwrap_or_else(|| PathBuf::from("astroguard.yaml")),
                },
                Some(("validate", validate)) => CliCommand::ConfigValidate {
                    file: validate
                        .get_one::<PathBuf>("file")
                        .cloned()
                        .ok_or_else(|| anyhow::anyhow!("Missing configuration file to validate"))?,
                },
                _ => return Err(anyhow::anyhow!("Missing config subcommand")),
            },
            _ => CliCommand::Shell,
        };

        Ok(Self {
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            event_count: matches.get_one::<usize>("count").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            lookback_days: matches.get_one::<u32>("lookback-days").copied(),
            delay_ms: matches.get_one::<u64>("delay-ms").copied(),
            verbose: matches.get_flag("verbose"),
            quiet: matches.get_flag("quiet"),
            no_header: matches.get_flag("no-header"),
            no_context: matches.get_flag("no-context"),
            command,
        })
    }

    fn string_arg<'a>(matches: &'a ArgMatches, id: &str, default: &'a str) -> &'a str {
        matches
            .get_one::<String>(id)
            .map(String::as_str)
            .unwrap_or(default)
    }

    /// Layer command-line values over a builder already loaded from file and
    /// environment. Flags only ever switch behaviour on.
    pub fn apply_overrides(&self, mut builder: ConfigurationBuilder) -> ConfigurationBuilder {
        if let Some(count) = self.event_count {
            builder = builder.event_count(count);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(days) = self.lookback_days {
            builder = builder.lookback_days(days);
        }
        if let Some(delay) = self.delay_ms {
            builder = builder.processing_delay_ms(delay);
        }
        if self.verbose {
            builder = builder.verbose(true);
        }
        if self.quiet {
            builder = builder.quiet(true);
        }
        if self.no_header {
            builder = builder.no_header(true);
        }
        if self.no_context {
            builder = builder.carry_over_context(false);
        }
        if let CliCommand::Query { format, limit, .. } = &self.command {
            if let Some(format) = format {
                builder = builder.output_format(*format);
            }
            if let Some(limit) = limit {
                builder = builder.limit(*limit);
            }
        }
        builder
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.verbose && self.quiet {
            return Err(anyhow::anyhow!("Cannot specify both --verbose and --quiet"));
        }

        match &self.command {
            CliCommand::Query { text, limit, .. } => {
                if text.trim().is_empty() {
                    return Err(anyhow::anyhow!("Query text must not be empty"));
                }
                if *limit == Some(0) {
                    return Err(anyhow::anyhow!("--limit must be greater than zero"));
                }
            }
            CliCommand::Export { format, .. } => {
                if *format == OutputFormat::Table {
                    return Err(anyhow::anyhow!(
                        "Invalid export format: {}. Valid formats: [\"csv\", \"json\"]",
                        format
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

pub fn print_banner() {
    println!("🛰️  astroguard v{}", env!("CARGO_PKG_VERSION"));
    println!("Conversational Security Analytics for Space Operations");
    println!("======================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use assert_matches::assert_matches;

    fn parse(args: &[&str]) -> CliConfig {
        let matches = CliApp::new().try_get_matches_from(args.iter().copied()).unwrap();
        CliConfig::from_matches(&matches).unwrap()
    }

    #[test]
    fn should_create_cli_app() {
        let app = CliApp::new();
        assert_eq!(app.app.get_name(), "astroguard");
    }

    #[test]
    fn should_default_to_shell() {
        let config = parse(&["astroguard"]);

        assert_eq!(config.command, CliCommand::Shell);
        assert!(!config.verbose);
        assert!(config.command.needs_dataset());
    }

    #[test]
    fn should_join_query_words() {
        let config = parse(&[
            "astroguard",
            "--seed",
            "7",
            "query",
            "show",
            "failed",
            "logins",
            "--format",
            "csv",
            "--limit",
            "5",
        ]);

        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.command,
            CliCommand::Query {
                text: "show failed logins".to_string(),
                format: Some(OutputFormat::Csv),
                output: None,
                limit: Some(5),
            }
        );
    }

    #[test]
    fn should_accept_global_flags_after_subcommand() {
        let config = parse(&["astroguard", "alerts", "--count", "50", "-v"]);

        assert_eq!(config.command, CliCommand::Alerts);
        assert_eq!(config.event_count, Some(50));
        assert!(config.verbose);
    }

    #[test]
    fn should_parse_report_options() {
        let config = parse(&["astroguard", "report", "-k", "threat", "-f", "md"]);

        assert_matches!(
            config.command,
            CliCommand::Report {
                kind: ReportKind::Threat,
                format: ReportFormat::Markdown,
                output: None
            }
        );
    }

    #[test]
    fn should_reject_unknown_report_kind() {
        let result = CliApp::new().try_get_matches_from(["astroguard", "report", "-k", "weekly"]);

        assert!(result.is_err());
    }

    #[test]
    fn should_reject_verbose_with_quiet() {
        let result = CliApp::new().try_get_matches_from(["astroguard", "-v", "-q", "stats"]);

        assert!(result.is_err());
    }

    #[test]
    fn should_parse_config_subcommands() {
        let generate = parse(&["astroguard", "config", "generate"]);
        let validate = parse(&["astroguard", "config", "validate", "cfg.toml"]);

        assert_eq!(
            generate.command,
            CliCommand::ConfigGenerate {
                output: PathBuf::from("astroguard.yaml")
            }
        );
        assert_eq!(
            validate.command,
            CliCommand::ConfigValidate {
                file: PathBuf::from("cfg.toml")
            }
        );
        assert!(!validate.command.needs_dataset());
    }

    #[test]
    fn should_reject_zero_limit() {
        let config = parse(&["astroguard", "query", "show", "vpn", "--limit", "0"]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn should_layer_overrides_on_builder() {
        let cli = parse(&[
            "astroguard",
            "--count",
            "40",
            "--no-context",
            "--delay-ms",
            "0",
            "query",
            "show",
            "malware",
            "-f",
            "json",
        ]);

        let config: Configuration = cli
            .apply_overrides(Configuration::builder().event_count(500))
            .build()
            .unwrap();

        assert_eq!(config.event_count(), 40);
        assert!(!config.carry_over_context());
        assert_eq!(config.processing_delay().as_millis(), 0);
        assert_eq!(config.output_format(), OutputFormat::Json);
    }
}

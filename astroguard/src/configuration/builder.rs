//! Configuration Builder
//!
//! Provides a builder pattern for constructing Configuration instances
//! from multiple sources with proper validation. Sources are applied in call
//! order, so later calls override earlier ones.

use super::{Alerts, ConfigFile, Configuration, Generator, Output, OutputFormat, Query, Runtime};
use crate::errors::AstroGuardError;
use std::fs;
use std::path::Path;

pub const ENV_EVENT_COUNT: &str = "ASTROGUARD_EVENT_COUNT";
pub const ENV_SEED: &str = "ASTROGUARD_SEED";
pub const ENV_DELAY_MS: &str = "ASTROGUARD_DELAY_MS";
pub const ENV_LOOKBACK_DAYS: &str = "ASTROGUARD_LOOKBACK_DAYS";

/// Builder for creating Configuration instances
///
/// Supports fluent API and multiple sources:
/// - CLI arguments
/// - Configuration files (YAML, JSON, TOML)
/// - Environment variables
/// - Defaults
#[derive(Debug)]
pub struct ConfigurationBuilder {
    generator: Generator,
    query: Query,
    output: Output,
    alerts: Alerts,
    runtime: Runtime,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            generator: Generator::default(),
            query: Query::default(),
            output: Output::default(),
            alerts: Alerts::default(),
            runtime: Runtime::default(),
        }
    }

    pub fn event_count(mut self, count: usize) -> Self {
        self.generator.event_count = count;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.generator.seed = Some(seed);
        self
    }

    pub fn lookback_days(mut self, days: u32) -> Self {
        self.generator.lookback_days = days;
        self
    }

    pub fn processing_delay_ms(mut self, delay_ms: u64) -> Self {
        self.query.processing_delay_ms = delay_ms;
        self
    }

    pub fn carry_over_context(mut self, enabled: bool) -> Self {
        self.query.carry_over_context = enabled;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.output.verbose = verbose;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.output.quiet = quiet;
        self
    }

    pub fn no_header(mut self, no_header: bool) -> Self {
        self.output.no_header = no_header;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.output.limit = Some(limit);
        self
    }

    /// Configure from CLI arguments (slice format for testing)
    pub fn from_cli_args(mut self, args: &[&str]) -> Result<Self, AstroGuardError> {
        let mut i = 0;
        while i < args.len() {
            match args[i] {
                "--count" | "-n" => {
                    let value = Self::value_for(args, i)?;
                    self.generator.event_count = Self::parse_number(args[i], value)?;
                    i += 2;
                }
                "--seed" => {
                    let value = Self::value_for(args, i)?;
                    self.generator.seed = Some(Self::parse_number(args[i], value)?);
                    i += 2;
                }
                "--lookback-days" => {
                    let value = Self::value_for(args, i)?;
                    self.generator.lookback_days = Self::parse_number(args[i], value)?;
                    i += 2;
                }
                "--delay-ms" => {
                    let value = Self::value_for(args, i)?;
                    self.query.processing_delay_ms = Self::parse_number(args[i], value)?;
                    i += 2;
                }
                "--format" | "-f" => {
                    let value = Self::value_for(args, i)?;
                    self.output.format = value.parse()?;
                    i += 2;
                }
                "--limit" => {
                    let value = Self::value_for(args, i)?;
                    self.output.limit = Some(Self::parse_number(args[i], value)?);
                    i += 2;
                }
                "--verbose" | "-v" => {
                    self.output.verbose = true;
                    i += 1;
                }
                "--quiet" | "-q" => {
                    self.output.quiet = true;
                    i += 1;
                }
                "--no-header" => {
                    self.output.no_header = true;
                    i += 1;
                }
                "--no-context" => {
                    self.query.carry_over_context = false;
                    i += 1;
                }
                _ => {
                    i += 1; // positional query text and unknown flags
                }
            }
        }

        Ok(self)
    }

    fn value_for<'a>(args: &[&'a str], i: usize) -> Result<&'a str, AstroGuardError> {
        args.get(i + 1)
            .copied()
            .ok_or_else(|| AstroGuardError::config(format!("Missing value for {}", args[i])))
    }

    fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, AstroGuardError> {
        value.parse().map_err(|_| {
            AstroGuardError::config(format!(
                "Invalid {}: {}",
                flag.trim_start_matches('-'),
                value
            ))
        })
    }

    /// Configure from a YAML, JSON or TOML configuration file
    pub fn from_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self, AstroGuardError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AstroGuardError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        // Auto-detect format by extension or content
        let extension = path.extension().and_then(|s| s.to_str());
        let mut builder = if extension == Some("toml") {
            self.from_toml_str(&content)?
        } else if extension == Some("json") || content.trim_start().starts_with('{') {
            self.from_json_str(&content)?
        } else {
            self.from_yaml_str(&content)?
        };

        builder.runtime.config_file = Some(path.to_path_buf());
        Ok(builder)
    }

    /// Configure from YAML string
    pub fn from_yaml_str(self, yaml: &str) -> Result<Self, AstroGuardError> {
        let file: ConfigFile = serde_yaml::from_str(yaml)
            .map_err(|e| AstroGuardError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self.apply_file(file))
    }

    /// Configure from JSON string
    pub fn from_json_str(self, json: &str) -> Result<Self, AstroGuardError> {
        let file: ConfigFile = serde_json::from_str(json)
            .map_err(|e| AstroGuardError::config(format!("Failed to parse JSON config: {}", e)))?;
        Ok(self.apply_file(file))
    }

    /// Configure from TOML string
    pub fn from_toml_str(self, toml_str: &str) -> Result<Self, AstroGuardError> {
        let file: ConfigFile = toml::from_str(toml_str)
            .map_err(|e| AstroGuardError::config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(self.apply_file(file))
    }

    fn apply_file(mut self, file: ConfigFile) -> Self {
        self.generator = file.generator;
        self.query = file.query;
        self.output = file.output;
        self.alerts = file.alerts;
        self
    }

    /// Configure from process environment variables
    pub fn from_environment(self) -> Result<Self, AstroGuardError> {
        self.from_env_vars(std::env::vars())
    }

    /// Configure from an explicit set of environment variables
    pub fn from_env_vars<I>(mut self, vars: I) -> Result<Self, AstroGuardError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_EVENT_COUNT => {
                    self.generator.event_count = Self::parse_number(ENV_EVENT_COUNT, &value)?
                }
                ENV_SEED => self.generator.seed = Some(Self::parse_number(ENV_SEED, &value)?),
                ENV_DELAY_MS => {
                    self.query.processing_delay_ms = Self::parse_number(ENV_DELAY_MS, &value)?
                }
                ENV_LOOKBACK_DAYS => {
                    self.generator.lookback_days = Self::parse_number(ENV_LOOKBACK_DAYS, &value)?
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Configuration, AstroGuardError> {
        let config = Configuration {
            generator: self.generator,
            query: self.query,
            output: self.output,
            alerts: self.alerts,
            runtime: self.runtime,
        };

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

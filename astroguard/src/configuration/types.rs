//! Configuration type definitions
//!
//! Defines the configuration sections and the on-disk file schema. Every
//! section carries `#[serde(default)]` so partial files are accepted.

use crate::errors::AstroGuardError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Generator {
    pub event_count: usize,
    pub lookback_days: u32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub processing_delay_ms: u64,
    pub carry_over_context: bool,
}

impl Query {
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Output {
    pub verbose: bool,
    pub quiet: bool,
    pub no_header: bool,
    pub format: OutputFormat,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerts {
    pub risk_score_threshold: u8,
    pub brute_force_threshold: usize,
    pub max_high_risk_alerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Runtime {
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn all() -> Vec<OutputFormat> {
        vec![Self::Table, Self::Json, Self::Csv]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = AstroGuardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(AstroGuardError::InvalidOutputFormat {
                format: s.to_string(),
                valid_formats: OutputFormat::all()
                    .iter()
                    .map(|f| f.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

/// Shape of a YAML, JSON or TOML configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub generator: Generator,
    pub query: Query,
    pub output: Output,
    pub alerts: Alerts,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            event_count: 250,
            lookback_days: 30,
            seed: None,
        }
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            processing_delay_ms: 800,
            carry_over_context: true,
        }
    }
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            risk_score_threshold: 80,
            brute_force_threshold: 5,
            max_high_risk_alerts: 5,
        }
    }
}

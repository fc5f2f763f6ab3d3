//! Unified Configuration System
//!
//! Combines settings from multiple sources (CLI arguments, configuration
//! files, environment variables) into a single validated configuration
//! object shared by the generator, query session, alert detectors and
//! output layer.
//!
//! # Basic Usage
//!
//! ```rust
//! use astroguard::configuration::Configuration;
//!
//! let config = Configuration::builder()
//!     .from_cli_args(&["--count", "100", "--seed", "7", "--verbose"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.event_count(), 100);
//! assert_eq!(config.seed(), Some(7));
//! assert!(config.is_verbose());
//! ```

pub mod builder;
pub mod types;
pub mod validation;

pub use builder::ConfigurationBuilder;
pub use types::*;

use crate::errors::AstroGuardError;
use std::time::Duration;

/// Validated runtime configuration
///
/// # Examples
///
/// ```rust
/// use astroguard::configuration::Configuration;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Configuration::builder().build()?;
/// assert_eq!(config.event_count(), 250);
/// assert_eq!(config.processing_delay().as_millis(), 800);
/// assert!(config.carry_over_context());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub generator: Generator,
    pub query: Query,
    pub output: Output,
    pub alerts: Alerts,
    pub runtime: Runtime,
}

impl Configuration {
    /// Create a new builder for configuration
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<(), AstroGuardError> {
        self.validate_generator()?;
        self.validate_query()?;
        self.validate_alerts()?;
        self.validate_output_config()?;
        Ok(())
    }

    pub fn event_count(&self) -> usize {
        self.generator.event_count
    }

    pub fn seed(&self) -> Option<u64> {
        self.generator.seed
    }

    pub fn lookback_days(&self) -> u32 {
        self.generator.lookback_days
    }

    pub fn processing_delay(&self) -> Duration {
        self.query.processing_delay()
    }

    pub fn carry_over_context(&self) -> bool {
        self.query.carry_over_context
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.verbose
    }

    /// Check if quiet output is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.quiet
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format
    }

    /// Sections that round-trip through a configuration file
    pub fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            generator: self.generator.clone(),
            query: self.query.clone(),
            output: self.output.clone(),
            alerts: self.alerts.clone(),
        }
    }
}

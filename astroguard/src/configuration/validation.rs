//! Configuration validation logic
//!
//! Each check covers one section so failures point at the offending value.

use super::Configuration;
use crate::errors::AstroGuardError;

pub const MAX_EVENT_COUNT: usize = 100_000;
pub const MAX_PROCESSING_DELAY_MS: u64 = 10_000;

impl Configuration {
    /// Validate generator sizing
    pub fn validate_generator(&self) -> Result<(), AstroGuardError> {
        if self.generator.event_count > MAX_EVENT_COUNT {
            return Err(AstroGuardError::config(format!(
                "event_count must be at most {}, got {}",
                MAX_EVENT_COUNT, self.generator.event_count
            )));
        }
        if self.generator.lookback_days == 0 {
            return Err(AstroGuardError::config("lookback_days must be at least 1"));
        }
        Ok(())
    }

    /// Validate the simulated processing delay
    pub fn validate_query(&self) -> Result<(), AstroGuardError> {
        if self.query.processing_delay_ms > MAX_PROCESSING_DELAY_MS {
            return Err(AstroGuardError::config(format!(
                "processing_delay_ms must be at most {}",
                MAX_PROCESSING_DELAY_MS
            )));
        }
        Ok(())
    }

    /// Validate alert thresholds
    pub fn validate_alerts(&self) -> Result<(), AstroGuardError> {
        if self.alerts.risk_score_threshold > 100 {
            return Err(AstroGuardError::config(
                "risk_score_threshold must be between 0 and 100",
            ));
        }
        if self.alerts.brute_force_threshold == 0 {
            return Err(AstroGuardError::config(
                "brute_force_threshold must be at least 1",
            ));
        }
        Ok(())
    }

    /// Validate output configuration
    pub fn validate_output_config(&self) -> Result<(), AstroGuardError> {
        if self.output.verbose && self.output.quiet {
            return Err(AstroGuardError::config(
                "Cannot specify both verbose and quiet modes",
            ));
        }
        Ok(())
    }
}

//! Unified error types for astroguard
//!
//! The generator and query processor never fail; every error here comes from
//! the layers around them: configuration, file IO and report rendering.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstroGuardError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid report kind: {kind}. Valid kinds: {valid_kinds:?}")]
    InvalidReportKind {
        kind: String,
        valid_kinds: Vec<String>,
    },

    #[error("Invalid output format: {format}. Valid formats: {valid_formats:?}")]
    InvalidOutputFormat {
        format: String,
        valid_formats: Vec<String>,
    },

    #[error("Export failed: {message}")]
    ExportError { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AstroGuardError {
    pub fn config(message: impl Into<String>) -> Self {
        AstroGuardError::ConfigError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AstroGuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefix_config_errors() {
        let error = AstroGuardError::config("event_count too large");

        assert_eq!(
            error.to_string(),
            "Configuration error: event_count too large"
        );
    }

    #[test]
    fn should_list_valid_kinds_in_message() {
        let error = AstroGuardError::InvalidReportKind {
            kind: "weekly".to_string(),
            valid_kinds: vec!["executive".to_string(), "threat".to_string()],
        };

        let message = error.to_string();
        assert!(message.contains("weekly"));
        assert!(message.contains("executive"));
    }

    #[test]
    fn should_wrap_io_errors() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AstroGuardError = io_error.into();

        assert!(matches!(error, AstroGuardError::Io(_)));
        assert_eq!(error.to_string(), "missing");
    }
}

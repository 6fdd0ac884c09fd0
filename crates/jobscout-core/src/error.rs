//! Core error types for the Jobscout pipeline.
//!
//! This module defines the central error type shared by the crates of the
//! workspace, plus the configuration error that every component raises
//! before any network work is attempted.

use thiserror::Error;

/// Central error type for Jobscout operations that are not owned by a
/// more specific subsystem error.
#[derive(Error, Debug)]
pub enum JobscoutError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation was cancelled by the caller
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
///
/// These fail fast: no network call is attempted once one has been raised.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Raised when a caller-issued cancellation signal is observed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Result type alias using `JobscoutError`.
pub type Result<T> = std::result::Result<T, JobscoutError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JobscoutError::Validation("empty title".to_string());
        assert_eq!(err.to_string(), "validation error: empty title");

        let err = ConfigError::invalid("search.page_size", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config value for search.page_size: must be at least 1"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let err: JobscoutError = config_err.into();
        assert!(matches!(err, JobscoutError::Config(_)));
    }

    #[test]
    fn test_cancelled_is_transparent() {
        let err: JobscoutError = Cancelled.into();
        assert_eq!(err.to_string(), "operation cancelled");
    }
}

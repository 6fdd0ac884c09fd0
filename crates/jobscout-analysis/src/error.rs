//! Error types for listing analysis.

use jobscout_core::ErrorClass;
use std::time::Duration;
use thiserror::Error;

/// Why a single analysis call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Timeouts, dropped connections, 5xx and overload responses
    #[error("transient provider failure ({provider}): {message}")]
    Transient {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {provider}")]
    RateLimited {
        /// Provider name
        provider: String,
        /// Provider-supplied wait, if any
        retry_after: Option<Duration>,
    },

    /// Invalid API key or authentication failure
    #[error("authentication failed for {provider}: {message}")]
    AuthFailure {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The reply did not have the expected structure
    #[error("malformed response from {provider}: {message}")]
    MalformedResponse {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The provider rejected the request itself
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be created
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl AnalysisError {
    /// Classification used by the retry policy.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transient { .. } => ErrorClass::Transient,
            Self::RateLimited { retry_after, .. } => ErrorClass::Throttled {
                retry_after: *retry_after,
            },
            Self::AuthFailure { .. }
            | Self::MalformedResponse { .. }
            | Self::InvalidRequest(_)
            | Self::Client(_) => ErrorClass::Fatal,
        }
    }

    pub(crate) fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::AuthFailure {
            provider: "anthropic".to_string(),
            message: "invalid x-api-key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed for anthropic: invalid x-api-key"
        );
    }

    #[test]
    fn test_only_transient_and_throttled_are_retryable() {
        let transient = AnalysisError::Transient {
            provider: "anthropic".to_string(),
            message: "overloaded".to_string(),
        };
        assert_eq!(transient.class(), ErrorClass::Transient);

        let throttled = AnalysisError::RateLimited {
            provider: "anthropic".to_string(),
            retry_after: None,
        };
        assert_eq!(throttled.class(), ErrorClass::Throttled { retry_after: None });

        assert_eq!(
            AnalysisError::malformed("anthropic", "no separator").class(),
            ErrorClass::Fatal
        );
        assert_eq!(
            AnalysisError::InvalidRequest("max_tokens".to_string()).class(),
            ErrorClass::Fatal
        );
    }
}

//! Common utilities shared across HTTP providers.

use crate::error::{AnalysisError, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;

/// Build a standard HTTP client with common timeout settings.
///
/// # Arguments
/// * `timeout_secs` - Timeout in seconds (defaults to 60 if not specified)
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn build_http_client(timeout_secs: Option<u64>) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.unwrap_or(60)))
        .build()
        .map_err(|e| AnalysisError::Client(e.to_string()))
}

/// Map a failed request (no HTTP status) to an analysis error.
///
/// Network-level failures, timeouts included, are treated as transient.
#[must_use]
pub fn request_error(provider: &str, error: &reqwest::Error) -> AnalysisError {
    if error.is_decode() && !error.is_timeout() {
        AnalysisError::malformed(provider, error.to_string())
    } else {
        AnalysisError::Transient {
            provider: provider.to_string(),
            message: error.to_string(),
        }
    }
}

/// Read a `Retry-After` header given in whole seconds.
#[must_use]
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Some(30)).is_ok());
        assert!(build_http_client(None).is_ok());
    }

    #[test]
    fn test_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("20"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(20)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }
}

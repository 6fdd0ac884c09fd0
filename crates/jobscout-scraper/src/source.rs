//! The boundary to an external job-listing provider.
//!
//! A [`SourceClient`] fetches exactly one page and reports how it failed.
//! Retries, rate limiting and fallback all live in [`crate::Scraper`].

use crate::params::SearchParams;
use async_trait::async_trait;
use jobscout_core::{ErrorClass, RawListing};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single page request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Timeouts, connection resets, 5xx responses
    #[error("transient source failure: {0}")]
    Transient(String),

    /// The provider asked us to slow down
    #[error("rate limited by source{}", retry_hint(.retry_after))]
    RateLimited {
        /// Provider-supplied wait, if any
        retry_after: Option<Duration>,
    },

    /// Retrying cannot help
    #[error("fatal source failure: {0}")]
    Fatal(String),
}

impl SourceError {
    /// Classification used by the retry policy.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transient(_) => ErrorClass::Transient,
            Self::RateLimited { retry_after } => ErrorClass::Throttled {
                retry_after: *retry_after,
            },
            Self::Fatal(_) => ErrorClass::Fatal,
        }
    }
}

#[allow(clippy::ref_option)]
fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|wait| format!(" (retry after {}s)", wait.as_secs()))
        .unwrap_or_default()
}

/// Fetches one page of raw listings from an external provider.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch page `page_index` (zero-based) for `params`.
    async fn fetch_page(
        &self,
        params: &SearchParams,
        page_index: usize,
    ) -> Result<Vec<RawListing>, SourceError>;

    /// Largest page size the provider serves.
    fn max_page_size(&self) -> usize;

    /// Short identifier used in logs.
    fn source_id(&self) -> &str;
}

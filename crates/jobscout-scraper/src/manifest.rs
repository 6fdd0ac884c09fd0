use serde::{Deserialize, Serialize};

/// Summary of one [`crate::Scraper::fetch`] call.
///
/// Counts only work that was actually performed. Built once per fetch and
/// never modified after it is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchManifest {
    /// `max_results` of the request
    pub requested: usize,
    /// Raw listings received from the source
    pub fetched: usize,
    /// Repeats dropped by identifier
    pub deduplicated: usize,
    /// Raw listings missing a required field
    pub rejected: usize,
    /// Valid listings dropped by the company filter
    pub filtered: usize,
    /// Pages requested, including failed ones
    pub pages_attempted: usize,
    /// Pages that failed after retries
    pub pages_failed: usize,
    /// True if the fallback corpus replaced live results
    pub used_fallback: bool,
    /// True if the fetch stopped because of cancellation
    pub cancelled: bool,
}

impl FetchManifest {
    /// Start a manifest for a request of `requested` listings.
    #[must_use]
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }
}

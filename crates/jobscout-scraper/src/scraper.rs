//! Paginated, rate-gated listing acquisition.
//!
//! The [`Scraper`] fetches pages strictly in order, retries transient page
//! failures, normalizes and deduplicates what comes back, and substitutes
//! the fallback corpus when live acquisition produced nothing.

use crate::error::Result;
use crate::fallback::FallbackCorpus;
use crate::filter::ListingFilter;
use crate::manifest::FetchManifest;
use crate::params::SearchParams;
use crate::source::{SourceClient, SourceError};
use jobscout_core::{
    CancellationToken, Listing, ListingId, ProgressEvent, ProgressReporter, RateGate, RawListing,
    RetryError, RetryPolicy,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Where a fetch currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    /// Pages are still being requested
    Fetching,
    /// Live pages produced at least one listing
    Succeeded,
    /// Live pages produced nothing; the fallback corpus is used
    Degraded,
    /// The cancellation signal stopped pagination
    Interrupted,
}

impl FetchState {
    fn settle(self, collected: usize) -> Self {
        match self {
            Self::Fetching if collected == 0 => Self::Degraded,
            Self::Fetching => Self::Succeeded,
            other => other,
        }
    }
}

/// Turns search parameters into a deduplicated sequence of listings.
pub struct Scraper {
    source: Arc<dyn SourceClient>,
    gate: Arc<RateGate>,
    retry: RetryPolicy,
    fallback: Arc<FallbackCorpus>,
}

impl Scraper {
    /// Create a scraper over `source`, gated by `gate`.
    ///
    /// Uses the default retry policy and the bundled fallback corpus.
    #[must_use]
    pub fn new(source: Arc<dyn SourceClient>, gate: Arc<RateGate>) -> Self {
        Self {
            source,
            gate,
            retry: RetryPolicy::default(),
            fallback: FallbackCorpus::bundled(),
        }
    }

    /// Set the retry policy applied to each page.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the fallback corpus.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<FallbackCorpus>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Fetch up to `params.max_results` listings.
    ///
    /// Only invalid parameters produce an error, and they do so before any
    /// request is made. Provider failures end up in the manifest or in
    /// fallback data.
    pub async fn fetch(
        &self,
        params: &SearchParams,
        cancel: &CancellationToken,
        progress: &ProgressReporter,
    ) -> Result<(Vec<Listing>, FetchManifest)> {
        params.validate(self.source.max_page_size())?;

        let filter = ListingFilter::from_params(params);
        let pages = params.page_count();
        let mut manifest = FetchManifest::new(params.max_results);
        let mut listings: Vec<Listing> = Vec::with_capacity(params.max_results);
        let mut seen: HashSet<ListingId> = HashSet::new();
        let mut state = FetchState::Fetching;

        tracing::info!(
            "Fetching up to {} listings from {} ({} page(s) of {})",
            params.max_results,
            self.source.source_id(),
            pages,
            params.page_size
        );

        for page in 0..pages {
            if cancel.is_cancelled() {
                state = FetchState::Interrupted;
                break;
            }
            manifest.pages_attempted += 1;

            let outcome = self
                .retry
                .run(cancel, SourceError::class, move |_attempt| async move {
                    self.gate.acquire().await;
                    self.source.fetch_page(params, page).await
                })
                .await;

            let raw = match outcome {
                Ok(raw) => raw,
                Err(RetryError::Cancelled) => {
                    tracing::info!("Fetch cancelled before page {}", page);
                    state = FetchState::Interrupted;
                    break;
                }
                Err(RetryError::Fatal { error, .. }) => {
                    tracing::warn!("Page {} failed fatally, stopping pagination: {}", page, error);
                    manifest.pages_failed += 1;
                    progress.emit(ProgressEvent::PageFailed {
                        page,
                        reason: error.to_string(),
                    });
                    break;
                }
                Err(RetryError::Exhausted { error, attempts }) => {
                    tracing::warn!(
                        "Page {} failed after {} attempt(s), skipping: {}",
                        page,
                        attempts,
                        error
                    );
                    manifest.pages_failed += 1;
                    progress.emit(ProgressEvent::PageFailed {
                        page,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            let received = raw.len();
            manifest.fetched += received;
            collect_page(
                raw,
                &filter,
                params.max_results,
                &mut seen,
                &mut listings,
                &mut manifest,
            );

            tracing::debug!(
                "Page {}: {} received, {} collected",
                page,
                received,
                listings.len()
            );
            progress.emit(ProgressEvent::PageFetched {
                page,
                received,
                collected: listings.len(),
            });

            if listings.len() >= params.max_results {
                break;
            }
            if received < params.page_size {
                tracing::debug!("Page {} was short, treating it as the last page", page);
                break;
            }
        }

        match state.settle(listings.len()) {
            FetchState::Degraded => {
                listings = self.fallback.select(&filter, params.max_results);
                manifest.used_fallback = true;
                tracing::warn!(
                    "No live listings collected, using {} fallback listing(s)",
                    listings.len()
                );
                progress.emit(ProgressEvent::FallbackUsed {
                    listings: listings.len(),
                });
            }
            FetchState::Interrupted => {
                manifest.cancelled = true;
                tracing::info!("Fetch interrupted with {} listing(s)", listings.len());
            }
            FetchState::Succeeded | FetchState::Fetching => {
                tracing::info!(
                    "Fetched {} listing(s) ({} rejected, {} duplicate, {} filtered, {} failed page(s))",
                    listings.len(),
                    manifest.rejected,
                    manifest.deduplicated,
                    manifest.filtered,
                    manifest.pages_failed
                );
            }
        }

        Ok((listings, manifest))
    }
}

/// Validate, deduplicate and filter one page, in that order.
fn collect_page(
    raw: Vec<RawListing>,
    filter: &ListingFilter,
    max_results: usize,
    seen: &mut HashSet<ListingId>,
    listings: &mut Vec<Listing>,
    manifest: &mut FetchManifest,
) {
    for raw in raw {
        if listings.len() >= max_results {
            break;
        }

        let listing = match Listing::from_raw(raw) {
            Ok(listing) => listing,
            Err(reason) => {
                tracing::debug!("Rejected listing: {}", reason);
                manifest.rejected += 1;
                continue;
            }
        };

        if !seen.insert(listing.id.clone()) {
            manifest.deduplicated += 1;
            continue;
        }

        if !filter.allows_company(&listing) {
            manifest.filtered += 1;
            continue;
        }

        listings.push(listing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_state_settle() {
        assert_eq!(FetchState::Fetching.settle(0), FetchState::Degraded);
        assert_eq!(FetchState::Fetching.settle(3), FetchState::Succeeded);
        assert_eq!(FetchState::Interrupted.settle(0), FetchState::Interrupted);
    }
}

//! Bundled synthetic listings used when live acquisition yields nothing.

use crate::filter::ListingFilter;
use jobscout_core::{Listing, RawListing};
use once_cell::sync::Lazy;
use std::sync::Arc;

const BUNDLED_JSON: &str = include_str!("../data/fallback_listings.json");

static BUNDLED: Lazy<Arc<FallbackCorpus>> = Lazy::new(|| {
    Arc::new(FallbackCorpus::from_json(BUNDLED_JSON).unwrap_or_else(|e| {
        tracing::error!("Bundled fallback corpus is unreadable: {}", e);
        FallbackCorpus::default()
    }))
});

/// A static set of listings, filtered with the same predicate as live search.
#[derive(Debug, Clone, Default)]
pub struct FallbackCorpus {
    listings: Vec<Listing>,
}

impl FallbackCorpus {
    /// Build a corpus from already validated listings.
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Parse a JSON array of raw listings. Invalid entries are skipped.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: Vec<RawListing> = serde_json::from_str(json)?;
        let listings = raw
            .into_iter()
            .filter_map(|raw| match Listing::from_raw(raw) {
                Ok(listing) => Some(listing),
                Err(reason) => {
                    tracing::warn!("Skipping fallback entry: {}", reason);
                    None
                }
            })
            .collect();
        Ok(Self { listings })
    }

    /// The corpus shipped with the crate.
    #[must_use]
    pub fn bundled() -> Arc<Self> {
        Arc::clone(&BUNDLED)
    }

    /// Every listing in the corpus.
    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// True if the corpus holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Listings accepted by `filter`, in corpus order, at most `limit`.
    #[must_use]
    pub fn select(&self, filter: &ListingFilter, limit: usize) -> Vec<Listing> {
        self.listings
            .iter()
            .filter(|listing| filter.matches(listing))
            .take(limit)
            .cloned()
            .collect()
    }
}

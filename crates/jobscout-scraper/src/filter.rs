#![allow(clippy::must_use_candidate)]

//! The matching predicate shared by live search and the fallback corpus.

use crate::params::{CompanyFilter, SearchParams};
use jobscout_core::Listing;

/// Decides whether a listing satisfies the search criteria.
///
/// A listing passes when its company is allowed, any keyword phrase has all
/// of its words in the title or description, and its location is compatible
/// with the location query. Blank criteria always pass.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    phrases: Vec<Vec<String>>,
    location_terms: Vec<String>,
    companies: CompanyFilter,
}

impl ListingFilter {
    /// Build the predicate for `params`.
    pub fn from_params(params: &SearchParams) -> Self {
        let phrases = params
            .keywords
            .iter()
            .map(|phrase| {
                phrase
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect();

        let location_terms = params
            .location
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|term| term.trim().to_lowercase())
            .filter(|term| term.chars().count() >= 2)
            .collect();

        Self {
            phrases,
            location_terms,
            companies: params.companies.clone(),
        }
    }

    /// Full predicate.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.allows_company(listing) && self.matches_keywords(listing) && self.matches_location(listing)
    }

    /// Company include/exclude check only.
    pub fn allows_company(&self, listing: &Listing) -> bool {
        self.companies.allows(&listing.company)
    }

    /// True if any keyword phrase matches the title or description.
    pub fn matches_keywords(&self, listing: &Listing) -> bool {
        if self.phrases.is_empty() {
            return true;
        }

        let haystack = format!("{} {}", listing.title, listing.description).to_lowercase();
        self.phrases
            .iter()
            .any(|words| words.iter().all(|word| haystack.contains(word.as_str())))
    }

    /// Remote listings and listings without a location always match.
    pub fn matches_location(&self, listing: &Listing) -> bool {
        if self.location_terms.is_empty() {
            return true;
        }

        let Some(location) = listing.location.as_deref() else {
            return true;
        };
        let location = location.to_lowercase();

        location.contains("remote")
            || self
                .location_terms
                .iter()
                .any(|term| location.contains(term.as_str()))
    }
}

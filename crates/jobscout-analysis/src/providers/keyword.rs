//! Offline keyword-overlap analyzer.
//!
//! Scores a listing by the share of its significant terms that also appear
//! in the profile. Deterministic and network-free, so it doubles as the
//! analyzer of choice when no provider key is configured.

use crate::client::{Analysis, AnalysisClient};
use crate::error::Result;
use async_trait::async_trait;
use jobscout_core::{Listing, Profile};
use std::collections::BTreeSet;

const PROVIDER: &str = "keyword";

/// Terms listed in the rationale.
const RATIONALE_TERMS: usize = 5;

const STOPWORDS: &[&str] = &[
    "and", "are", "for", "from", "have", "our", "that", "the", "this", "with", "will", "you",
    "your", "their", "they", "who", "all", "any", "can", "has", "into", "more", "not", "work",
    "team", "role", "job", "years", "experience", "including", "across", "about", "also",
];

/// Deterministic analyzer based on term overlap.
#[derive(Debug, Clone, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    /// Create a new keyword analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score `listing` against `profile` without any I/O.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(profile: &Profile, listing: &Listing) -> Analysis {
        let profile_terms = terms(profile.as_str());
        let listing_terms = terms(&format!("{} {}", listing.title, listing.description));

        if listing_terms.is_empty() {
            return Analysis::scored(0.0, "Listing has no significant terms to compare");
        }

        let matched: Vec<&str> = listing_terms
            .iter()
            .filter(|term| profile_terms.contains(*term))
            .map(String::as_str)
            .collect();

        let score = 100.0 * matched.len() as f64 / listing_terms.len() as f64;
        let rationale = if matched.is_empty() {
            format!("No overlap with {} listing terms", listing_terms.len())
        } else {
            format!(
                "Matched {} of {} listing terms: {}",
                matched.len(),
                listing_terms.len(),
                matched
                    .iter()
                    .take(RATIONALE_TERMS)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        Analysis::scored(score.round(), rationale)
    }
}

#[async_trait]
impl AnalysisClient for KeywordAnalyzer {
    async fn analyze(&self, profile: &Profile, listing: &Listing) -> Result<Analysis> {
        Ok(Self::score(profile, listing))
    }

    fn provider_id(&self) -> &str {
        PROVIDER
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() >= 3 || matches!(word.as_str(), "go" | "c#" | "c++"))
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScoreReading;
    use jobscout_core::RawListing;

    fn listing(title: &str, description: &str) -> Listing {
        Listing::from_raw(RawListing {
            title: Some(title.into()),
            company: Some("Acme".into()),
            description: Some(description.into()),
            ..RawListing::default()
        })
        .expect("valid listing")
    }

    fn value(analysis: &Analysis) -> f64 {
        match analysis.score {
            ScoreReading::Value(v) => v,
            ScoreReading::Unparsable(_) => panic!("keyword analyzer always scores"),
        }
    }

    #[test]
    fn test_full_and_zero_overlap() {
        let profile = Profile::new("Rust engineer building Kubernetes services");
        let full = KeywordAnalyzer::score(&profile, &listing("Rust Engineer", "Kubernetes services"));
        assert!((value(&full) - 100.0).abs() < f64::EPSILON);

        let none = KeywordAnalyzer::score(&profile, &listing("Chef", "Pastry kitchen"));
        assert!(value(&none).abs() < f64::EPSILON);
        assert!(none.rationale.starts_with("No overlap"));
    }

    #[test]
    fn test_partial_overlap_is_deterministic() {
        let profile = Profile::new("Python SQL dashboards");
        let listing = listing("Data Analyst", "SQL Tableau dashboards");

        let first = KeywordAnalyzer::score(&profile, &listing);
        let second = KeywordAnalyzer::score(&profile, &listing);
        assert_eq!(first, second);

        // terms: analyst, dashboards, data, sql, tableau -> 2 of 5
        assert!((value(&first) - 40.0).abs() < f64::EPSILON);
        assert_eq!(first.rationale, "Matched 2 of 5 listing terms: dashboards, sql");
    }

    #[test]
    fn test_short_language_names_kept() {
        let found = terms("Go, C++ and C# developers");
        assert!(found.contains("go"));
        assert!(found.contains("c++"));
        assert!(found.contains("c#"));
        assert!(!found.contains("and"));
    }

    #[tokio::test]
    async fn test_analyze_never_fails() {
        let analyzer = KeywordAnalyzer::new();
        let result = analyzer
            .analyze(&Profile::new("anything"), &listing("Engineer", "x"))
            .await;
        assert!(result.is_ok());
        assert_eq!(analyzer.provider_id(), "keyword");
    }
}

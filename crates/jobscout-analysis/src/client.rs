//! The analysis provider boundary.

use crate::error::Result;
use async_trait::async_trait;
use jobscout_core::{Listing, Profile};
use serde::{Deserialize, Serialize};

/// Trait for services that score a profile against a listing.
///
/// Implementations must be thread-safe (Send + Sync); the matching engine
/// calls them from several tasks at once.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Score one (profile, listing) pair.
    ///
    /// # Errors
    /// Returns a classified error; the caller decides whether to retry.
    async fn analyze(&self, profile: &Profile, listing: &Listing) -> Result<Analysis>;

    /// Get the unique identifier for this provider.
    fn provider_id(&self) -> &str;
}

/// A well-formed analysis reply.
///
/// The score is kept exactly as read. Range checks happen in the matching
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Score as the provider reported it
    pub score: ScoreReading,
    /// Why the provider gave that score
    pub rationale: String,
}

impl Analysis {
    /// An analysis with a numeric score.
    #[must_use]
    pub fn scored(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score: ScoreReading::Value(score),
            rationale: rationale.into(),
        }
    }
}

/// The score field of a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReading {
    /// A number, possibly outside 0 to 100
    Value(f64),
    /// Present but not a number; holds the raw text
    Unparsable(String),
}

//! Per-listing match outcomes.

use jobscout_analysis::{Analysis, ScoreReading};
use jobscout_core::ListingId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest possible score.
pub const MAX_SCORE: u8 = 100;

/// Why a listing has no score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Transient failures outlasted the retry policy
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Last error
        message: String,
    },
    /// The provider rejected our credentials
    AuthFailure {
        /// Provider message
        message: String,
    },
    /// The provider reply had no usable structure
    MalformedResponse {
        /// Parser message
        message: String,
    },
    /// The provider rejected the request
    Rejected {
        /// Provider message
        message: String,
    },
    /// The run was cancelled before this listing finished
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts, message } => {
                write!(f, "gave up after {attempts} attempt(s): {message}")
            }
            Self::AuthFailure { message } => write!(f, "authentication failed: {message}"),
            Self::MalformedResponse { message } => write!(f, "malformed response: {message}"),
            Self::Rejected { message } => write!(f, "request rejected: {message}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Whether a listing was scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Analysis succeeded and `score` is meaningful
    Scored,
    /// Analysis failed; `score` is zero
    Failed(FailureReason),
}

/// The outcome of analyzing one listing.
///
/// Refers to its listing by identifier; the listing itself stays with the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Listing this result belongs to
    pub listing_id: ListingId,
    /// Position of the listing in the input sequence
    pub input_index: usize,
    /// Score in `0..=100`
    pub score: u8,
    /// Provider rationale, or the failure description
    pub rationale: String,
    /// Scored or failed
    pub status: MatchStatus,
}

impl MatchResult {
    /// Build a scored result, clamping and flagging a bad score.
    #[must_use]
    pub fn from_analysis(listing_id: ListingId, input_index: usize, analysis: Analysis) -> Self {
        let (score, flag) = normalize_score(&analysis.score);
        let rationale = match flag {
            Some(flag) => format!("{} [{flag}]", analysis.rationale),
            None => analysis.rationale,
        };

        Self {
            listing_id,
            input_index,
            score,
            rationale,
            status: MatchStatus::Scored,
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failed(listing_id: ListingId, input_index: usize, reason: FailureReason) -> Self {
        Self {
            listing_id,
            input_index,
            score: 0,
            rationale: reason.to_string(),
            status: MatchStatus::Failed(reason),
        }
    }

    /// True if the listing was scored.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.status == MatchStatus::Scored
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.status {
            MatchStatus::Scored => None,
            MatchStatus::Failed(reason) => Some(reason),
        }
    }
}

/// Map a score reading into `0..=100`.
///
/// Returns the score and, if it had to be adjusted, a note saying how.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize_score(reading: &ScoreReading) -> (u8, Option<String>) {
    match reading {
        ScoreReading::Value(value) if !value.is_finite() => {
            (0, Some(format!("score {value} is not finite, recorded as 0")))
        }
        ScoreReading::Value(value) => {
            let rounded = value.round();
            let clamped = rounded.clamp(0.0, f64::from(MAX_SCORE));
            let score = clamped as u8;
            if (clamped - rounded).abs() > f64::EPSILON {
                (score, Some(format!("score {value} out of range, clamped to {score}")))
            } else {
                (score, None)
            }
        }
        ScoreReading::Unparsable(raw) => (
            0,
            Some(format!("unparsable score {raw:?}, recorded as 0")),
        ),
    }
}

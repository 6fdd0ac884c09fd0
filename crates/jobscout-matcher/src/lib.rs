//! Jobscout Matcher - Bounded, fault-tolerant analysis of a listing batch.
//!
//! The [`MatchingEngine`] fans listings out to an
//! [`AnalysisClient`](jobscout_analysis::AnalysisClient) with at most
//! `concurrency` calls in flight, retries transient failures with the shared
//! retry policy, and ranks the results. Every input listing produces exactly
//! one [`MatchResult`]; failures are recorded, never dropped.
//!
//! Ranking puts scored results first by score descending, then failed ones.
//! Both groups keep input order among equals.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod engine;
pub mod ranking;
pub mod result;

// Re-export commonly used types
pub use engine::MatchingEngine;
pub use ranking::{is_ranked, rank};
pub use result::{FailureReason, MatchResult, MatchStatus};

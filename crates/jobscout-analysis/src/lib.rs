//! Jobscout Analysis - Scoring a candidate profile against one listing.
//!
//! This crate defines the [`AnalysisClient`] boundary to an external analysis
//! provider and ships two implementations: the Anthropic Messages API and an
//! offline keyword-overlap scorer.
//!
//! # Features
//!
//! - **Strict response model**: provider replies become an [`Analysis`] or a
//!   classified [`AnalysisError`], never an unchecked value
//! - **Two reply formats**: `score|reasons` lines and JSON objects, with or
//!   without code fences
//! - **Error classes**: transient, rate-limited and fatal failures map onto
//!   the shared retry policy
//!
//! # Example
//!
//! ```rust
//! use jobscout_analysis::{AnalysisClient, KeywordAnalyzer, ScoreReading};
//! use jobscout_core::{Listing, Profile, RawListing};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let listing = Listing::from_raw(RawListing {
//!     title: Some("Rust Engineer".into()),
//!     company: Some("Acme".into()),
//!     description: Some("Async Rust services on Kubernetes".into()),
//!     ..RawListing::default()
//! })?;
//! let profile = Profile::new("Five years of Rust and Kubernetes");
//!
//! let analysis = KeywordAnalyzer::new().analyze(&profile, &listing).await?;
//! assert!(matches!(analysis.score, ScoreReading::Value(_)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod prompt;
pub mod providers;
pub mod response;

// Re-export commonly used types
pub use client::{Analysis, AnalysisClient, ScoreReading};
pub use error::{AnalysisError, Result};
pub use providers::{AnthropicAnalyzer, KeywordAnalyzer};

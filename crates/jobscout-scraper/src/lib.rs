//! Jobscout Scraper - Listing acquisition with graceful degradation.
//!
//! This crate turns a set of search parameters into a deduplicated sequence
//! of validated listings. It owns pagination, rate limiting, retry with
//! backoff, and the decision to fall back to a bundled corpus when live
//! acquisition yields nothing.
//!
//! # Features
//!
//! - Sequential, rate-gated page fetching in page order
//! - Retry with exponential backoff for transient source failures
//! - Validation, filtering and deduplication of raw listings
//! - Bundled fallback corpus filtered with the same predicate as live search
//!
//! # Example
//!
//! ```rust,ignore
//! use jobscout_core::{CancellationToken, ProgressReporter, RateGate};
//! use jobscout_scraper::{LinkedInSource, Scraper, SearchParams};
//! use std::sync::Arc;
//!
//! let gate = Arc::new(RateGate::from(&config.rate_limit));
//! let source = LinkedInSource::new(&config.source, gate.clone())?;
//! let scraper = Scraper::new(Arc::new(source), gate);
//!
//! let params = SearchParams::new(["rust engineer"]).with_location("Remote");
//! let (listings, manifest) = scraper
//!     .fetch(&params, &CancellationToken::new(), &ProgressReporter::disabled())
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod fallback;
pub mod filter;
pub mod linkedin;
pub mod manifest;
pub mod params;
#[allow(missing_docs)]
pub mod parser;
pub mod scraper;
pub mod source;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use error::{Result, ScrapeError};
pub use fallback::FallbackCorpus;
pub use filter::ListingFilter;
pub use linkedin::LinkedInSource;
pub use manifest::FetchManifest;
pub use params::{CompanyFilter, SearchParams};
pub use scraper::Scraper;
pub use source::{SourceClient, SourceError};

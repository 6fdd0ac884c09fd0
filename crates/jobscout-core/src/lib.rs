//! Jobscout Core - Foundation crate for the Jobscout matching pipeline.
//!
//! This crate provides the shared listing types, error handling, configuration
//! management and the throttling utilities that the scraper and the matcher
//! both depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared listing types (`ListingId`, `RawListing`, `Listing`, `Profile`)
//! - [`retry`] - Exponential backoff with jitter, shared by every network call site
//! - [`rate_limit`] - Token-bucket gate for outgoing source requests
//! - [`progress`] - Progress events sent to whoever drives the pipeline
//!
//! # Example
//!
//! ```rust
//! use jobscout_core::{AppConfig, RetryPolicy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let policy = RetryPolicy::from(&config.retry);
//! assert_eq!(policy.max_attempts(), config.retry.retry_count + 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod progress;
pub mod rate_limit;
pub mod retry;
pub mod types;

// Re-export commonly used types
pub use config::{
    AnalysisConfig, AppConfig, RateLimitConfig, RetryConfig, SearchConfig, SourceConfig,
};
pub use error::{Cancelled, ConfigError, ConfigResult, JobscoutError, Result};
pub use progress::{ProgressEvent, ProgressReporter};
pub use rate_limit::RateGate;
pub use retry::{ErrorClass, RetryError, RetryPolicy};
pub use types::{Listing, ListingId, Profile, RawListing, RejectReason};

/// Cancellation signal threaded through every suspension point of the pipeline.
pub use tokio_util::sync::CancellationToken;

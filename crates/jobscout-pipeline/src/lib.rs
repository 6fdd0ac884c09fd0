//! Jobscout Pipeline - Fetch listings, match them against a profile, rank.
//!
//! [`Pipeline::run`] composes the scraper and the matching engine into one
//! call. Around it sit the two collaborators a caller needs: turning a resume
//! into a [`Profile`](jobscout_core::Profile) ([`extract`]) and turning ranked
//! results into rows for display or CSV ([`export`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use jobscout_analysis::KeywordAnalyzer;
//! use jobscout_core::{AppConfig, CancellationToken, ProgressReporter};
//! use jobscout_pipeline::{extract, Pipeline};
//! use jobscout_scraper::SearchParams;
//! use std::sync::Arc;
//!
//! let config = AppConfig::load_with_env()?;
//! let pipeline = Pipeline::from_config(&config, Arc::new(KeywordAnalyzer::new()))?;
//! let profile = extract::load_profile("resume.pdf".as_ref())?;
//! let params = SearchParams::from_config(&config.search, ["data engineer"]);
//!
//! let run = pipeline
//!     .run(&profile, &params, 5, &CancellationToken::new(), &ProgressReporter::disabled())
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod export;
pub mod extract;
pub mod pipeline;

// Re-export commonly used types
pub use error::{ExtractError, PipelineError, Result};
pub use export::{project_to_rows, summarize, write_csv, ExportRow, RunSummary};
pub use extract::{extract_profile, load_profile, PdfExtractor, PlainTextExtractor, TextExtractor};
pub use pipeline::{Pipeline, PipelineRun};

//! The coordinator: fetch, then match.

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};
use jobscout_analysis::AnalysisClient;
use jobscout_core::{
    AppConfig, CancellationToken, ConfigError, Listing, ProgressReporter, Profile, RateGate,
    RetryPolicy,
};
use jobscout_matcher::{MatchResult, MatchingEngine};
use jobscout_scraper::{FetchManifest, LinkedInSource, Scraper, SearchParams};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Identifier for log correlation and export naming.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Ranked results, one per listing.
    pub results: Vec<MatchResult>,
    /// The listings that were matched, in fetch order.
    pub listings: Vec<Listing>,
    /// What the fetch stage actually did.
    pub manifest: FetchManifest,
}

impl PipelineRun {
    /// Look up the listing a result refers to.
    #[must_use]
    pub fn listing_for(&self, result: &MatchResult) -> Option<&Listing> {
        self.listings
            .get(result.input_index)
            .filter(|listing| listing.id == result.listing_id)
    }
}

/// Composes a [`Scraper`] and a [`MatchingEngine`].
pub struct Pipeline {
    scraper: Scraper,
    engine: MatchingEngine,
}

impl Pipeline {
    /// Create a pipeline from already-built stages.
    #[must_use]
    pub fn new(scraper: Scraper, engine: MatchingEngine) -> Self {
        Self { scraper, engine }
    }

    /// Build the LinkedIn-backed pipeline described by `config`.
    pub fn from_config(config: &AppConfig, analyzer: Arc<dyn AnalysisClient>) -> Result<Self> {
        config.validate()?;

        let gate = Arc::new(RateGate::from(&config.rate_limit));
        let retry = RetryPolicy::from(&config.retry);
        let source = LinkedInSource::new(&config.source, Arc::clone(&gate))?;

        let scraper = Scraper::new(Arc::new(source), gate).with_retry_policy(retry.clone());
        let engine = MatchingEngine::new(analyzer).with_retry_policy(retry);

        Ok(Self::new(scraper, engine))
    }

    /// Fetch listings for `params` and rank them against `profile`.
    ///
    /// Fails only on an empty profile, a zero `concurrency`, invalid search
    /// parameters, or a cancellation that was already raised on entry.
    /// Cancellation during the run yields a partial, consistent result
    /// instead of an error.
    pub async fn run(
        &self,
        profile: &Profile,
        params: &SearchParams,
        concurrency: usize,
        cancel: &CancellationToken,
        progress: &ProgressReporter,
    ) -> Result<PipelineRun> {
        if profile.is_blank() {
            return Err(PipelineError::EmptyProfile);
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let concurrency = NonZeroUsize::new(concurrency)
            .ok_or_else(|| ConfigError::invalid("concurrency", "must be at least 1"))?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!("Starting run {} for {:?}", run_id, params.keyword_query());

        let (listings, manifest) = self.scraper.fetch(params, cancel, progress).await?;
        let results = self
            .engine
            .match_all(profile, &listings, concurrency, cancel, progress)
            .await;

        tracing::info!(
            "Run {} finished: {} listing(s), {} result(s){}",
            run_id,
            listings.len(),
            results.len(),
            if manifest.used_fallback { ", fallback data" } else { "" }
        );

        Ok(PipelineRun {
            run_id,
            started_at,
            results,
            listings,
            manifest,
        })
    }
}

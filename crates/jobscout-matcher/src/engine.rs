//! Concurrency-bounded fan-out over an analysis client.

use crate::ranking::rank;
use crate::result::{FailureReason, MatchResult};
use futures::stream::{FuturesUnordered, StreamExt};
use jobscout_analysis::{AnalysisClient, AnalysisError};
use jobscout_core::{
    CancellationToken, Listing, ProgressEvent, ProgressReporter, Profile, RetryError, RetryPolicy,
};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Scores a batch of listings against one profile.
pub struct MatchingEngine {
    client: Arc<dyn AnalysisClient>,
    retry: RetryPolicy,
}

impl MatchingEngine {
    /// Create an engine with the default retry policy.
    #[must_use]
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the retry policy applied to each analysis call.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Analyze every listing and return ranked results.
    ///
    /// At most `concurrency` analyses are in flight at once. The output has
    /// exactly one result per input listing. Listings not finished when
    /// `cancel` fires are marked [`FailureReason::Cancelled`].
    pub async fn match_all(
        &self,
        profile: &Profile,
        listings: &[Listing],
        concurrency: NonZeroUsize,
        cancel: &CancellationToken,
        progress: &ProgressReporter,
    ) -> Vec<MatchResult> {
        let total = listings.len();
        tracing::info!(
            "Analyzing {} listing(s) with {} (concurrency {})",
            total,
            self.client.provider_id(),
            concurrency
        );

        let mut collector = Collector::new(total, progress);
        let mut in_flight = FuturesUnordered::new();

        for (index, listing) in listings.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Cancelled with {} listing(s) not started", total - index);
                break;
            }

            in_flight.push(self.analyze_one(profile, index, listing, cancel));

            // Respect concurrency limit
            while in_flight.len() >= concurrency.get() {
                if let Some(result) = in_flight.next().await {
                    collector.record(result);
                }
            }
        }

        // Collect remaining results
        while let Some(result) = in_flight.next().await {
            collector.record(result);
        }

        let results = rank(collector.finish(listings));

        let scored = results.iter().filter(|r| r.is_scored()).count();
        let failed = results.len() - scored;
        tracing::info!("Ranked {} scored and {} failed listing(s)", scored, failed);
        progress.emit(ProgressEvent::Ranked { scored, failed });

        results
    }

    /// Analyze one listing with retry. Never fails: errors become results.
    async fn analyze_one(
        &self,
        profile: &Profile,
        index: usize,
        listing: &Listing,
        cancel: &CancellationToken,
    ) -> MatchResult {
        let outcome = self
            .retry
            .run(cancel, AnalysisError::class, |_attempt| {
                self.client.analyze(profile, listing)
            })
            .await;

        let id = listing.id.clone();
        match outcome {
            Ok(analysis) => {
                let result = MatchResult::from_analysis(id, index, analysis);
                tracing::debug!("Scored {} at {}", result.listing_id, result.score);
                result
            }
            Err(RetryError::Cancelled) => MatchResult::failed(id, index, FailureReason::Cancelled),
            Err(RetryError::Fatal { error, attempts } | RetryError::Exhausted { error, attempts }) => {
                tracing::warn!("Analysis failed for {}: {}", listing.id, error);
                MatchResult::failed(id, index, failure_reason(error, attempts))
            }
        }
    }
}

fn failure_reason(error: AnalysisError, attempts: u32) -> FailureReason {
    match error {
        AnalysisError::AuthFailure { message, .. } => FailureReason::AuthFailure { message },
        AnalysisError::MalformedResponse { message, .. } => {
            FailureReason::MalformedResponse { message }
        }
        AnalysisError::InvalidRequest(message) | AnalysisError::Client(message) => {
            FailureReason::Rejected { message }
        }
        error @ (AnalysisError::Transient { .. } | AnalysisError::RateLimited { .. }) => {
            FailureReason::RetriesExhausted {
                attempts,
                message: error.to_string(),
            }
        }
    }
}

/// Results indexed by input position, filled as analyses complete.
struct Collector<'a> {
    slots: Vec<Option<MatchResult>>,
    completed: usize,
    progress: &'a ProgressReporter,
}

impl<'a> Collector<'a> {
    fn new(total: usize, progress: &'a ProgressReporter) -> Self {
        Self {
            slots: vec![None; total],
            completed: 0,
            progress,
        }
    }

    fn record(&mut self, result: MatchResult) {
        self.completed += 1;
        self.progress.emit(ProgressEvent::ListingAnalyzed {
            index: result.input_index,
            listing_id: result.listing_id.clone(),
            scored: result.is_scored(),
            completed: self.completed,
            total: self.slots.len(),
        });

        let index = result.input_index;
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(result);
        }
    }

    /// One result per listing; never-started listings are marked cancelled.
    fn finish(self, listings: &[Listing]) -> Vec<MatchResult> {
        self.slots
            .into_iter()
            .zip(listings)
            .enumerate()
            .map(|(index, (slot, listing))| {
                slot.unwrap_or_else(|| {
                    MatchResult::failed(listing.id.clone(), index, FailureReason::Cancelled)
                })
            })
            .collect()
    }
}

//! Progress events emitted while the pipeline runs.
//!
//! The pipeline never owns presentation state. Whoever drives it may hand in
//! a channel and render the events however it likes; a missing or closed
//! channel is silently ignored.

use crate::types::ListingId;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One step of pipeline progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A page of listings came back from the source
    PageFetched {
        /// Zero-based page index
        page: usize,
        /// Raw listings on the page
        received: usize,
        /// Valid listings collected so far
        collected: usize,
    },
    /// A page could not be fetched and was skipped
    PageFailed {
        /// Zero-based page index
        page: usize,
        /// Why the page failed
        reason: String,
    },
    /// Live acquisition produced nothing and the fallback corpus was used
    FallbackUsed {
        /// Fallback listings substituted
        listings: usize,
    },
    /// One listing finished analysis (successfully or not)
    ListingAnalyzed {
        /// Position of the listing in the fetch order
        index: usize,
        /// The analyzed listing
        listing_id: ListingId,
        /// True if a score was produced
        scored: bool,
        /// Listings finished so far
        completed: usize,
        /// Listings in the batch
        total: usize,
    },
    /// Final ranking is done
    Ranked {
        /// Listings with a score
        scored: usize,
        /// Listings whose analysis failed
        failed: usize,
    },
}

/// Sending half of a progress channel.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    /// Report into an existing channel.
    #[must_use]
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A reporter that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create a reporter together with the receiving end.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Send an event, ignoring a closed or absent channel.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_events() {
        let (reporter, mut rx) = ProgressReporter::channel();
        reporter.emit(ProgressEvent::FallbackUsed { listings: 4 });

        assert_eq!(
            rx.try_recv().expect("event delivered"),
            ProgressEvent::FallbackUsed { listings: 4 }
        );
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (reporter, rx) = ProgressReporter::channel();
        drop(rx);
        reporter.emit(ProgressEvent::Ranked {
            scored: 1,
            failed: 0,
        });
        ProgressReporter::disabled().emit(ProgressEvent::Ranked {
            scored: 0,
            failed: 0,
        });
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&ProgressEvent::PageFailed {
            page: 2,
            reason: "timeout".to_string(),
        })
        .expect("serialize event");
        assert_eq!(json, r#"{"type":"page_failed","page":2,"reason":"timeout"}"#);
    }
}

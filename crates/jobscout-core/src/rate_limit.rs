//! Token-bucket gate for outgoing requests.
//!
//! The bucket starts full, holds at most `requests_per_interval` tokens and
//! refills continuously. The bucket state is the only mutable state shared
//! between requests and lives behind a single async mutex.

use crate::config::RateLimitConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Rate gate shared by every request to one source.
#[derive(Debug)]
pub struct RateGate {
    bucket: Mutex<Bucket>,
    capacity: f64,
    secs_per_token: f64,
}

impl RateGate {
    /// Allow `requests_per_interval` requests per `interval`.
    ///
    /// A zero request count is treated as one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(requests_per_interval: u32, interval: Duration) -> Self {
        let capacity = f64::from(requests_per_interval.max(1));
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            secs_per_token: interval.as_secs_f64() / capacity,
        }
    }

    /// Minimum spacing between requests once the bucket is drained.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(self.secs_per_token)
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                self.refill(&mut bucket);
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) * self.secs_per_token)
            };

            tracing::debug!("Rate gate closed, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Take a token only if one is available right now.
    pub async fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        if self.secs_per_token > 0.0 {
            bucket.tokens = (bucket.tokens + elapsed / self.secs_per_token).min(self.capacity);
        } else {
            bucket.tokens = self.capacity;
        }
        bucket.last_refill = now;
    }
}

impl From<&RateLimitConfig> for RateGate {
    fn from(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_interval, config.interval())
    }
}

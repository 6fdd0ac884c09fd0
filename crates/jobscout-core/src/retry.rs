//! Retry with exponential backoff and jitter.
//!
//! Both network call sites of the pipeline (listing pages and listing
//! analyses) go through [`RetryPolicy::run`]. The caller supplies a
//! classifier that maps its error type onto an [`ErrorClass`]; only
//! transient and throttled failures are retried.

use crate::config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Throttled failures wait this many times longer than ordinary transient ones.
const THROTTLE_BACKOFF_MULTIPLIER: u32 = 3;

/// How a failed attempt should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to resolve on retry (timeouts, 5xx)
    Transient,
    /// The provider asked us to slow down, optionally saying for how long
    Throttled {
        /// Provider-supplied wait, if any
        retry_after: Option<Duration>,
    },
    /// Retrying cannot help
    Fatal,
}

/// Outcome of a call that did not succeed.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// A non-retryable failure ended the call early
    #[error("non-retryable failure after {attempts} attempt(s): {error}")]
    Fatal {
        /// The failure
        error: E,
        /// Attempts made
        attempts: u32,
    },

    /// Every allowed attempt failed
    #[error("giving up after {attempts} attempt(s): {error}")]
    Exhausted {
        /// The last failure
        error: E,
        /// Attempts made
        attempts: u32,
    },

    /// The cancellation signal fired before the call could succeed
    #[error("operation cancelled")]
    Cancelled,
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up (zero when cancelled).
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
            Self::Cancelled => 0,
        }
    }

    /// True if the call stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Backoff policy: `max_attempts`, `base_delay`, `jitter` and a delay cap.
///
/// The n-th retry waits `base_delay * 2^(n-1)`, capped at `max_delay` and
/// scaled by a random factor in `[1 - jitter, 1 + jitter]`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: f64,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` counts the first attempt and is at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration, jitter: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, 0.0)
    }

    /// Total attempts allowed, including the first one.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Un-jittered delay before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay)
    }

    /// Delay to apply after failed attempt number `attempt`, given its class.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, class: ErrorClass) -> Duration {
        let base = match class {
            ErrorClass::Throttled {
                retry_after: Some(wait),
            } => return wait.min(self.max_delay),
            ErrorClass::Throttled { retry_after: None } => self
                .backoff(attempt)
                .saturating_mul(THROTTLE_BACKOFF_MULTIPLIER),
            ErrorClass::Transient | ErrorClass::Fatal => self.backoff(attempt),
        };

        self.apply_jitter(base).min(self.max_delay)
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter == 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = rand::thread_rng().gen_range((1.0 - self.jitter)..=(1.0 + self.jitter));
        delay.mul_f64(factor)
    }

    /// Run `op` until it succeeds, fails fatally, exhausts the policy, or
    /// `cancel` fires.
    ///
    /// `op` receives the 1-based attempt number. Cancellation is checked
    /// before every attempt, while an attempt is in flight, and while
    /// waiting between attempts.
    pub async fn run<T, E, F, Fut, C>(
        &self,
        cancel: &CancellationToken,
        classify: C,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> ErrorClass,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RetryError::Cancelled),
                outcome = op(attempt) => outcome,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let class = classify(&error);
            if class == ErrorClass::Fatal {
                return Err(RetryError::Fatal {
                    error,
                    attempts: attempt,
                });
            }

            if attempt >= self.max_attempts {
                tracing::warn!(
                    "Giving up after {}/{} attempts: {}",
                    attempt,
                    self.max_attempts,
                    error
                );
                return Err(RetryError::Exhausted {
                    error,
                    attempts: attempt,
                });
            }

            let delay = self.delay_for(attempt, class);
            tracing::warn!(
                "Attempt {}/{} failed ({}), retrying in {:?}...",
                attempt,
                self.max_attempts,
                error,
                delay
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RetryError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.retry_count.saturating_add(1),
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
            config.backoff_jitter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            attempts,
            Duration::from_millis(100),
            Duration::from_secs(10),
            0.0,
        )
    }

    fn classify(error: &&'static str) -> ErrorClass {
        match *error {
            "fatal" => ErrorClass::Fatal,
            "slow down" => ErrorClass::Throttled { retry_after: None },
            _ => ErrorClass::Transient,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_millis(100),
            Duration::from_millis(350),
            0.0,
        );
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
    }

    #[test]
    fn test_throttled_waits_longer() {
        let policy = policy(3);
        let normal = policy.delay_for(1, ErrorClass::Transient);
        let throttled = policy.delay_for(1, ErrorClass::Throttled { retry_after: None });
        assert_eq!(throttled, normal * THROTTLE_BACKOFF_MULTIPLIER);

        let hinted = policy.delay_for(
            1,
            ErrorClass::Throttled {
                retry_after: Some(Duration::from_secs(2)),
            },
        );
        assert_eq!(hinted, Duration::from_secs(2));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy::new(
            3,
            Duration::from_millis(1000),
            Duration::from_secs(60),
            0.5,
        );
        for _ in 0..50 {
            let delay = policy.delay_for(1, ErrorClass::Transient);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_from_config_counts_first_attempt() {
        let config = RetryConfig {
            retry_count: 2,
            ..RetryConfig::default()
        };
        assert_eq!(RetryPolicy::from(&config).max_attempts(), 3);
        assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result = policy(3)
            .run(&cancel, classify, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err("timeout")
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.expect("third attempt succeeds"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_fatal() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result: Result<(), _> = policy(5)
            .run(&cancel, classify, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            })
            .await;

        let err = result.expect_err("fatal error");
        assert!(matches!(err, RetryError::Fatal { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhausts_attempts() {
        let cancel = CancellationToken::new();
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = policy(3)
            .run(&cancel, classify, |_| async { Err("timeout") })
            .await;

        let err = result.expect_err("exhausted");
        assert_eq!(err.attempts(), 3);
        assert!(matches!(err, RetryError::Exhausted { error: "timeout", .. }));
        // 100ms + 200ms of backoff between the three attempts
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_observes_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<(), RetryError<&str>> = policy(3)
            .run(&cancel, classify, |_| async { Ok(()) })
            .await;

        assert!(result.expect_err("cancelled").is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_backoff() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let result: Result<(), _> = policy(3)
            .run(&cancel, classify, |_| {
                let trigger = trigger.clone();
                async move {
                    trigger.cancel();
                    Err("slow down")
                }
            })
            .await;

        assert!(result.expect_err("cancelled during backoff").is_cancelled());
    }
}

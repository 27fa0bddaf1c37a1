//! Rate-limit aware retries with exponential backoff.
//!
//! Only errors that classify themselves as rate limits through
//! [`RateLimitSignal`] are retried. Everything else aborts on the first
//! attempt. Backoff waits are cancellable through a [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Implemented by fetch errors that can tell a rate limit apart from other
/// failures.
pub trait RateLimitSignal {
    /// Returns `true` when the upstream asked the caller to slow down.
    fn is_rate_limited(&self) -> bool;
}

/// Errors produced by [`retry_on_rate_limit`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError<E> {
    /// A non rate-limit failure. Never retried.
    #[error("upstream error: {0}")]
    Upstream(#[source] E),

    /// Every attempt was rate limited.
    #[error("still rate limited after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    #[error("cancelled")]
    Cancelled,
}

/// Retry schedule for [`retry_on_rate_limit`].
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after the first rate-limited attempt. Doubles on each retry.
    pub base_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl BackoffPolicy {
    /// Delay after the given 0-based attempt: `base_delay * 2^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `op` until it succeeds, fails with a non rate-limit error, or the
/// attempt budget runs out.
///
/// Attempts never overlap: each one is classified, then the backoff wait
/// completes, before the next starts. No wait follows the final attempt.
pub async fn retry_on_rate_limit<T, E, F, Fut>(
    policy: &BackoffPolicy,
    cancel: &CancellationToken,
    label: &str,
    mut op: F,
) -> Result<T, FetchError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RateLimitSignal + std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = op() => result,
        };

        let err = match result {
            Ok(value) => {
                debug!(label, attempts = attempt + 1, "fetch succeeded");
                return Ok(value);
            }
            Err(e) if !e.is_rate_limited() => {
                warn!(label, attempt = attempt + 1, error = %e, "fetch failed");
                return Err(FetchError::Upstream(e));
            }
            Err(e) => e,
        };

        let attempts = attempt + 1;
        if attempts >= max_attempts {
            warn!(label, attempts, error = %err, "rate limited, giving up");
            return Err(FetchError::RetriesExhausted {
                attempts,
                source: err,
            });
        }

        let delay = policy.delay_for_attempt(attempt);
        warn!(
            label,
            attempt = attempts,
            delay_secs = format_args!("{:.1}", delay.as_secs_f64()),
            "rate limited, backing off"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(label, "backoff cancelled");
                return Err(FetchError::Cancelled);
            }
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum StubError {
        RateLimited,
        Broken,
    }

    impl std::fmt::Display for StubError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::RateLimited => write!(f, "429 Too Many Requests"),
                Self::Broken => write!(f, "500 Internal Server Error"),
            }
        }
    }

    impl std::error::Error for StubError {}

    impl RateLimitSignal for StubError {
        fn is_rate_limited(&self) -> bool {
            matches!(self, Self::RateLimited)
        }
    }

    #[test]
    fn default_schedule() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        let delays: Vec<_> = (0..5).map(|a| policy.delay_for_attempt(a).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
    }

    #[test]
    fn huge_attempt_saturates() {
        let policy = BackoffPolicy::default();
        assert!(policy.delay_for_attempt(40) >= policy.delay_for_attempt(31));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_four_rate_limits() {
        let policy = BackoffPolicy::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let started = Mutex::new(Vec::new());

        let result = retry_on_rate_limit(&policy, &cancel, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            started.lock().unwrap().push(Instant::now());
            async move {
                if n < 4 {
                    Err(StubError::RateLimited)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        let started = started.into_inner().unwrap();
        let waits: Vec<Duration> = started.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(waits.len(), 4);
        assert!(waits.windows(2).all(|w| w[0] < w[1]), "waits: {waits:?}");
        for (attempt, wait) in waits.iter().enumerate() {
            assert_eq!(*wait, policy.delay_for_attempt(attempt as u32));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn upstream_failure_aborts_immediately() {
        let policy = BackoffPolicy::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_on_rate_limit(&policy, &cancel, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StubError::Broken) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Upstream(StubError::Broken))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_wraps_last_error() {
        let policy = BackoffPolicy::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let begin = Instant::now();

        let result: Result<(), _> = retry_on_rate_limit(&policy, &cancel, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StubError::RateLimited) }
        })
        .await;

        match result {
            Err(FetchError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 5);
                assert_eq!(source, StubError::RateLimited);
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // 2 + 4 + 8 + 16 seconds; no wait after the last attempt.
        assert_eq!(begin.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_then_upstream_failure_stops() {
        let policy = BackoffPolicy::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_on_rate_limit(&policy, &cancel, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(StubError::RateLimited)
                } else {
                    Err(StubError::Broken)
                }
            }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Upstream(StubError::Broken))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let policy = BackoffPolicy::default();
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_on_rate_limit(&policy, &cancel, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StubError::RateLimited) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_token_skips_fetch() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> =
            retry_on_rate_limit(&BackoffPolicy::default(), &cancel, "test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), StubError>(()) }
            })
            .await;

        assert!(matches!(result, Err(FetchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn error_messages() {
        let err: FetchError<StubError> = FetchError::RetriesExhausted {
            attempts: 5,
            source: StubError::RateLimited,
        };
        assert_eq!(
            err.to_string(),
            "still rate limited after 5 attempts: 429 Too Many Requests"
        );
    }
}

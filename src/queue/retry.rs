//! Retry configuration, backoff schedules, and the shared retry helper.
//!
//! Provides [`RetryConfig`] for controlling how many times the queue calls
//! the upstream transport and how long it waits in between. All dispatches
//! go through the crate-private `with_retry()` helper, keeping retry logic
//! in a single place.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::types::OperationKind;
use crate::{HermodError, Result};

/// Generates the delay before each retry.
///
/// Retry `n` (0-indexed) is the `n + 1`-th attempt overall.
#[derive(Clone)]
pub enum Backoff {
    /// Literal delays. Retries past the end reuse the last entry; an empty
    /// schedule means no delay.
    Schedule(Vec<Duration>),
    /// `initial * 2^n`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
    /// Arbitrary schedule-generating function.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl Backoff {
    /// The literal `[1s, 2s, 4s]` schedule.
    pub fn default_schedule() -> Self {
        Backoff::Schedule(vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
        ])
    }

    /// Delay before retry `n` (0-indexed).
    pub fn delay(&self, n: u32) -> Duration {
        match self {
            Backoff::Schedule(delays) => delays
                .get(n as usize)
                .or_else(|| delays.last())
                .copied()
                .unwrap_or(Duration::ZERO),
            Backoff::Exponential { initial, max } => initial
                .saturating_mul(2u32.saturating_pow(n))
                .min(*max),
            Backoff::Custom(f) => f(n),
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::Schedule(delays) => f.debug_tuple("Schedule").field(delays).finish(),
            Backoff::Exponential { initial, max } => f
                .debug_struct("Exponential")
                .field("initial", initial)
                .field("max", max)
                .finish(),
            Backoff::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration for retry behaviour on transient transport errors.
///
/// ```rust
/// # use hermod::{Backoff, RetryConfig};
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(4)
///     .backoff(Backoff::Exponential {
///         initial: Duration::from_millis(200),
///         max: Duration::from_secs(5),
///     });
/// assert_eq!(config.delay_for_retry(2), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Delay schedule between attempts. Default: `[1s, 2s, 4s]`.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default_schedule(),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Shorthand for a literal schedule.
    pub fn delays(self, delays: impl Into<Vec<Duration>>) -> Self {
        self.backoff(Backoff::Schedule(delays.into()))
    }

    /// Delay before retry `n` (0-indexed).
    pub fn delay_for_retry(&self, n: u32) -> Duration {
        self.backoff.delay(n)
    }

    /// Total time spent waiting when every attempt fails.
    ///
    /// There is no delay after the final attempt, so this is the sum of the
    /// first `max_attempts - 1` delays.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|n| self.delay_for_retry(n))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Execute an async operation with retry logic.
///
/// Retries on transient errors (as classified by
/// [`HermodError::is_transient()`]) up to `config.max_attempts`, sleeping
/// per the backoff schedule in between. Once attempts are used up the last
/// error is wrapped in [`HermodError::RetriesExhausted`].
///
/// Permanent errors are returned immediately without retry.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    kind: OperationKind,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = config.delay_for_retry(attempt - 1);
                metrics::counter!(telemetry::RETRIES_TOTAL, "kind" => kind.stats_key())
                    .increment(1);
                warn!(
                    %kind,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient error"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) if e.is_transient() => {
                return Err(HermodError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
            Err(e) => return Err(e), // permanent error, no retry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_schedule_is_literal() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_for_retry(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_retry(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_retry(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_retry(9), Duration::from_secs(4));
        assert_eq!(config.total_backoff(), Duration::from_secs(3));
    }

    #[test]
    fn exponential_is_capped() {
        let backoff = Backoff::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(3), Duration::from_millis(500));
        assert_eq!(backoff.delay(40), Duration::from_millis(500));
    }

    #[test]
    fn custom_and_empty_schedules() {
        let linear = Backoff::Custom(Arc::new(|n| Duration::from_millis(10 * (u64::from(n) + 1))));
        assert_eq!(linear.delay(4), Duration::from_millis(50));
        assert_eq!(Backoff::Schedule(vec![]).delay(0), Duration::ZERO);
    }

    #[test]
    fn disabled_has_no_backoff() {
        assert_eq!(RetryConfig::disabled().total_backoff(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_wraps_last_error() {
        let calls = &AtomicU32::new(0);
        let config = RetryConfig::new().max_attempts(3);
        let result: Result<()> = with_retry(&config, OperationKind::Translation, || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(HermodError::Http(format!("boom {n}")))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(HermodError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last.to_string(), "HTTP error: boom 2");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> =
            with_retry(&RetryConfig::default(), OperationKind::Compliance, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(HermodError::Api {
                    status: 400,
                    message: "bad request".into(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(HermodError::Api { status: 400, .. })));
    }
}

// ABOUTME: Bounded retry with exponential backoff for network-bound engine calls.
// ABOUTME: Backoff waits abort as soon as the run's cancellation token fires.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::runtime::ImageError;

/// Largest power of two applied to the base delay.
const MAX_BACKOFF_EXPONENT: u32 = 30;

/// How often and how patiently to retry a failing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Wait before the first retry; doubles for each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Wait before retry number `retry` (1-based): `base_delay * 2^(retry-1)`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Failure of a retried step.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: ImageError,
    },

    #[error("cancelled while waiting to retry {action}")]
    Cancelled { action: &'static str },
}

impl RetryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

/// Run `step` until it succeeds or the policy's attempt budget is spent.
///
/// An attempt already in flight is never interrupted; only the waits between
/// attempts observe `cancel`.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    action: &'static str,
    image: &str,
    mut step: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ImageError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match step().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(err) => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    image,
                    action,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, retrying"
                );

                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(RetryError::Cancelled { action });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}

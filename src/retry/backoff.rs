// ABOUTME: Retry loops driving an operation until it succeeds or gives up.
// ABOUTME: Waits race a cancellation token so callers can abandon a loop early.

use super::error::RetryError;
use super::policy::RetryPolicy;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleep for `wait` unless `cancel` fires first. Returns `false` if cancelled.
async fn sleep_or_cancel(wait: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(wait) => true,
    }
}

/// Run `operation` up to `max_attempts` times.
///
/// After every failed attempt, the last one included, the loop sleeps for the
/// current delay and then doubles it. There is no jitter. Returns the first
/// success or the last error.
pub async fn retry_operation<T, E, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut delay = base_delay;
    let mut last = None;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::debug!(
                    "attempt {}/{} failed, waiting {:?}: {}",
                    attempt,
                    max_attempts,
                    delay,
                    e
                );
                if !sleep_or_cancel(delay, cancel).await {
                    return Err(RetryError::Cancelled {
                        attempts: attempt,
                        last: e,
                    });
                }
                delay = delay.saturating_mul(2);
                last = Some(e);
            }
        }
    }

    match last {
        Some(last) => Err(RetryError::Exhausted {
            attempts: max_attempts,
            last,
        }),
        None => Err(RetryError::NoAttempts),
    }
}

/// Probe until `probe` succeeds or `policy` declines another attempt.
///
/// This is the readiness primitive: the probe typically dials a published
/// port. The policy is consumed, so each call starts from a fresh count.
pub async fn connect<P, T, E, F, Fut>(
    mut policy: P,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<T, RetryError<E>>
where
    P: RetryPolicy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);
        let err = match probe().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let Some(wait) = policy.attempt_again(&err) else {
            return Err(RetryError::Exhausted {
                attempts,
                last: err,
            });
        };

        tracing::info!("connect failed, retrying in {:?}: {}", wait, err);
        if !sleep_or_cancel(wait, cancel).await {
            return Err(RetryError::Cancelled {
                attempts,
                last: err,
            });
        }
    }
}

// ABOUTME: Stateful retry policies answering "try again, and after how long?".
// ABOUTME: Fixed-interval and exponential-backoff-with-jitter variants.

use rand::Rng;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MIN_WAIT: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

/// Decides whether a failed attempt is retried.
///
/// A policy counts the failures it has seen, so one instance serves exactly
/// one retry sequence. The retry loops take policies by value to enforce
/// that.
pub trait RetryPolicy {
    /// Called after each failed attempt. `Some(wait)` means sleep for `wait`
    /// and try again; `None` means give up.
    fn attempt_again(&mut self, error: &dyn fmt::Display) -> Option<Duration>;
}

/// Retries up to `retries` times with a constant wait in between.
#[derive(Debug, Clone)]
pub struct SimpleRetryPolicy {
    retries: u32,
    wait: Duration,
    attempts: u32,
}

impl SimpleRetryPolicy {
    pub fn new(retries: u32, wait: Duration) -> Self {
        Self {
            retries,
            wait,
            attempts: 0,
        }
    }
}

impl RetryPolicy for SimpleRetryPolicy {
    fn attempt_again(&mut self, _error: &dyn fmt::Display) -> Option<Duration> {
        let retry = self.attempts < self.retries;
        self.attempts = self.attempts.saturating_add(1);
        retry.then_some(self.wait)
    }
}

/// Retries up to `retries` times, doubling the wait each time and adding
/// jitter. See [`exponential_wait`] for the exact curve.
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetryPolicy {
    retries: u32,
    min: Duration,
    max: Duration,
    attempts: u32,
}

impl ExponentialBackoffRetryPolicy {
    /// A zero `min` or `max` falls back to 100ms / 10s.
    pub fn new(retries: u32, min: Duration, max: Duration) -> Self {
        Self {
            retries,
            min,
            max,
            attempts: 0,
        }
    }
}

impl RetryPolicy for ExponentialBackoffRetryPolicy {
    fn attempt_again(&mut self, _error: &dyn fmt::Display) -> Option<Duration> {
        let retry = self.attempts < self.retries;
        let wait = exponential_wait(
            self.min,
            self.max,
            self.attempts,
            rand::thread_rng().r#gen::<f64>(),
        );
        self.attempts = self.attempts.saturating_add(1);
        retry.then_some(wait)
    }
}

/// Wait before retry number `attempt` (zero-based).
///
/// `min * 2^(attempt - 1)` plus jitter in `[-min/2, +min/2)`, capped at
/// `max`. `unit` is a uniform sample from `[0, 1)`. The first wait
/// (`attempt == 0`) lands in `[0, min)`.
pub fn exponential_wait(min: Duration, max: Duration, attempt: u32, unit: f64) -> Duration {
    let min = if min.is_zero() { DEFAULT_MIN_WAIT } else { min };
    let max = if max.is_zero() { DEFAULT_MAX_WAIT } else { max };

    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX).saturating_sub(1);
    let factor = 2f64.powi(exponent) + unit - 0.5;
    let nap = min.as_nanos() as f64 * factor;

    if !nap.is_finite() || nap > max.as_nanos() as f64 {
        return max;
    }
    Duration::from_nanos(nap.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERR: &str = "connection refused";

    #[test]
    fn simple_policy_with_zero_retries_never_retries() {
        let mut policy = SimpleRetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.attempt_again(&ERR), None);
        assert_eq!(policy.attempt_again(&ERR), None);
    }

    #[test]
    fn simple_policy_returns_constant_wait() {
        let mut policy = SimpleRetryPolicy::new(2, Duration::from_millis(300));
        assert_eq!(policy.attempt_again(&ERR), Some(Duration::from_millis(300)));
        assert_eq!(policy.attempt_again(&ERR), Some(Duration::from_millis(300)));
        assert_eq!(policy.attempt_again(&ERR), None);
    }

    #[test]
    fn first_exponential_wait_is_below_min() {
        let min = Duration::from_millis(100);
        let max = Duration::from_secs(10);
        assert_eq!(exponential_wait(min, max, 0, 0.0), Duration::ZERO);
        assert!(exponential_wait(min, max, 0, 0.999) < min);
    }

    #[test]
    fn exponential_wait_doubles_at_mean_jitter() {
        let min = Duration::from_millis(100);
        let max = Duration::from_secs(10);
        assert_eq!(exponential_wait(min, max, 1, 0.5), Duration::from_millis(100));
        assert_eq!(exponential_wait(min, max, 2, 0.5), Duration::from_millis(200));
        assert_eq!(exponential_wait(min, max, 3, 0.5), Duration::from_millis(400));
    }

    #[test]
    fn zero_bounds_use_defaults() {
        assert_eq!(
            exponential_wait(Duration::ZERO, Duration::ZERO, 2, 0.5),
            Duration::from_millis(200)
        );
        assert_eq!(
            exponential_wait(Duration::ZERO, Duration::ZERO, 40, 0.5),
            DEFAULT_MAX_WAIT
        );
    }

    #[test]
    fn exponential_policy_stops_after_retries() {
        let mut policy =
            ExponentialBackoffRetryPolicy::new(1, Duration::from_millis(10), Duration::from_secs(1));
        assert!(policy.attempt_again(&ERR).is_some());
        assert!(policy.attempt_again(&ERR).is_none());
    }
}

// ABOUTME: Retry policies and retry loops with cancellable waits.
// ABOUTME: Used for launcher resilience and caller-driven readiness probing.

mod backoff;
mod error;
mod policy;

pub use backoff::{connect, retry_operation};
pub use error::RetryError;
pub use policy::{
    DEFAULT_MAX_WAIT, DEFAULT_MIN_WAIT, ExponentialBackoffRetryPolicy, RetryPolicy,
    SimpleRetryPolicy, exponential_wait,
};

// ABOUTME: Accumulator for teardown failures that must not stop later steps.
// ABOUTME: Renders as the individual messages joined with ": ".

use super::error::ComposeError;
use std::fmt;

/// Every teardown step that failed, in the order they ran.
#[derive(Debug, Default)]
pub struct CleanupError {
    failures: Vec<ComposeError>,
}

impl CleanupError {
    /// Record a failure, auto-logging it via tracing.
    pub fn record(&mut self, failure: ComposeError) {
        tracing::warn!("{}", failure);
        self.failures.push(failure);
    }

    /// Record the error of `result`, if any.
    pub fn check<T>(&mut self, result: Result<T, ComposeError>) {
        if let Err(e) = result {
            self.record(e);
        }
    }

    pub fn failures(&self) -> &[ComposeError] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok` if nothing failed.
    pub fn into_result(self) -> Result<(), CleanupError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for CleanupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str(": ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for CleanupError {}

// ABOUTME: Error returned when a retry loop gives up.
// ABOUTME: Carries the last failure and the number of attempts made.

/// Outcome of a retry loop that never succeeded.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every allowed attempt failed.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: E },

    /// The cancellation token fired while waiting between attempts.
    #[error("cancelled after {attempts} attempt(s): {last}")]
    Cancelled { attempts: u32, last: E },

    /// The loop was configured with zero attempts.
    #[error("retry loop allows no attempts")]
    NoAttempts,
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Cancelled { attempts, .. } => {
                *attempts
            }
            RetryError::NoAttempts => 0,
        }
    }

    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Cancelled { last, .. } => Some(last),
            RetryError::NoAttempts => None,
        }
    }

    pub fn into_last_error(self) -> Option<E> {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Cancelled { last, .. } => Some(last),
            RetryError::NoAttempts => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

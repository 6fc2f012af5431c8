//! Retry policy for conflicted transactions

use std::time::Duration;

/// How the engine behaves when a commit is rejected.
///
/// The default retries forever with no pause, matching the optimistic
/// assumption that contention on any one key is transient. Deployments
/// that cannot tolerate an unbounded loop opt into a cap, at which point
/// exhaustion surfaces as `Error::Conflict` - the one situation where a
/// conflict becomes visible to callers.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    max_attempts: Option<u64>,
    delay: Option<Duration>,
}

impl RetryPolicy {
    /// Retry forever, immediately. Equivalent to `RetryPolicy::default()`.
    pub fn unbounded() -> Self {
        RetryPolicy::default()
    }

    /// Give up (with `Error::Conflict`) after `max` total attempts.
    ///
    /// `max` counts body executions, so `with_max_attempts(1)` means "try
    /// once, never retry".
    pub fn with_max_attempts(max: u64) -> Self {
        RetryPolicy {
            max_attempts: Some(max),
            delay: None,
        }
    }

    /// Sleep for `delay` between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Attempt cap, if any.
    pub fn max_attempts(&self) -> Option<u64> {
        self.max_attempts
    }

    /// Inter-attempt pause, if any.
    pub fn backoff_delay(&self) -> Option<Duration> {
        self.delay
    }
}

//! Fixed-delay policies.

use super::BackoffPolicy;
use std::time::Duration;

/// Waits the same interval before every retry and never gives up.
///
/// Pair it with [`with_max_retries`](super::BackoffPolicyExt::with_max_retries)
/// or a cancellation signal to bound the run.
///
/// # Examples
///
/// ```rust
/// use turboretry::backoff::{BackoffPolicy, ConstantBackoff};
/// use std::time::Duration;
///
/// let mut policy = ConstantBackoff::new(Duration::from_secs(1));
/// assert_eq!(policy.next_delay(), Some(Duration::from_secs(1)));
/// assert_eq!(policy.next_delay(), Some(Duration::from_secs(1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBackoff {
    interval: Duration,
}

impl ConstantBackoff {
    /// Create a policy that always waits `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl BackoffPolicy for ConstantBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        Some(self.interval)
    }

    fn reset(&mut self) {}
}

/// Retries immediately, forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroBackoff;

impl BackoffPolicy for ZeroBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        Some(Duration::ZERO)
    }

    fn reset(&mut self) {}
}

/// Never retries: the operation runs exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopBackoff;

impl BackoffPolicy for StopBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}
}

//! Retry cap for any policy.

use super::BackoffPolicy;
use std::time::Duration;

/// Caps an inner policy at a fixed number of retries.
///
/// Delays come from the inner policy until `max_retries` of them have been
/// handed out; after that the wrapper gives up even if the inner policy would
/// not. Build one with
/// [`BackoffPolicyExt::with_max_retries`](super::BackoffPolicyExt::with_max_retries).
#[derive(Debug, Clone)]
pub struct MaxRetries<B> {
    inner: B,
    max_retries: u32,
    retries: u32,
}

impl<B> MaxRetries<B> {
    /// Wrap `inner`, allowing at most `max_retries` retries per run.
    pub fn new(inner: B, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            retries: 0,
        }
    }

    /// Retries handed out since the last reset.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The wrapped policy.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwrap into the inner policy.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: BackoffPolicy> BackoffPolicy for MaxRetries<B> {
    fn next_delay(&mut self) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }
        self.retries += 1;
        self.inner.next_delay()
    }

    fn reset(&mut self) {
        self.retries = 0;
        self.inner.reset();
    }
}

//! Backoff policies.
//!
//! A [`BackoffPolicy`] is a small state machine that hands out the delay to
//! wait before the next attempt, or `None` once the caller should give up.
//!
//! # Key Types
//!
//! - [`BackoffPolicy`] - Core trait shared by the retry loops and the ticker
//! - [`ExponentialBackoff`] - Exponentially growing, randomized delays
//! - [`ConstantBackoff`] - Same delay every time
//! - [`ZeroBackoff`] - Retry immediately, forever
//! - [`StopBackoff`] - Never retry
//! - [`MaxRetries`] - Caps any policy at a fixed number of retries
//!
//! # Examples
//!
//! ```rust
//! use turboretry::backoff::{BackoffPolicy, BackoffPolicyExt, ConstantBackoff};
//! use std::time::Duration;
//!
//! let mut policy = ConstantBackoff::new(Duration::from_millis(10)).with_max_retries(2);
//!
//! assert_eq!(policy.next_delay(), Some(Duration::from_millis(10)));
//! assert_eq!(policy.next_delay(), Some(Duration::from_millis(10)));
//! assert_eq!(policy.next_delay(), None);
//! ```

mod constant;
mod exponential;
mod max_retries;

use std::fmt;
use std::time::Duration;

pub use constant::{ConstantBackoff, StopBackoff, ZeroBackoff};
pub use exponential::{
    DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_ELAPSED_TIME, DEFAULT_MAX_INTERVAL, DEFAULT_MULTIPLIER,
    DEFAULT_RANDOMIZATION_FACTOR, ExponentialBackoff, ExponentialBackoffBuilder,
};
pub use max_retries::MaxRetries;

/// A stateful strategy deciding how long to wait between attempts.
///
/// Implementations are driven by exactly one retry run at a time. Between
/// independent runs the policy must be [`reset`](BackoffPolicy::reset); the
/// retry functions in this crate and [`Ticker`](crate::Ticker) do this for
/// you when a run starts.
///
/// Policies are `Debug` so boxed policies built from configuration can be
/// logged and inspected.
///
/// # Examples
///
/// A policy that gives up after three quick retries:
///
/// ```rust
/// use turboretry::backoff::BackoffPolicy;
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct ThreeTimes {
///     calls: u32,
/// }
///
/// impl BackoffPolicy for ThreeTimes {
///     fn next_delay(&mut self) -> Option<Duration> {
///         self.calls += 1;
///         (self.calls <= 3).then_some(Duration::from_millis(5))
///     }
///
///     fn reset(&mut self) {
///         self.calls = 0;
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait BackoffPolicy: Send + fmt::Debug {
    /// Calculate the delay before the next attempt.
    ///
    /// # Returns
    /// - `Some(Duration)`: Wait this long, then try again
    /// - `None`: Give up; neither this method nor the operation should be
    ///   called again for the current run
    ///
    /// # Notes
    ///
    /// This method is called AFTER a failure and BEFORE sleeping.
    fn next_delay(&mut self) -> Option<Duration>;

    /// Return the policy to its initial state so it can drive a new run.
    fn reset(&mut self);
}

impl<B: BackoffPolicy + ?Sized> BackoffPolicy for &mut B {
    fn next_delay(&mut self) -> Option<Duration> {
        (**self).next_delay()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<B: BackoffPolicy + ?Sized> BackoffPolicy for Box<B> {
    fn next_delay(&mut self) -> Option<Duration> {
        (**self).next_delay()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Combinators available on every [`BackoffPolicy`].
pub trait BackoffPolicyExt: BackoffPolicy + Sized {
    /// Stop after `max_retries` delays have been handed out.
    ///
    /// An operation retried under the returned policy runs at most
    /// `max_retries + 1` times.
    fn with_max_retries(self, max_retries: u32) -> MaxRetries<Self> {
        MaxRetries::new(self, max_retries)
    }
}

impl<B: BackoffPolicy> BackoffPolicyExt for B {}

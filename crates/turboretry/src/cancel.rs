//! Cancellation signals observed by the cancellation-aware retry loops.
//!
//! A [`CancelSignal`] is owned by the caller; retry runs only read it. Two
//! signals ship with the crate:
//!
//! - [`CancellationToken`] from `tokio-util`, which reports
//!   [`CancelReason::Canceled`];
//! - [`Deadline`], a token paired with a point in time, which additionally
//!   reports [`CancelReason::DeadlineExceeded`] once that point has passed.
//!
//! Shared references to a signal are signals too, so `&dyn CancelSignal`
//! can be passed around freely.

use crate::error::CancelReason;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// An externally controlled "stop now" flag carrying a reason.
///
/// # Examples
///
/// ```rust
/// use turboretry::{CancelReason, CancelSignal};
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert_eq!(token.reason(), None);
///
/// token.cancel();
/// assert_eq!(token.reason(), Some(CancelReason::Canceled));
/// ```
#[async_trait]
pub trait CancelSignal: Send + Sync {
    /// Returns the reason if the signal is already done, `None` otherwise.
    fn reason(&self) -> Option<CancelReason>;

    /// Resolves once the signal is done.
    ///
    /// Resolves immediately if the signal is already done.
    async fn cancelled(&self) -> CancelReason;
}

#[async_trait]
impl CancelSignal for CancellationToken {
    fn reason(&self) -> Option<CancelReason> {
        self.is_cancelled().then_some(CancelReason::Canceled)
    }

    async fn cancelled(&self) -> CancelReason {
        CancellationToken::cancelled(self).await;
        CancelReason::Canceled
    }
}

#[async_trait]
impl<'a, S: CancelSignal + ?Sized> CancelSignal for &'a S {
    fn reason(&self) -> Option<CancelReason> {
        (**self).reason()
    }

    async fn cancelled(&self) -> CancelReason {
        (**self).cancelled().await
    }
}

/// A cancellation token that also expires at a fixed instant.
///
/// Explicit cancellation takes precedence over expiry when both have
/// happened.
///
/// # Examples
///
/// ```rust
/// use turboretry::Deadline;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let deadline = Deadline::timeout(Duration::from_secs(30));
/// assert!(deadline.remaining() <= Duration::from_secs(30));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancellationToken,
    deadline: Instant,
}

impl Deadline {
    /// Pair `token` with an absolute deadline.
    pub fn new(token: CancellationToken, deadline: Instant) -> Self {
        Self { token, deadline }
    }

    /// Pair `token` with a deadline `timeout` from now.
    pub fn after(token: CancellationToken, timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self::new(token, deadline)
    }

    /// A deadline `timeout` from now with a fresh token.
    pub fn timeout(timeout: Duration) -> Self {
        Self::after(CancellationToken::new(), timeout)
    }

    /// The instant at which the signal expires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left until expiry, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// The underlying token; cancelling it cancels the deadline.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

// Roughly 30 years, used when the requested timeout overflows `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[async_trait]
impl CancelSignal for Deadline {
    fn reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            Some(CancelReason::Canceled)
        } else if Instant::now() >= self.deadline {
            Some(CancelReason::DeadlineExceeded)
        } else {
            None
        }
    }

    async fn cancelled(&self) -> CancelReason {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => CancelReason::Canceled,
            _ = tokio::time::sleep_until(self.deadline) => CancelReason::DeadlineExceeded,
        }
    }
}

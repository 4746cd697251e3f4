//! Async retry loops.
//!
//! Every function here follows the same state machine:
//!
//! ```text
//! reset policy
//! loop {
//!   ├─► run operation
//!   │     ├─ Ok  ──► return Ok(value)
//!   │     └─ Err ──► policy.next_delay()
//!   │                  ├─ None        ──► return the failure unchanged
//!   │                  └─ Some(delay) ──► notify(&err, delay)
//!   │                                     sleep(delay)   (raced against the
//!   │                                                     signal in *_with_cancel)
//!   └─► next attempt
//! }
//! ```
//!
//! There is no attempt limit besides the policy: wrap it with
//! [`with_max_retries`](crate::backoff::BackoffPolicyExt::with_max_retries)
//! to bound the run.

use crate::backoff::BackoffPolicy;
use crate::cancel::CancelSignal;
use crate::error::{CancelReason, RetryError};
use std::future::Future;
use std::time::Duration;

/// Retry `operation` until it succeeds or `backoff` gives up.
///
/// On exhaustion the operation's last error is returned as-is.
///
/// # Examples
///
/// ```rust
/// use turboretry::{ExponentialBackoff, retry};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), std::io::Error> {
/// let attempts = &AtomicU32::new(0);
/// let value = retry(
///     move || async move {
///         if attempts.fetch_add(1, Ordering::SeqCst) < 1 {
///             Err(std::io::Error::other("transient"))
///         } else {
///             Ok(42)
///         }
///     },
///     ExponentialBackoff::default(),
/// )
/// .await?;
///
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn retry<F, Fut, T, E, B>(operation: F, backoff: B) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: BackoffPolicy,
{
    retry_notify(operation, backoff, |_, _| {}).await
}

/// Like [`retry`], calling `notify` with the error and the upcoming delay
/// before every wait.
///
/// `notify` is not called for the final failure.
pub async fn retry_notify<F, Fut, T, E, B, N>(
    mut operation: F,
    mut backoff: B,
    mut notify: N,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: BackoffPolicy,
    N: FnMut(&E, Duration),
{
    backoff.reset();

    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(delay) = backoff.next_delay() else {
            trace_exhausted(attempt);
            return Err(err);
        };

        trace_retry(attempt, delay);
        notify(&err, delay);

        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Like [`retry`], but gives up as soon as `signal` fires.
///
/// See [`retry_notify_with_cancel`] for the exact cancellation points.
pub async fn retry_with_cancel<S, F, Fut, T, E, B>(
    signal: &S,
    operation: F,
    backoff: B,
) -> Result<T, RetryError<E>>
where
    S: CancelSignal + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: BackoffPolicy,
{
    retry_notify_with_cancel(signal, operation, backoff, |_, _| {}).await
}

/// Cancellation-aware [`retry_notify`].
///
/// The signal is observed at two points only:
/// - before the first attempt: if it is already done the operation is never
///   called;
/// - while waiting between attempts: the wait is raced against the signal and
///   cancellation ends the run without consulting the policy again.
///
/// An attempt already in flight is never interrupted. When the policy gives
/// up, the last failure is returned as [`RetryError::Operation`] even if the
/// signal fires afterwards.
///
/// # Examples
///
/// ```rust
/// use turboretry::{CancelReason, RetryError, ZeroBackoff, retry_notify_with_cancel};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let result: Result<(), RetryError<std::io::Error>> = retry_notify_with_cancel(
///     &token,
///     || async { Err(std::io::Error::other("never called")) },
///     ZeroBackoff,
///     |_, _| {},
/// )
/// .await;
///
/// assert_eq!(result.unwrap_err().cancel_reason(), Some(CancelReason::Canceled));
/// # }
/// ```
pub async fn retry_notify_with_cancel<S, F, Fut, T, E, B, N>(
    signal: &S,
    mut operation: F,
    mut backoff: B,
    mut notify: N,
) -> Result<T, RetryError<E>>
where
    S: CancelSignal + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: BackoffPolicy,
    N: FnMut(&E, Duration),
{
    backoff.reset();

    if let Some(reason) = signal.reason() {
        trace_cancelled(0, reason);
        return Err(RetryError::Cancelled(reason));
    }

    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(delay) = backoff.next_delay() else {
            trace_exhausted(attempt);
            return Err(RetryError::Operation(err));
        };

        trace_retry(attempt, delay);
        notify(&err, delay);

        tokio::select! {
            biased;
            reason = signal.cancelled() => {
                trace_cancelled(attempt, reason);
                return Err(RetryError::Cancelled(reason));
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(feature = "tracing")]
pub(crate) fn trace_retry(attempt: u32, delay: Duration) {
    tracing::debug!(attempt, ?delay, "attempt failed, retrying");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn trace_retry(_attempt: u32, _delay: Duration) {}

#[cfg(feature = "tracing")]
pub(crate) fn trace_exhausted(attempt: u32) {
    tracing::debug!(attempt, "backoff policy gave up, returning last error");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn trace_exhausted(_attempt: u32) {}

#[cfg(feature = "tracing")]
fn trace_cancelled(attempt: u32, reason: CancelReason) {
    tracing::debug!(attempt, reason = reason.as_label(), "retry run cancelled");
}

#[cfg(not(feature = "tracing"))]
fn trace_cancelled(_attempt: u32, _reason: CancelReason) {}

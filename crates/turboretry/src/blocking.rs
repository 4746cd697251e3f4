//! Thread-blocking retry loops.
//!
//! Same state machine as the async functions in the crate root, for callers
//! outside an async runtime. Waits block the calling thread with
//! [`std::thread::sleep`]; there is no cancellation-aware variant here.
//!
//! # Examples
//!
//! ```rust
//! use turboretry::{ZeroBackoff, blocking};
//!
//! let mut attempts = 0;
//! let result = blocking::retry(
//!     || {
//!         attempts += 1;
//!         if attempts < 3 { Err("not yet") } else { Ok(attempts) }
//!     },
//!     ZeroBackoff,
//! );
//! assert_eq!(result, Ok(3));
//! ```

use crate::backoff::BackoffPolicy;
use crate::retry::{trace_exhausted, trace_retry};
use std::thread;
use std::time::Duration;

/// Retry `operation` on the current thread until it succeeds or `backoff`
/// gives up, returning the last error on exhaustion.
pub fn retry<F, T, E, B>(operation: F, backoff: B) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    B: BackoffPolicy,
{
    retry_notify(operation, backoff, |_, _| {})
}

/// Like [`retry`], calling `notify` with the error and the upcoming delay
/// before every wait.
pub fn retry_notify<F, T, E, B, N>(mut operation: F, mut backoff: B, mut notify: N) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    B: BackoffPolicy,
    N: FnMut(&E, Duration),
{
    backoff.reset();

    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        let err = match operation() {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(delay) = backoff.next_delay() else {
            trace_exhausted(attempt);
            return Err(err);
        };

        trace_retry(attempt, delay);
        notify(&err, delay);

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

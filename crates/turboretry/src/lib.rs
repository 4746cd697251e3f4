#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Backoff policies and retry drivers.
//!
//! This crate wraps flaky operations (network calls, I/O) in bounded,
//! jittered retries without hand-written loop and timer logic:
//!
//! - **Backoff policies** via the [`BackoffPolicy`] trait
//!   - Exponential backoff with jitter and an elapsed-time budget
//!   - Constant, zero and stop-immediately policies
//!   - A retry cap for any policy ([`BackoffPolicyExt::with_max_retries`])
//! - **Retry loops** driving an operation against a policy
//!   - [`retry`] / [`retry_notify`] on Tokio timers
//!   - [`retry_notify_with_cancel`] honouring a [`CancelSignal`]
//!   - [`blocking::retry`] for code outside an async runtime
//! - **Tickers** turning a policy into a stoppable stream of ticks ([`Ticker`])
//! - **Configuration** loaded from TOML/JSON ([`config::RetryConfig`])
//!
//! # Design Philosophy
//!
//! The policy is the only stateful piece. The retry loops and the ticker are
//! interchangeable consumers of the same contract: ask the policy for the
//! next delay after a failure, give up when it says so.
//!
//! - Exhaustion is not an error of its own: the last failure is returned
//! - Which errors are worth retrying is the operation's business
//! - Cancellation is cooperative and never interrupts a running attempt
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use turboretry::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let backoff = ExponentialBackoff::builder()
//!     .initial_interval(Duration::from_millis(100))
//!     .build()
//!     .with_max_retries(3);
//!
//! let result = retry(|| async { Ok::<_, std::io::Error>(42) }, backoff).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional features
//! - `tracing`: emit `tracing` debug events when retries are scheduled,
//!   exhausted or cancelled, and when a ticker stops.

pub mod backoff;
pub mod blocking;
pub mod config;

mod cancel;
mod error;
mod retry;
mod ticker;

#[cfg(test)]
mod property_tests;

pub use backoff::{
    BackoffPolicy, BackoffPolicyExt, ConstantBackoff, ExponentialBackoff,
    ExponentialBackoffBuilder, MaxRetries, StopBackoff, ZeroBackoff,
};
pub use cancel::{CancelSignal, Deadline};
pub use error::{CancelReason, ConfigError, RetryError};
pub use retry::{retry, retry_notify, retry_notify_with_cancel, retry_with_cancel};
pub use ticker::{StopHandle, Ticker};

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use turboretry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{
        BackoffPolicy, BackoffPolicyExt, ConstantBackoff, ExponentialBackoff, StopBackoff,
        ZeroBackoff,
    };
    pub use crate::cancel::{CancelSignal, Deadline};
    pub use crate::error::{CancelReason, RetryError};
    pub use crate::retry::{retry, retry_notify, retry_notify_with_cancel, retry_with_cancel};
    pub use crate::ticker::Ticker;
}

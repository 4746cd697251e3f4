//! Error types for retry runs.
//!
//! Retry exhaustion is not an error of its own: when a policy
//! gives up, the run returns the operation's last failure unchanged. The only
//! outcome this crate adds is cancellation, which the cancellation-aware
//! retry functions report through [`RetryError::Cancelled`].

use thiserror::Error;

/// Why a cancellation signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CancelReason {
    /// The signal was cancelled explicitly.
    #[error("retry cancelled")]
    Canceled,

    /// The signal's deadline passed.
    #[error("retry deadline exceeded")]
    DeadlineExceeded,
}

impl CancelReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CancelReason::Canceled => "canceled",
            CancelReason::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// Outcome of a cancellation-aware retry run that did not succeed.
///
/// # Examples
///
/// ```rust
/// use turboretry::{CancelReason, RetryError};
///
/// let err: RetryError<std::io::Error> = CancelReason::Canceled.into();
/// assert!(err.is_cancelled());
/// assert_eq!(err.to_string(), "retry cancelled");
/// ```
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RetryError<E> {
    /// The last attempt failed and the policy gave up.
    #[error(transparent)]
    Operation(E),

    /// The cancellation signal fired before the run could finish.
    #[error(transparent)]
    Cancelled(#[from] CancelReason),
}

impl<E> RetryError<E> {
    /// Check if the run ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled(_))
    }

    /// The cancellation reason, if the run was cancelled.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            RetryError::Cancelled(reason) => Some(*reason),
            RetryError::Operation(_) => None,
        }
    }

    /// The operation's last failure, if the run ended on one.
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Cancelled(_) => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Operation(_) => "operation_failed",
            RetryError::Cancelled(reason) => reason.as_label(),
        }
    }
}

/// Invalid values in a [`BackoffConfig`](crate::config::BackoffConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Multiplier was NaN, infinite, or below 1.0.
    #[error("multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    /// Randomization factor was outside `0.0..=1.0`.
    #[error("randomization factor must be within 0.0..=1.0, got {0}")]
    InvalidRandomizationFactor(f64),
}

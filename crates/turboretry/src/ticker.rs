//! Backoff-paced tick source.
//!
//! A [`Ticker`] turns a [`BackoffPolicy`] into a stream of ticks produced by a
//! background task. The consumer pulls a tick, runs its attempt, and either
//! stops pulling (success) or pulls again (failure). The ticker supplies
//! timing only: it never learns whether an attempt succeeded.
//!
//! ## Lifecycle
//! ```text
//! Ticker::new(policy)
//!   └─► spawn background task
//!         reset policy
//!         loop {
//!           ├─► hand tick to consumer (waits until taken)
//!           ├─► policy.next_delay()
//!           │     ├─ None        ──► stop, close channel, exit
//!           │     └─ Some(delay) ──► sleep(delay)
//!           └─► (every wait is abandoned as soon as stop() is called)
//!         }
//! ```
//!
//! ## Rules
//! - The first tick is emitted immediately.
//! - The background task is the only owner of the sender, so the channel is
//!   closed exactly once, however the ticker stopped.
//! - Once [`Ticker::stop`] returns, no further tick is observed, including one
//!   that was already waiting in the channel.

use crate::backoff::BackoffPolicy;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Emits ticks paced by a backoff policy until stopped.
///
/// Ticks are read with [`Ticker::tick`] or through the [`Stream`] impl.
/// Dropping the ticker stops it.
///
/// # Examples
///
/// ```rust
/// use turboretry::{ExponentialBackoff, Ticker};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut ticker = Ticker::new(ExponentialBackoff::default());
/// let mut attempts = 0;
///
/// while let Some(_tick) = ticker.tick().await {
///     attempts += 1;
///     if attempts == 2 {
///         break; // success, stop consuming
///     }
/// }
///
/// assert_eq!(attempts, 2);
/// # }
/// ```
#[derive(Debug)]
pub struct Ticker {
    ticks: mpsc::Receiver<Instant>,
    stop: CancellationToken,
}

impl Ticker {
    /// Reset `backoff` and start emitting ticks.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<B>(backoff: B) -> Self
    where
        B: BackoffPolicy + 'static,
    {
        // One slot: the scheduler waits for each tick to be taken before
        // asking the policy for the next delay.
        let (tx, ticks) = mpsc::channel(1);
        let stop = CancellationToken::new();

        tokio::spawn(run(backoff, tx, stop.clone()));

        Self { ticks, stop }
    }

    /// Wait for the next tick.
    ///
    /// Returns `None` once the ticker has stopped.
    pub async fn tick(&mut self) -> Option<Instant> {
        if self.stop.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.stop.cancelled() => None,
            tick = self.ticks.recv() => tick,
        }
    }

    /// Stop the ticker. Idempotent.
    ///
    /// May be called while handling a tick; the next [`tick`](Self::tick)
    /// returns `None`.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether the ticker has stopped, explicitly or because the policy gave up.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// A cloneable handle that can stop this ticker from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: self.stop.clone(),
        }
    }
}

impl Stream for Ticker {
    type Item = Instant;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.stop.is_cancelled() {
            return Poll::Ready(None);
        }
        // Stopping makes the background task drop the sender, which wakes us.
        this.ticks.poll_recv(cx)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

/// Stops a [`Ticker`] from anywhere.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: CancellationToken,
}

impl StopHandle {
    /// Stop the ticker. Idempotent.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether the ticker has stopped.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

async fn run<B: BackoffPolicy>(mut backoff: B, tx: mpsc::Sender<Instant>, stop: CancellationToken) {
    backoff.reset();

    let mut permit = tokio::select! {
        biased;
        _ = stop.cancelled() => return,
        permit = tx.reserve() => match permit {
            Ok(permit) => permit,
            Err(_) => return,
        },
    };

    loop {
        permit.send(Instant::now());

        // The slot frees up once the consumer has taken the tick.
        permit = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            permit = tx.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let Some(delay) = backoff.next_delay() else {
            stop.cancel();
            break;
        };

        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    trace_stopped();
}

#[cfg(feature = "tracing")]
fn trace_stopped() {
    tracing::debug!("backoff ticker stopped");
}

#[cfg(not(feature = "tracing"))]
fn trace_stopped() {}

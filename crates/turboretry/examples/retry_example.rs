//! Example: Retrying an unreliable call with backoff policies
//!
//! This example demonstrates:
//! 1. Simple retry with exponential backoff and a retry cap
//! 2. Leaving permanent errors out of the retry loop
//! 3. Bounding the whole run with a deadline
//! 4. Jitter impact (run multiple times to see variance)
//!
//! Run with:
//! ```bash
//! cargo run -p turboretry --example retry_example
//! ```

use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use turboretry::prelude::*;

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: AtomicU32,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.fail_count {
            println!("  Attempt {attempt}: FAILED (simulating transient error)");
            Err(io::Error::other(format!("transient error on attempt {attempt}")))
        } else {
            println!("  Attempt {attempt}: SUCCESS");
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn quick_backoff(randomization_factor: f64) -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .initial_interval(Duration::from_millis(100))
        .multiplier(2.0)
        .randomization_factor(randomization_factor)
        .build()
}

/// Example 1: Simple retry with exponential backoff
async fn example_simple_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Simple Retry with Exponential Backoff ===\n");

    // No jitter for predictable output
    let backoff = quick_backoff(0.0).with_max_retries(3);
    let api = UnreliableApi::new(2);

    println!("Calling unreliable API (will fail 2 times before succeeding)...");
    let start = Instant::now();

    let result = retry_notify(
        || api.call(),
        backoff,
        |err, delay| println!("  -> {err}, retrying in {delay:?}"),
    )
    .await?;

    println!("\nResult: {result}");
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 100ms + 200ms = ~300ms");

    Ok(())
}

/// Example 2: Permanent errors are returned as a value, not retried
async fn example_permanent_errors() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Permanent Errors Skip the Retry Loop ===\n");

    let attempts = &AtomicU32::new(0);
    let outcome = retry(
        move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let err = if attempt < 3 {
                io::Error::new(io::ErrorKind::TimedOut, "network timeout")
            } else {
                io::Error::new(io::ErrorKind::PermissionDenied, "auth failed")
            };
            println!("  Attempt {attempt}: {err}");

            match err.kind() {
                // Transient: hand it to the retry loop
                io::ErrorKind::TimedOut => Err(err),
                // Permanent: succeed with the error so the loop stops
                _ => Ok(Err::<(), _>(err)),
            }
        },
        quick_backoff(0.0).with_max_retries(5),
    )
    .await?;

    println!("\nOutcome after {} attempts: {outcome:?}", attempts.load(Ordering::SeqCst));
    assert!(outcome.is_err());

    Ok(())
}

/// Example 3: A deadline cuts the run short between attempts
async fn example_deadline() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Deadline ===\n");

    let deadline = Deadline::timeout(Duration::from_millis(250));
    let api = UnreliableApi::new(u32::MAX);

    let result = retry_with_cancel(
        &deadline,
        || api.call(),
        ConstantBackoff::new(Duration::from_millis(100)),
    )
    .await;

    match result {
        Err(RetryError::Cancelled(reason)) => {
            println!("\nStopped: {reason} after {} attempts", api.total_attempts())
        }
        other => println!("\nUnexpected outcome: {other:?}"),
    }

    Ok(())
}

/// Example 4: Jitter demonstration
async fn example_jitter_impact() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 4: Jitter Impact (Run 5 Times) ===\n");

    for (label, factor) in [("Without jitter", 0.0), ("With 30% jitter", 0.3)] {
        println!("{label}:");
        let mut total = 0.0;
        for run in 1..=5 {
            let api = UnreliableApi::new(1);
            let start = Instant::now();
            let _ = retry(|| api.call(), quick_backoff(factor)).await;

            let elapsed = start.elapsed();
            total += elapsed.as_millis() as f64;
            println!("  Run {run}: {elapsed:?}");
        }
        println!("  Average: {:.1}ms\n", total / 5.0);
    }

    println!("Analysis:");
    println!("  No jitter: All delays should be very similar (~100ms)");
    println!("  With jitter: Delays should vary (70-130ms range)");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================================");
    println!("   TurboRetry: Retry Examples");
    println!("==============================================");

    example_simple_retry().await?;
    example_permanent_errors().await?;
    example_deadline().await?;
    example_jitter_impact().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}

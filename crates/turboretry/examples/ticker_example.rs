//! Example: Driving attempts from a backoff ticker
//!
//! A ticker only supplies timing. The loop body decides whether the attempt
//! succeeded and stops the ticker when it did.
//!
//! Run with:
//! ```bash
//! cargo run -p turboretry --example ticker_example
//! ```

use futures::StreamExt;
use std::time::Duration;
use turboretry::prelude::*;

#[tokio::main]
async fn main() {
    println!("=== Ticker: stop from the consumer ===\n");

    let backoff = ExponentialBackoff::builder()
        .initial_interval(Duration::from_millis(50))
        .randomization_factor(0.0)
        .build();
    let mut ticker = Ticker::new(backoff);
    let started = tokio::time::Instant::now();
    let mut attempt = 0;

    while let Some(tick) = ticker.tick().await {
        attempt += 1;
        println!("  Tick {attempt} at +{:?}", tick - started);
        if attempt == 4 {
            println!("  Attempt {attempt} succeeded, stopping");
            ticker.stop();
        }
    }

    println!("\n=== Ticker as a stream with a retry cap ===\n");

    let capped = ConstantBackoff::new(Duration::from_millis(20)).with_max_retries(3);
    let ticks: Vec<_> = Ticker::new(capped).collect().await;
    println!("  Policy gave up after {} ticks", ticks.len());
}

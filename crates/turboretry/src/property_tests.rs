//! Property-based tests for the backoff policies
//!
//! Uses proptest to check the policy invariants across arbitrary tunings
//! instead of a handful of hand-picked configurations.

use crate::backoff::{BackoffPolicy, ConstantBackoff, ExponentialBackoff, StopBackoff};
use proptest::prelude::*;
use std::time::Duration;

// ===== Strategy Generators =====

fn arb_interval_ms() -> impl Strategy<Value = u64> {
    1u64..10_000u64
}

fn arb_factor() -> impl Strategy<Value = f64> {
    0.0f64..=1.0f64
}

fn arb_multiplier() -> impl Strategy<Value = f64> {
    1.0f64..4.0f64
}

fn exponential(initial_ms: u64, max_ms: u64, factor: f64, multiplier: f64) -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .initial_interval(Duration::from_millis(initial_ms))
        .max_interval(Duration::from_millis(max_ms))
        .randomization_factor(factor)
        .multiplier(multiplier)
        .without_max_elapsed_time()
        .build()
}

// ===== Exponential Properties =====

proptest! {
    /// Property: every delay lies within the jitter window of the interval it was drawn from
    /// Invariant: interval*(1-f) <= delay <= interval*(1+f)
    #[test]
    fn prop_delay_within_jitter_window(
        initial_ms in arb_interval_ms(),
        max_ms in arb_interval_ms(),
        factor in arb_factor(),
        multiplier in arb_multiplier(),
    ) {
        let mut backoff = exponential(initial_ms, max_ms, factor, multiplier);

        for _ in 0..20 {
            let interval = backoff.current_interval().as_secs_f64();
            let delay = backoff.next_delay().expect("no elapsed-time budget").as_secs_f64();

            // One nanosecond of slack for the float -> Duration conversion.
            let slack = 1e-9;
            prop_assert!(delay >= interval * (1.0 - factor) - slack,
                "delay {} below window of {} (factor {})", delay, interval, factor);
            prop_assert!(delay <= interval * (1.0 + factor) + slack,
                "delay {} above window of {} (factor {})", delay, interval, factor);
        }
    }

    /// Property: the interval driving each call never shrinks and never exceeds the cap
    /// Invariant: current_interval is monotone non-decreasing and <= max_interval
    #[test]
    fn prop_interval_monotone_and_capped(
        initial_ms in arb_interval_ms(),
        max_ms in arb_interval_ms(),
        factor in arb_factor(),
        multiplier in arb_multiplier(),
    ) {
        let mut backoff = exponential(initial_ms, max_ms, factor, multiplier);
        let max = Duration::from_millis(max_ms);

        let mut previous = backoff.current_interval();
        prop_assert!(previous <= max);

        for _ in 0..50 {
            backoff.next_delay();
            let current = backoff.current_interval();
            prop_assert!(current >= previous, "{:?} shrank to {:?}", previous, current);
            prop_assert!(current <= max, "{:?} exceeds cap {:?}", current, max);
            previous = current;
        }
    }

    /// Property: reset restores the initial interval
    /// Invariant: after reset, current_interval == min(initial, max)
    #[test]
    fn prop_reset_restores_initial_interval(
        initial_ms in arb_interval_ms(),
        max_ms in arb_interval_ms(),
        calls in 0usize..30,
    ) {
        let mut backoff = exponential(initial_ms, max_ms, 0.5, 2.0);
        for _ in 0..calls {
            backoff.next_delay();
        }
        backoff.reset();

        let expected = Duration::from_millis(initial_ms.min(max_ms));
        prop_assert_eq!(backoff.current_interval(), expected);
    }
}

// ===== Fixed Policy Properties =====

proptest! {
    /// Property: constant backoff always returns its interval
    /// Invariant: next_delay() == Some(interval) on every call
    #[test]
    fn prop_constant_never_stops(interval_ms in 0u64..1_000_000, calls in 1usize..100) {
        let mut backoff = ConstantBackoff::new(Duration::from_millis(interval_ms));
        for _ in 0..calls {
            prop_assert_eq!(backoff.next_delay(), Some(Duration::from_millis(interval_ms)));
        }
    }

    /// Property: stop backoff gives up on every call, including the first
    /// Invariant: next_delay() == None regardless of history
    #[test]
    fn prop_stop_always_stops(calls in 1usize..100, resets in 0usize..3) {
        let mut backoff = StopBackoff;
        for _ in 0..resets {
            backoff.reset();
        }
        for _ in 0..calls {
            prop_assert_eq!(backoff.next_delay(), None);
        }
    }
}

//! Exponential backoff with jitter.

use super::BackoffPolicy;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Default interval handed out (before jitter) by the first call: 500ms.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
/// Default randomization factor: delays vary by ±50%.
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;
/// Default growth factor: each interval is 50% longer than the last.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
/// Default cap for the (pre-jitter) interval: 60s.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);
/// Default total time budget for a run: 15 minutes.
pub const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(15 * 60);

/// Exponentially growing delays with symmetric jitter and an optional
/// elapsed-time budget.
///
/// # Mathematical Formula
///
/// For each call to [`next_delay`](BackoffPolicy::next_delay):
/// ```text
/// if elapsed > max_elapsed_time: give up
/// delay = random(current * (1 - factor), current * (1 + factor))
/// current = min(current * multiplier, max_interval)
/// ```
///
/// `max_interval` caps the interval the jitter is applied to, not the
/// randomized delay itself. With the defaults the sequence looks like:
///
/// ```text
/// call | interval (s) | delay range (s)
/// -----|--------------|----------------
///  1   | 0.5          | [0.25,  0.75]
///  2   | 0.75         | [0.375, 1.125]
///  3   | 1.125        | [0.562, 1.687]
///  4   | 1.687        | [0.843, 2.53]
/// ```
///
/// # Examples
///
/// ```rust
/// use turboretry::backoff::{BackoffPolicy, ExponentialBackoff};
/// use std::time::Duration;
///
/// // Defaults: initial=500ms, factor=0.5, multiplier=1.5, max=60s, budget=15min
/// let backoff = ExponentialBackoff::default();
///
/// // Custom configuration
/// let mut backoff = ExponentialBackoff::builder()
///     .initial_interval(Duration::from_millis(100))
///     .max_interval(Duration::from_secs(30))
///     .multiplier(2.0)
///     .randomization_factor(0.0)
///     .build();
///
/// assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
/// assert_eq!(backoff.next_delay(), Some(Duration::from_millis(200)));
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    current_interval: Duration,
    randomization_factor: f64,
    multiplier: f64,
    max_interval: Duration,
    max_elapsed_time: Option<Duration>,
    start_time: Instant,
}

impl ExponentialBackoff {
    /// Create an exponential backoff with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for configuring exponential backoff.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use turboretry::backoff::ExponentialBackoff;
    /// use std::time::Duration;
    ///
    /// let backoff = ExponentialBackoff::builder()
    ///     .initial_interval(Duration::from_millis(100))
    ///     .build();
    /// ```
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Interval used by the first call after construction or reset.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Interval the next call will randomize around.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Jitter factor in `0.0..=1.0`.
    pub fn randomization_factor(&self) -> f64 {
        self.randomization_factor
    }

    /// Growth factor applied after every call.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Cap for the current interval.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Elapsed-time budget, `None` if the policy never gives up on its own.
    pub fn max_elapsed_time(&self) -> Option<Duration> {
        self.max_elapsed_time
    }

    /// Time since construction or the last [`reset`](BackoffPolicy::reset).
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn increment_current_interval(&mut self) {
        let current = self.current_interval.as_secs_f64();
        let max = self.max_interval.as_secs_f64();

        // Comparing against max / multiplier keeps the product from overflowing.
        self.current_interval = if current >= max / self.multiplier {
            self.max_interval
        } else {
            Duration::try_from_secs_f64(current * self.multiplier)
                .map_or(self.max_interval, |next| {
                    next.max(self.current_interval).min(self.max_interval)
                })
        };
    }
}

impl Default for ExponentialBackoff {
    /// Create an exponential backoff with sensible defaults.
    ///
    /// Defaults:
    /// - `initial_interval`: 500ms
    /// - `randomization_factor`: 0.5 (±50%)
    /// - `multiplier`: 1.5
    /// - `max_interval`: 60s
    /// - `max_elapsed_time`: 15 minutes
    fn default() -> Self {
        ExponentialBackoffBuilder::default().build()
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        if self
            .max_elapsed_time
            .is_some_and(|budget| self.elapsed() > budget)
        {
            return None;
        }

        let delay = randomized_interval(self.current_interval, self.randomization_factor);
        self.increment_current_interval();
        Some(delay)
    }

    fn reset(&mut self) {
        self.current_interval = self.initial_interval.min(self.max_interval);
        self.start_time = Instant::now();
    }
}

/// Draws uniformly from `[interval * (1 - factor), interval * (1 + factor)]`.
fn randomized_interval(interval: Duration, factor: f64) -> Duration {
    if factor == 0.0 || interval.is_zero() {
        return interval;
    }

    let secs = interval.as_secs_f64();
    let delta = secs * factor;
    let low = (secs - delta).max(0.0);
    let high = secs + delta;

    let jittered = rand::thread_rng().gen_range(low..=high);
    Duration::try_from_secs_f64(jittered).unwrap_or(interval)
}

/// Builder for configuring `ExponentialBackoff`.
///
/// Provides a fluent API for setting backoff parameters. Unset parameters
/// fall back to the `DEFAULT_*` constants of this module.
///
/// # Examples
///
/// ```rust
/// use turboretry::backoff::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .initial_interval(Duration::from_millis(100))
///     .max_interval(Duration::from_secs(30))
///     .multiplier(2.0)
///     .randomization_factor(0.1)
///     .max_elapsed_time(Duration::from_secs(120))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    initial_interval: Option<Duration>,
    randomization_factor: Option<f64>,
    multiplier: Option<f64>,
    max_interval: Option<Duration>,
    max_elapsed_time: Option<Option<Duration>>,
}

impl ExponentialBackoffBuilder {
    /// Set the interval used by the first call.
    ///
    /// Default: 500ms
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = Some(interval);
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    ///
    /// A factor of 0.5 means each delay can vary by ±50% around the current
    /// interval. Values outside the range are clamped; NaN disables jitter.
    ///
    /// Default: 0.5
    pub fn randomization_factor(mut self, factor: f64) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        self.randomization_factor = Some(factor);
        self
    }

    /// Set the growth factor applied after every call.
    ///
    /// Values below 1.0 would shrink the interval and are raised to 1.0.
    ///
    /// Default: 1.5
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier.max(1.0));
        self
    }

    /// Set the cap for the (pre-jitter) interval.
    ///
    /// Default: 60s
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }

    /// Set the total time budget after which the policy gives up.
    ///
    /// `Duration::ZERO` disables the budget, same as
    /// [`without_max_elapsed_time`](Self::without_max_elapsed_time).
    ///
    /// Default: 15 minutes
    pub fn max_elapsed_time(mut self, budget: Duration) -> Self {
        self.max_elapsed_time = Some((!budget.is_zero()).then_some(budget));
        self
    }

    /// Never give up on elapsed time alone.
    pub fn without_max_elapsed_time(mut self) -> Self {
        self.max_elapsed_time = Some(None);
        self
    }

    /// Build the `ExponentialBackoff` instance.
    ///
    /// The elapsed-time clock starts now.
    pub fn build(self) -> ExponentialBackoff {
        let initial_interval = self.initial_interval.unwrap_or(DEFAULT_INITIAL_INTERVAL);
        let max_interval = self.max_interval.unwrap_or(DEFAULT_MAX_INTERVAL);

        ExponentialBackoff {
            initial_interval,
            current_interval: initial_interval.min(max_interval),
            randomization_factor: self
                .randomization_factor
                .unwrap_or(DEFAULT_RANDOMIZATION_FACTOR),
            multiplier: self.multiplier.unwrap_or(DEFAULT_MULTIPLIER),
            max_interval,
            max_elapsed_time: self
                .max_elapsed_time
                .unwrap_or(Some(DEFAULT_MAX_ELAPSED_TIME)),
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> ExponentialBackoffBuilder {
        ExponentialBackoff::builder().randomization_factor(0.0)
    }

    #[test]
    fn test_exponential_delay_calculation() {
        let mut backoff = no_jitter()
            .initial_interval(Duration::from_millis(100))
            .max_interval(Duration::from_secs(10))
            .multiplier(2.0)
            .build();

        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(800)));
    }

    #[test]
    fn test_default_sequence_without_jitter() {
        let mut backoff = no_jitter().build();

        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(500)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(750)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_micros(1_125_000)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_micros(1_687_500)));
    }

    #[test]
    fn test_max_interval_cap() {
        let mut backoff = no_jitter()
            .initial_interval(Duration::from_secs(1))
            .max_interval(Duration::from_secs(5))
            .multiplier(10.0)
            .build();

        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
        for _ in 0..10 {
            assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
        }
        assert_eq!(backoff.current_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_initial_interval_above_max_is_capped() {
        let mut backoff = no_jitter()
            .initial_interval(Duration::from_secs(10))
            .max_interval(Duration::from_secs(5))
            .build();

        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_jitter_variation() {
        let mut backoff = ExponentialBackoff::builder()
            .initial_interval(Duration::from_secs(1))
            .multiplier(1.0)
            .randomization_factor(0.5)
            .build();

        let delays: Vec<Duration> = (0..20).filter_map(|_| backoff.next_delay()).collect();

        for delay in &delays {
            let millis = delay.as_millis();
            assert!(
                (500..=1500).contains(&millis),
                "Delay with 50% jitter should be in range [500ms, 1500ms], got {}ms",
                millis
            );
        }

        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "With randomization, delays should vary");
    }

    #[test]
    fn test_reset_restores_initial_interval() {
        let mut backoff = no_jitter().build();
        for _ in 0..5 {
            backoff.next_delay();
        }
        assert!(backoff.current_interval() > backoff.initial_interval());

        backoff.reset();
        assert_eq!(backoff.current_interval(), DEFAULT_INITIAL_INTERVAL);
        assert_eq!(backoff.next_delay(), Some(DEFAULT_INITIAL_INTERVAL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_elapsed_time() {
        let mut backoff = ExponentialBackoff::builder()
            .max_elapsed_time(Duration::from_secs(60))
            .build();

        assert!(backoff.next_delay().is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.next_delay(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restarts_elapsed_clock() {
        let mut backoff = ExponentialBackoff::builder()
            .max_elapsed_time(Duration::from_secs(60))
            .build();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(backoff.next_delay(), None);

        backoff.reset();
        assert_eq!(backoff.elapsed(), Duration::ZERO);
        assert!(backoff.next_delay().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_never_gives_up() {
        let mut backoff = ExponentialBackoff::builder()
            .max_elapsed_time(Duration::ZERO)
            .build();
        assert_eq!(backoff.max_elapsed_time(), None);

        tokio::time::advance(Duration::from_secs(24 * 60 * 60)).await;
        assert!(backoff.next_delay().is_some());
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = ExponentialBackoff::builder().build();

        assert_eq!(backoff.initial_interval(), Duration::from_millis(500));
        assert_eq!(backoff.randomization_factor(), 0.5);
        assert_eq!(backoff.multiplier(), 1.5);
        assert_eq!(backoff.max_interval(), Duration::from_secs(60));
        assert_eq!(backoff.max_elapsed_time(), Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_builder_custom_values() {
        let backoff = ExponentialBackoff::builder()
            .initial_interval(Duration::from_millis(200))
            .max_interval(Duration::from_secs(30))
            .multiplier(2.5)
            .randomization_factor(0.2)
            .without_max_elapsed_time()
            .build();

        assert_eq!(backoff.initial_interval(), Duration::from_millis(200));
        assert_eq!(backoff.max_interval(), Duration::from_secs(30));
        assert_eq!(backoff.multiplier(), 2.5);
        assert_eq!(backoff.randomization_factor(), 0.2);
        assert_eq!(backoff.max_elapsed_time(), None);
    }

    #[test]
    fn test_builder_clamps_out_of_range_values() {
        let backoff = ExponentialBackoff::builder()
            .randomization_factor(2.0)
            .multiplier(0.5)
            .build();
        assert_eq!(backoff.randomization_factor(), 1.0);
        assert_eq!(backoff.multiplier(), 1.0);

        let backoff = ExponentialBackoff::builder()
            .randomization_factor(-0.5)
            .build();
        assert_eq!(backoff.randomization_factor(), 0.0);

        let backoff = ExponentialBackoff::builder()
            .randomization_factor(f64::NAN)
            .build();
        assert_eq!(backoff.randomization_factor(), 0.0);
    }

    #[test]
    fn test_full_jitter_stays_within_double_interval() {
        let mut backoff = ExponentialBackoff::builder()
            .initial_interval(Duration::from_millis(10))
            .multiplier(1.0)
            .randomization_factor(1.0)
            .build();
        for _ in 0..50 {
            let delay = backoff.next_delay().unwrap();
            assert!(delay <= Duration::from_millis(20), "got {delay:?}");
        }
    }
}

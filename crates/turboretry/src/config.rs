//! Declarative retry configuration.
//!
//! Lets applications keep their backoff settings in a config file and turn
//! them into a policy at startup. Durations are plain milliseconds so the
//! same shape works in TOML, JSON and environment-derived maps.
//!
//! # Examples
//!
//! ```rust
//! use turboretry::config::RetryConfig;
//! use turboretry::BackoffPolicy;
//! use std::time::Duration;
//!
//! let config: RetryConfig = serde_json::from_str(
//!     r#"{ "max_retries": 1, "backoff": { "strategy": "constant", "interval_ms": 250 } }"#,
//! )?;
//!
//! let mut policy = config.into_policy()?;
//! assert_eq!(policy.next_delay(), Some(Duration::from_millis(250)));
//! assert_eq!(policy.next_delay(), None);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::backoff::{
    BackoffPolicy, BackoffPolicyExt, ConstantBackoff, DEFAULT_INITIAL_INTERVAL,
    DEFAULT_MAX_ELAPSED_TIME, DEFAULT_MAX_INTERVAL, DEFAULT_MULTIPLIER,
    DEFAULT_RANDOMIZATION_FACTOR, ExponentialBackoff, StopBackoff, ZeroBackoff,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which backoff strategy to use, tagged by `strategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// [`ExponentialBackoff`] with the given tuning.
    Exponential(ExponentialConfig),

    /// [`ConstantBackoff`].
    Constant {
        /// Delay between attempts.
        interval_ms: u64,
    },

    /// [`ZeroBackoff`].
    Zero,

    /// [`StopBackoff`].
    Stop,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig::Exponential(ExponentialConfig::default())
    }
}

impl BackoffConfig {
    /// Check the configured values without building a policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            BackoffConfig::Exponential(config) => config.validate(),
            BackoffConfig::Constant { .. } | BackoffConfig::Zero | BackoffConfig::Stop => Ok(()),
        }
    }

    /// Build the configured policy.
    pub fn into_policy(self) -> Result<Box<dyn BackoffPolicy>, ConfigError> {
        Ok(match self {
            BackoffConfig::Exponential(config) => Box::new(config.build()?),
            BackoffConfig::Constant { interval_ms } => {
                Box::new(ConstantBackoff::new(Duration::from_millis(interval_ms)))
            }
            BackoffConfig::Zero => Box::new(ZeroBackoff),
            BackoffConfig::Stop => Box::new(StopBackoff),
        })
    }
}

/// Tuning for [`ExponentialBackoff`]. Missing fields take the crate defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentialConfig {
    /// First interval, before jitter.
    pub initial_interval_ms: u64,
    /// Jitter factor in `0.0..=1.0`.
    pub randomization_factor: f64,
    /// Growth factor, at least 1.0.
    pub multiplier: f64,
    /// Cap for the interval.
    pub max_interval_ms: u64,
    /// Total time budget; 0 disables it.
    pub max_elapsed_time_ms: u64,
}

impl Default for ExponentialConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL.as_millis() as u64,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
            multiplier: DEFAULT_MULTIPLIER,
            max_interval_ms: DEFAULT_MAX_INTERVAL.as_millis() as u64,
            max_elapsed_time_ms: DEFAULT_MAX_ELAPSED_TIME.as_millis() as u64,
        }
    }
}

impl ExponentialConfig {
    /// Reject values the builder would otherwise silently clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::InvalidMultiplier(self.multiplier));
        }
        if !(0.0..=1.0).contains(&self.randomization_factor) {
            return Err(ConfigError::InvalidRandomizationFactor(
                self.randomization_factor,
            ));
        }
        Ok(())
    }

    /// Validate and build the policy. The elapsed-time clock starts now.
    pub fn build(&self) -> Result<ExponentialBackoff, ConfigError> {
        self.validate()?;
        Ok(ExponentialBackoff::builder()
            .initial_interval(Duration::from_millis(self.initial_interval_ms))
            .randomization_factor(self.randomization_factor)
            .multiplier(self.multiplier)
            .max_interval(Duration::from_millis(self.max_interval_ms))
            .max_elapsed_time(Duration::from_millis(self.max_elapsed_time_ms))
            .build())
    }
}

/// A backoff strategy plus an optional retry cap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Strategy deciding the delays.
    pub backoff: BackoffConfig,
    /// Give up after this many retries, whatever the strategy says.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl RetryConfig {
    /// Build the configured policy, capped by `max_retries` when set.
    pub fn into_policy(self) -> Result<Box<dyn BackoffPolicy>, ConfigError> {
        let policy = self.backoff.into_policy()?;
        Ok(match self.max_retries {
            Some(max_retries) => Box::new(policy.with_max_retries(max_retries)),
            None => policy,
        })
    }
}

//! Integration tests for file-based retry configuration

use std::io;
use std::time::Duration;
use turboretry::ConfigError;
use turboretry::config::{BackoffConfig, ExponentialConfig, RetryConfig};
use turboretry::prelude::*;

#[test]
fn test_toml_exponential_with_partial_tuning() {
    let config: RetryConfig = toml::from_str(
        r#"
        max_retries = 5

        [backoff]
        strategy = "exponential"
        initial_interval_ms = 100
        multiplier = 2.0
        max_elapsed_time_ms = 0
        "#,
    )
    .unwrap();

    let BackoffConfig::Exponential(exponential) = &config.backoff else {
        panic!("expected exponential strategy, got {:?}", config.backoff);
    };
    assert_eq!(exponential.initial_interval_ms, 100);
    assert_eq!(exponential.multiplier, 2.0);
    // Unset fields keep the defaults.
    assert_eq!(
        exponential.randomization_factor,
        ExponentialConfig::default().randomization_factor
    );
    assert_eq!(config.max_retries, Some(5));

    let backoff = exponential.build().unwrap();
    assert_eq!(backoff.initial_interval(), Duration::from_millis(100));
    assert_eq!(backoff.max_elapsed_time(), None);
}

#[test]
fn test_toml_fixed_strategies() {
    let zero: RetryConfig = toml::from_str("[backoff]\nstrategy = \"zero\"\n").unwrap();
    assert_eq!(zero.backoff, BackoffConfig::Zero);
    assert_eq!(zero.max_retries, None);

    let stop: RetryConfig = toml::from_str("[backoff]\nstrategy = \"stop\"\n").unwrap();
    let mut policy = stop.into_policy().unwrap();
    assert_eq!(policy.next_delay(), None);
}

#[test]
fn test_empty_document_uses_defaults() {
    let config: RetryConfig = toml::from_str("").unwrap();
    assert_eq!(config, RetryConfig::default());
    assert_eq!(
        config.backoff,
        BackoffConfig::Exponential(ExponentialConfig::default())
    );
}

#[test]
fn test_unknown_strategy_rejected() {
    let result: Result<RetryConfig, _> =
        toml::from_str("[backoff]\nstrategy = \"fibonacci\"\n");
    assert!(result.is_err());
}

#[test]
fn test_invalid_tuning_rejected_at_build() {
    let config: RetryConfig = serde_json::from_str(
        r#"{ "backoff": { "strategy": "exponential", "multiplier": 0.25 } }"#,
    )
    .unwrap();

    assert_eq!(
        config.backoff.validate(),
        Err(ConfigError::InvalidMultiplier(0.25))
    );
    let err = config.into_policy().unwrap_err();
    assert_eq!(
        err.to_string(),
        "multiplier must be a finite number >= 1.0, got 0.25"
    );
}

#[test]
fn test_json_serialization_omits_unset_cap() {
    let config = RetryConfig {
        backoff: BackoffConfig::Stop,
        max_retries: None,
    };
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json, serde_json::json!({ "backoff": { "strategy": "stop" } }));
}

#[tokio::test(start_paused = true)]
async fn test_retry_with_configured_policy() {
    let config: RetryConfig = toml::from_str(
        r#"
        max_retries = 2

        [backoff]
        strategy = "constant"
        interval_ms = 50
        "#,
    )
    .unwrap();
    let policy = config.into_policy().unwrap();
    assert!(format!("{policy:?}").contains("ConstantBackoff"));

    let mut calls = 0;
    let mut delays = Vec::new();
    let result: Result<(), io::Error> = retry_notify(
        || {
            calls += 1;
            async { Err(io::Error::other("still down")) }
        },
        policy,
        |_, delay| delays.push(delay),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(calls, 3);
    assert_eq!(delays, vec![Duration::from_millis(50); 2]);
}

//! Integration tests for the negotiation countdown.
//!
//! All async tests run with paused time: `sleep_until` resolves as soon as
//! the runtime is idle, and the clock jumps to the deadline, so elapsed
//! times can be asserted exactly.

use std::time::Duration;

use baduk_countdown::{Countdown, CountdownConfig};
use tokio::time::Instant;

// =========================================================================
// CountdownConfig
// =========================================================================

#[test]
fn test_default_config_is_five_seconds() {
    let cfg = CountdownConfig::default();
    assert_eq!(cfg.start, 5);
    assert_eq!(cfg.period, Duration::from_secs(1));
    assert_eq!(cfg.window(), Duration::from_secs(5));
}

#[test]
fn test_from_secs_keeps_one_second_period() {
    let cfg = CountdownConfig::from_secs(3);
    assert_eq!(cfg.start, 3);
    assert_eq!(cfg.period, Duration::from_secs(1));
}

#[test]
fn test_validated_replaces_zero_period() {
    let cfg = CountdownConfig {
        start: 5,
        period: Duration::ZERO,
    }
    .validated();
    assert_eq!(cfg.period, Duration::from_secs(1));
}

#[test]
fn test_validated_keeps_valid_config() {
    let cfg = CountdownConfig {
        start: 2,
        period: Duration::from_millis(250),
    };
    assert_eq!(cfg.clone().validated(), cfg);
}

// =========================================================================
// Ticking
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_next_tick_yields_values_then_expires() {
    let start = Instant::now();
    let mut countdown = Countdown::new(CountdownConfig::default());

    for (expected, at) in [(5, 0), (4, 1), (3, 2), (2, 3), (1, 4)] {
        assert_eq!(countdown.next_tick().await, Some(expected));
        assert_eq!(start.elapsed(), Duration::from_secs(at));
    }
    assert_eq!(countdown.remaining(), 0);
    assert!(!countdown.is_finished());

    assert_eq!(countdown.next_tick().await, None);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert!(countdown.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_next_tick_after_expiry_returns_immediately() {
    let mut countdown = Countdown::new(CountdownConfig::from_secs(1));
    assert_eq!(countdown.next_tick().await, Some(1));
    assert_eq!(countdown.next_tick().await, None);

    let after = Instant::now();
    assert_eq!(countdown.next_tick().await, None);
    assert_eq!(after.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_zero_start_expires_immediately() {
    let start = Instant::now();
    let mut countdown = Countdown::new(CountdownConfig::from_secs(0));
    assert_eq!(countdown.next_tick().await, None);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_custom_period() {
    let start = Instant::now();
    let mut countdown = Countdown::new(CountdownConfig {
        start: 2,
        period: Duration::from_millis(100),
    });

    assert_eq!(countdown.next_tick().await, Some(2));
    assert_eq!(countdown.next_tick().await, Some(1));
    assert_eq!(countdown.next_tick().await, None);
    assert_eq!(start.elapsed(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_slow_consumer_does_not_stretch_window() {
    let start = Instant::now();
    let mut countdown = Countdown::new(CountdownConfig::default());
    assert_eq!(countdown.next_tick().await, Some(5));

    // The consumer stalls past two deadlines.
    tokio::time::advance(Duration::from_millis(2500)).await;

    assert_eq!(countdown.next_tick().await, Some(4));
    assert_eq!(countdown.next_tick().await, Some(3));
    assert_eq!(start.elapsed(), Duration::from_millis(2500));

    // Back on the original schedule.
    assert_eq!(countdown.next_tick().await, Some(2));
    assert_eq!(start.elapsed(), Duration::from_secs(3));

    assert_eq!(countdown.next_tick().await, Some(1));
    assert_eq!(countdown.next_tick().await, None);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

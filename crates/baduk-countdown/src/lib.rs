//! Fixed-cadence countdown timer for baduk color negotiation.
//!
//! A [`Countdown`] yields `start, start - 1, ..., 1`, one value per period,
//! and then reports expiry one period after the last value. The first value
//! is yielded immediately.
//!
//! ```text
//! t=0s  t=1s  t=2s  t=3s  t=4s  t=5s
//!   5     4     3     2     1   expired
//! ```
//!
//! Deadlines are computed from the start instant, not from when the caller
//! got around to polling, so a slow consumer never stretches the window.
//!
//! # Integration
//!
//! The room spawns the countdown on its own task and forwards each value
//! into the room actor:
//!
//! ```ignore
//! let mut countdown = Countdown::new(config);
//! while let Some(remaining) = countdown.next_tick().await {
//!     events.send(Tick { epoch, remaining })?;
//! }
//! events.send(Expired { epoch })?;
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Countdown parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownConfig {
    /// First value yielded. Default: 5.
    pub start: u32,
    /// Time between values, and between the last value and expiry.
    /// Default: 1 second.
    pub period: Duration,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            start: 5,
            period: Duration::from_secs(1),
        }
    }
}

impl CountdownConfig {
    /// Create a config that counts down from `start` once per second.
    pub fn from_secs(start: u32) -> Self {
        Self {
            start,
            ..Default::default()
        }
    }

    /// Replace out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`Countdown::new`]. A zero period would make
    /// every deadline the same instant, so it is reset to the default.
    pub fn validated(mut self) -> Self {
        if self.period.is_zero() {
            let fallback = Self::default().period;
            warn!(?fallback, "countdown period is zero, using default");
            self.period = fallback;
        }
        self
    }

    /// Total time from the first value to expiry.
    pub fn window(&self) -> Duration {
        self.period * self.start
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// A single run of the countdown.
///
/// Not restartable: a new negotiation builds a new `Countdown`.
#[derive(Debug)]
pub struct Countdown {
    config: CountdownConfig,
    /// Values still to be yielded.
    remaining: u32,
    /// When the next value (or expiry) is due.
    deadline: Instant,
    finished: bool,
}

impl Countdown {
    /// Creates a countdown whose first value is due now.
    pub fn new(config: CountdownConfig) -> Self {
        let config = config.validated();
        debug!(start = config.start, period = ?config.period, "countdown created");
        Self {
            remaining: config.start,
            deadline: Instant::now(),
            finished: false,
            config,
        }
    }

    /// Waits for the next value.
    ///
    /// Returns `Some(n)` for each of `start..=1` and `None` once the window
    /// has expired. After expiry every call returns `None` immediately.
    pub async fn next_tick(&mut self) -> Option<u32> {
        if self.finished {
            return None;
        }

        let due = self.deadline;
        time::sleep_until(due).await;

        let late_by = Instant::now().saturating_duration_since(due);
        if late_by > self.config.period / 10 {
            warn!(
                remaining = self.remaining,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "countdown tick fired late"
            );
        }

        if self.remaining == 0 {
            self.finished = true;
            trace!("countdown expired");
            return None;
        }

        let value = self.remaining;
        self.remaining -= 1;
        // Keep the original cadence even if this tick was late.
        self.deadline = due + self.config.period;
        trace!(value, "countdown tick");
        Some(value)
    }

    /// Values not yet yielded.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether expiry has been reported.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }
}

//! # Fibonacci Backoff
//!
//! Requeue delays for FrontApps whose reconciliation keeps failing.
//! The delay grows along the Fibonacci sequence from a base step and is
//! capped; the first success resets it.
//!
//! With the defaults (5s base, 300s cap): 5s, 5s, 10s, 15s, 25s, 40s, 65s,
//! 105s, 170s, 275s, 300s.
//!
//! A failing key is retried at least once per cap. Keys without an error for
//! twice the cap are no longer retried and are dropped.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default base step of the sequence
pub const DEFAULT_MIN: Duration = Duration::from_secs(5);

/// Default cap of the sequence
pub const DEFAULT_MAX: Duration = Duration::from_secs(300);

/// Fibonacci backoff calculator
#[derive(Debug, Clone, Copy)]
pub struct FibonacciBackoff {
    min: Duration,
    max: Duration,
}

impl FibonacciBackoff {
    /// Create a backoff stepping by `min` and capped at `max`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Delay after `error_count` consecutive errors (1-indexed).
    ///
    /// The first two delays are both `min`.
    #[must_use]
    pub fn delay_for(&self, error_count: u32) -> Duration {
        let mut prev = Duration::ZERO;
        let mut current = self.min;
        for _ in 1..error_count {
            let next = prev.saturating_add(current);
            prev = current;
            current = next;
            if current >= self.max {
                return self.max;
            }
        }
        current.min(self.max)
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_MIN, DEFAULT_MAX)
    }
}

/// Consecutive error count and time of the last error of one key
#[derive(Debug, Clone, Copy)]
struct ErrorCount {
    count: u32,
    last: Instant,
}

/// Consecutive error counts per FrontApp key
#[derive(Debug, Default)]
pub struct BackoffTracker {
    backoff: FibonacciBackoff,
    error_counts: Mutex<HashMap<String, ErrorCount>>,
}

impl BackoffTracker {
    /// Create a tracker using `backoff` for the delays
    pub fn new(backoff: FibonacciBackoff) -> Self {
        Self {
            backoff,
            error_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Record an error for `key` and return the delay before the next attempt
    pub fn next_delay(&self, key: &str) -> Duration {
        self.next_delay_at(key, Instant::now())
    }

    fn next_delay_at(&self, key: &str, now: Instant) -> Duration {
        let stale_after = self.backoff.max.saturating_mul(2);
        let count = match self.error_counts.lock() {
            Ok(mut counts) => {
                counts.retain(|_, entry| now.saturating_duration_since(entry.last) <= stale_after);
                let entry = counts
                    .entry(key.to_string())
                    .or_insert(ErrorCount { count: 0, last: now });
                entry.count = entry.count.saturating_add(1);
                entry.last = now;
                entry.count
            }
            // Poisoned: fall back to the longest delay
            Err(_) => return self.backoff.max,
        };
        self.backoff.delay_for(count)
    }

    /// Forget the errors of `key` after a successful reconcile
    pub fn reset(&self, key: &str) {
        if let Ok(mut counts) = self.error_counts.lock() {
            counts.remove(key);
        }
    }
}

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

const WINDOW_SECS: i64 = 60;

/// # Summary
/// Global sliding-window limiter over confirmed dispatches.
///
/// # Invariants
/// - Holds only timestamps of committed sends; an evaluation alone never adds one.
/// - After `admit(now)`, every held timestamp satisfies `now - t < 60s`.
/// - Not keyed by subject: one noisy subject can starve the others.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_per_minute: usize,
    window: VecDeque<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        Self {
            max_per_minute,
            window: VecDeque::with_capacity(max_per_minute),
        }
    }

    /// # Summary
    /// Prunes expired timestamps, then reports whether one more send fits.
    ///
    /// # Logic
    /// 1. Drop every timestamp with `now - t >= 60s`.
    /// 2. Admit while the remaining count is below the limit.
    pub fn admit(&mut self, now: DateTime<Utc>) -> bool {
        let window = Duration::seconds(WINDOW_SECS);
        // retain rather than pop_front: a clock moved backwards breaks ordering
        self.window.retain(|t| now.signed_duration_since(*t) < window);
        self.window.len() < self.max_per_minute
    }

    /// Records one confirmed send.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.window.push_back(now);
    }

    /// Timestamps currently held (pruned lazily by `admit`).
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn max_per_minute(&self) -> usize {
        self.max_per_minute
    }
}

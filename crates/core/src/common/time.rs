use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// # Summary
/// Clock abstraction that decouples the alert core from the system clock.
/// Cooldowns, the rate window and history timestamps all read time through it,
/// so one process always uses a single consistent time base.
pub trait TimeProvider: Send + Sync {
    /// Current time as seen by the component.
    fn now(&self) -> DateTime<Utc>;
}

/// # Summary
/// Wall clock used in production.
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// Manually driven clock for tests and replays.
///
/// # Invariants
/// - Thread safe: the current instant sits behind a `RwLock`.
/// - A poisoned lock is recovered rather than propagated; the stored value is a
///   plain `DateTime` and cannot be left half-written.
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    /// Creates a clock frozen at `initial_time`.
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// Jumps the clock to `new_time` (may move backwards).
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *time = new_time;
    }

    /// Moves the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *time += Duration::seconds(secs);
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

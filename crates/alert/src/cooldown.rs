use chrono::{DateTime, Duration, Utc};
use koban_core::alert::entity::{AlertRecord, CooldownKey};
use koban_core::config::CooldownConfig;
use std::collections::HashMap;

/// # Summary
/// Result of a cooldown lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suppression {
    pub suppressed: bool,
    /// Seconds until the key is free again; 0 when not suppressed
    pub remaining_secs: f64,
}

impl Suppression {
    const FREE: Suppression = Suppression {
        suppressed: false,
        remaining_secs: 0.0,
    };
}

/// # Summary
/// Last confirmed dispatch per (subject, kind) and the suppression it implies.
///
/// # Invariants
/// - At most one record per key; `commit` overwrites.
/// - The window length comes from the *stored* record's priority, not the
///   priority of the condition currently being evaluated.
#[derive(Debug, Clone)]
pub struct CooldownStore {
    durations: CooldownConfig,
    records: HashMap<CooldownKey, AlertRecord>,
}

impl CooldownStore {
    pub fn new(durations: CooldownConfig) -> Self {
        Self {
            durations,
            records: HashMap::new(),
        }
    }

    /// # Summary
    /// Checks whether `key` is still inside the window of its last send.
    ///
    /// # Logic
    /// 1. No record: free.
    /// 2. `elapsed = now - sent_at`; suppressed iff `elapsed < duration(record.priority)`.
    pub fn is_suppressed(&self, key: &CooldownKey, now: DateTime<Utc>) -> Suppression {
        let Some(record) = self.records.get(key) else {
            return Suppression::FREE;
        };
        let window = self.durations.duration_for(record.priority);
        let elapsed = now.signed_duration_since(record.sent_at);
        if elapsed < window {
            let remaining = window - elapsed;
            #[allow(clippy::cast_precision_loss)]
            let remaining_secs = remaining.num_milliseconds() as f64 / 1000.0;
            Suppression {
                suppressed: true,
                remaining_secs,
            }
        } else {
            Suppression::FREE
        }
    }

    /// Stores `record` as the latest send for `key`.
    pub fn commit(&mut self, key: CooldownKey, record: AlertRecord) {
        self.records.insert(key, record);
    }

    /// # Summary
    /// Drops records whose age reached `max_age`.
    ///
    /// # Logic
    /// 1. A non-positive `max_age` clears the store outright.
    /// 2. Otherwise keep a record iff `now - sent_at < max_age`.
    ///
    /// # Returns
    /// Number of removed records.
    pub fn sweep(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        if max_age <= Duration::zero() {
            self.records.clear();
        } else {
            self.records
                .retain(|_, record| now.signed_duration_since(record.sent_at) < max_age);
        }
        before - self.records.len()
    }

    pub fn get(&self, key: &CooldownKey) -> Option<&AlertRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use koban_core::alert::entity::{ConditionKind, Priority};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn record(priority: Priority, sent_at: DateTime<Utc>) -> AlertRecord {
        AlertRecord {
            subject_id: "alpha".to_string(),
            kind: ConditionKind::Pump,
            priority,
            price: 1.0,
            sent_at,
        }
    }

    #[test]
    fn test_unknown_key_is_free() {
        let store = CooldownStore::new(CooldownConfig::default());
        let key = CooldownKey::new("alpha", ConditionKind::Pump);
        assert_eq!(store.is_suppressed(&key, t0()), Suppression::FREE);
    }

    #[test]
    fn test_window_follows_stored_priority() {
        let mut store = CooldownStore::new(CooldownConfig::default());
        let key = CooldownKey::new("alpha", ConditionKind::Pump);
        store.commit(key.clone(), record(Priority::High, t0()));

        let s = store.is_suppressed(&key, t0() + Duration::seconds(1799));
        assert!(s.suppressed);
        assert_eq!(s.remaining_secs, 1.0);

        assert!(!store.is_suppressed(&key, t0() + Duration::seconds(1800)).suppressed);
    }

    #[test]
    fn test_low_priority_record_holds_for_two_hours() {
        let mut store = CooldownStore::new(CooldownConfig::default());
        let key = CooldownKey::new("alpha", ConditionKind::Pump);
        store.commit(key.clone(), record(Priority::Low, t0()));
        assert!(store.is_suppressed(&key, t0() + Duration::seconds(7199)).suppressed);
        assert!(!store.is_suppressed(&key, t0() + Duration::seconds(7200)).suppressed);
    }

    #[test]
    fn test_sweep_drops_old_records_only() {
        let mut store = CooldownStore::new(CooldownConfig::default());
        store.commit(
            CooldownKey::new("old", ConditionKind::Pump),
            record(Priority::Low, t0()),
        );
        store.commit(
            CooldownKey::new("new", ConditionKind::Pump),
            record(Priority::Low, t0() + Duration::hours(23)),
        );
        let removed = store.sweep(Duration::hours(24), t0() + Duration::hours(24));
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_with_zero_age_clears_everything() {
        let mut store = CooldownStore::new(CooldownConfig::default());
        store.commit(
            CooldownKey::new("alpha", ConditionKind::Pump),
            record(Priority::High, t0()),
        );
        assert_eq!(store.sweep(Duration::zero(), t0()), 1);
        assert!(store.is_empty());
    }
}

use crate::cooldown::CooldownStore;
use crate::filter::{QualityFilter, QualityVerdict};
use crate::priority::PriorityClassifier;
use crate::rate_limiter::RateLimiter;
use chrono::{DateTime, Duration, Utc};
use koban_core::alert::entity::{
    AlertCounters, AlertRecord, AlertStats, ConditionKind, CooldownKey, Decision, Priority,
};
use koban_core::alert::error::AlertError;
use koban_core::common::time::TimeProvider;
use koban_core::config::AlertConfig;
use koban_core::market::entity::MarketSnapshot;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// # Summary
/// Decision core: runs the rate, quality and cooldown gates for a candidate
/// alert and records confirmed sends.
///
/// # Invariants
/// - Sole mutator of the rate window, cooldown store and counters.
/// - `evaluate` never touches the rate window or the cooldown store; only
///   `commit` does, so an abandoned approval leaves no trace.
/// - `commit` is accepted only for a key holding an unconsumed approval.
/// - Callers serialize access (`&mut self`); the scanner wraps it in a mutex.
pub struct AlertDecisionEngine {
    clock: Arc<dyn TimeProvider>,
    rate_limiter: RateLimiter,
    filter: QualityFilter,
    classifier: PriorityClassifier,
    cooldowns: CooldownStore,
    counters: AlertCounters,
    // approvals handed out by `evaluate` and not yet committed
    pending: HashMap<CooldownKey, DateTime<Utc>>,
}

impl AlertDecisionEngine {
    /// # Summary
    /// Builds an engine with empty state.
    ///
    /// # Arguments
    /// * `config`: rate limit, cooldown windows and filter thresholds.
    /// * `clock`: time source; tests inject `FakeClockProvider`.
    pub fn new(config: &AlertConfig, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            clock,
            rate_limiter: RateLimiter::new(config.max_per_minute),
            filter: QualityFilter::new(config.filter.clone()),
            classifier: PriorityClassifier,
            cooldowns: CooldownStore::new(config.cooldown.clone()),
            counters: AlertCounters::default(),
            pending: HashMap::new(),
        }
    }

    /// # Summary
    /// Decides whether a detected condition may be dispatched now.
    ///
    /// # Logic
    /// 1. Count the evaluation.
    /// 2. Rate limiter: blocked with reason `"rate limit"`.
    /// 3. Quality filter: blocked with the filter's reason.
    /// 4. Cooldown of `(subject_id, kind)`: blocked with the remaining minutes.
    /// 5. Otherwise approved; the key is remembered until `commit`.
    ///
    /// # Arguments
    /// * `priority_hint`: overrides the classifier. It only affects the
    ///   priority later passed to `commit`, never the gates above.
    pub fn evaluate(
        &mut self,
        subject_id: &str,
        kind: ConditionKind,
        snapshot: &MarketSnapshot,
        priority_hint: Option<Priority>,
    ) -> Decision {
        let now = self.clock.now();
        self.counters.total_evaluations += 1;
        let priority = priority_hint.unwrap_or_else(|| self.classifier.classify(kind, snapshot));

        if !self.rate_limiter.admit(now) {
            self.counters.blocked_rate_limit += 1;
            debug!(subject = subject_id, %kind, "Blocked by rate limit");
            return Decision::blocked("rate limit", priority);
        }

        if let QualityVerdict::Reject(reason) = self.filter.check(snapshot) {
            self.counters.blocked_filter += 1;
            debug!(subject = subject_id, %kind, %reason, "Blocked by quality filter");
            return Decision::blocked(reason, priority);
        }

        let key = CooldownKey::new(subject_id, kind);
        let suppression = self.cooldowns.is_suppressed(&key, now);
        if suppression.suppressed {
            self.counters.blocked_cooldown += 1;
            let reason = format!(
                "cooldown active ({:.1} min remaining)",
                suppression.remaining_secs / 60.0
            );
            debug!(subject = subject_id, %kind, %reason, "Blocked by cooldown");
            return Decision::blocked(reason, priority);
        }

        self.pending.insert(key, now);
        Decision::approved(priority)
    }

    /// # Summary
    /// Records a confirmed dispatch.
    ///
    /// # Logic
    /// 1. Consume the pending approval of `(subject_id, kind)`; none means a caller bug.
    /// 2. Overwrite the cooldown record and append to the rate window.
    /// 3. Count the approval.
    ///
    /// # Returns
    /// The stored record, or `AlertError::NotEvaluated`.
    pub fn commit(
        &mut self,
        subject_id: &str,
        kind: ConditionKind,
        priority: Priority,
        price: f64,
    ) -> Result<AlertRecord, AlertError> {
        let key = CooldownKey::new(subject_id, kind);
        if self.pending.remove(&key).is_none() {
            return Err(AlertError::NotEvaluated(key.to_string()));
        }

        let now = self.clock.now();
        let record = AlertRecord {
            subject_id: subject_id.to_string(),
            kind,
            priority,
            price,
            sent_at: now,
        };
        self.cooldowns.commit(key, record.clone());
        self.rate_limiter.record(now);
        self.counters.approved += 1;
        info!(subject = subject_id, %kind, %priority, price, "Alert committed");
        Ok(record)
    }

    /// # Summary
    /// Evicts cooldown records (and stale approvals) older than `max_age_hours`.
    ///
    /// # Returns
    /// Number of evicted cooldown records.
    pub fn cleanup(&mut self, max_age_hours: u64) -> usize {
        let now = self.clock.now();
        let hours = i64::try_from(max_age_hours).unwrap_or(i64::MAX);
        let max_age = Duration::try_hours(hours).unwrap_or(Duration::MAX);

        let removed = self.cooldowns.sweep(max_age, now);
        if max_age <= Duration::zero() {
            self.pending.clear();
        } else {
            self.pending
                .retain(|_, at| now.signed_duration_since(*at) < max_age);
        }
        if removed > 0 {
            info!(removed, max_age_hours, "Cooldown records evicted");
        }
        removed
    }

    /// # Summary
    /// Counters plus success rate and active cooldown count.
    pub fn stats(&self) -> AlertStats {
        let total = self.counters.total_evaluations;
        let success_rate = if total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let rate = self.counters.approved as f64 / total as f64;
            rate
        };
        AlertStats {
            counters: self.counters.clone(),
            success_rate,
            active_cooldowns: self.cooldowns.len(),
        }
    }

    /// Zeroes the counters. Cooldowns and the rate window are kept.
    pub fn reset_stats(&mut self) {
        self.counters = AlertCounters::default();
        info!("Alert statistics reset");
    }

    /// Priority the classifier assigns to `kind` for `snapshot`.
    pub fn classify(&self, kind: ConditionKind, snapshot: &MarketSnapshot) -> Priority {
        self.classifier.classify(kind, snapshot)
    }

    /// Number of confirmed sends inside the current rate window, as last pruned.
    pub fn rate_window_len(&self) -> usize {
        self.rate_limiter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use koban_core::common::time::FakeClockProvider;
    use koban_core::testing::snapshot;

    fn engine() -> (AlertDecisionEngine, Arc<FakeClockProvider>) {
        let clock = Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let engine = AlertDecisionEngine::new(&AlertConfig::default(), clock.clone());
        (engine, clock)
    }

    fn healthy() -> MarketSnapshot {
        snapshot("alpha", 1.2, 60.0, 5e6, 2e8)
    }

    #[test]
    fn test_rate_limit_checked_before_filter() {
        let (mut engine, _) = engine();
        for i in 0..5 {
            let id = format!("s{}", i);
            assert!(engine.evaluate(&id, ConditionKind::Pump, &healthy(), None).approved);
            engine.commit(&id, ConditionKind::Pump, Priority::Low, 1.0).unwrap();
        }
        let junk = snapshot("junk", 0.0, 0.0, 0.0, 0.0);
        let d = engine.evaluate("junk", ConditionKind::Pump, &junk, None);
        assert_eq!(d.reason, "rate limit");
        assert_eq!(engine.stats().counters.blocked_rate_limit, 1);
        assert_eq!(engine.stats().counters.blocked_filter, 0);
    }

    #[test]
    fn test_hint_overrides_classifier_but_not_gates() {
        let (mut engine, _) = engine();
        let thin = snapshot("alpha", 1.0, 60.0, 10.0, 2e8);
        let d = engine.evaluate("alpha", ConditionKind::Pump, &thin, Some(Priority::High));
        assert!(!d.approved);
        assert_eq!(d.priority, Priority::High);
        assert!(d.reason.starts_with("low volume"));
    }

    #[test]
    fn test_commit_without_approval_is_rejected() {
        let (mut engine, _) = engine();
        let err = engine
            .commit("alpha", ConditionKind::Pump, Priority::Low, 1.0)
            .unwrap_err();
        assert_eq!(err, AlertError::NotEvaluated("alpha|PUMP".to_string()));
        assert_eq!(engine.stats().counters.approved, 0);
    }

    #[test]
    fn test_approval_is_consumed_by_commit() {
        let (mut engine, _) = engine();
        assert!(engine.evaluate("alpha", ConditionKind::Pump, &healthy(), None).approved);
        assert!(engine.commit("alpha", ConditionKind::Pump, Priority::Medium, 1.2).is_ok());
        assert!(engine.commit("alpha", ConditionKind::Pump, Priority::Medium, 1.2).is_err());
    }

    #[test]
    fn test_blocked_evaluation_cannot_be_committed() {
        let (mut engine, _) = engine();
        let thin = snapshot("alpha", 1.0, 60.0, 10.0, 2e8);
        assert!(!engine.evaluate("alpha", ConditionKind::Pump, &thin, None).approved);
        assert!(engine.commit("alpha", ConditionKind::Pump, Priority::Low, 1.0).is_err());
    }

    #[test]
    fn test_reset_stats_keeps_cooldowns() {
        let (mut engine, _) = engine();
        engine.evaluate("alpha", ConditionKind::Pump, &healthy(), None);
        engine.commit("alpha", ConditionKind::Pump, Priority::Medium, 1.2).unwrap();
        engine.reset_stats();
        let stats = engine.stats();
        assert_eq!(stats.counters, AlertCounters::default());
        assert_eq!(stats.active_cooldowns, 1);
        assert_eq!(engine.rate_window_len(), 1);
    }

    #[test]
    fn test_cleanup_drops_stale_approvals() {
        let (mut engine, clock) = engine();
        engine.evaluate("alpha", ConditionKind::Pump, &healthy(), None);
        clock.advance_secs(2 * 3600);
        engine.cleanup(1);
        assert!(engine.commit("alpha", ConditionKind::Pump, Priority::Medium, 1.2).is_err());
    }
}

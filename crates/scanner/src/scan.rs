use crate::error::ScannerError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use koban_alert::AlertDecisionEngine;
use koban_alert::detector::ConditionDetector;
use koban_alert::template::{AlertMessage, MessageTemplate};
use koban_alert::whale::WhaleTracker;
use koban_core::alert::entity::{ConditionKind, Priority};
use koban_core::cache::port::{Cache, CacheExt};
use koban_core::common::time::TimeProvider;
use koban_core::config::{ScannerConfig, WhaleConfig};
use koban_core::market::entity::MarketSnapshot;
use koban_core::market::port::SnapshotSource;
use koban_core::notify::port::Notifier;
use koban_core::store::port::{AlertHistoryEntry, AlertHistoryStore};
use koban_core::whale::entity::WhaleStats;
use koban_core::whale::port::WhaleSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Decision engine shared between the scan loop and the control surface.
pub type SharedEngine = Arc<Mutex<AlertDecisionEngine>>;

/// # Summary
/// What happened to one candidate alert.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectOutcome {
    /// No condition detected
    Quiet,
    /// Engine said no; carries the reason
    Blocked(String),
    /// Delivered and committed
    Sent(Priority),
    /// Snapshot fetch failed (transport)
    FetchFailed(String),
    /// Dispatch failed (transport); nothing committed
    SendFailed(String),
}

/// # Summary
/// Summary of one scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub sent: usize,
    pub blocked: usize,
    pub failures: u32,
    /// Failure burst reached; the rest of the cycle was skipped
    pub aborted: bool,
    /// Stop requested during the cycle
    pub stopped: bool,
}

/// # Summary
/// Result of a manual or periodic cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CleanupReport {
    pub cooldowns_removed: usize,
    pub history_purged: u64,
}

/// # Summary
/// Loop-level counters since process start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScanStats {
    pub cycles_completed: u64,
    pub cycles_aborted: u64,
    pub fetch_failures: u64,
    pub send_failures: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

struct WhaleWatch {
    source: Arc<dyn WhaleSource>,
    tracker: Mutex<WhaleTracker>,
    config: WhaleConfig,
}

/// # Summary
/// One scan cycle and the collaborators it drives.
///
/// # Invariants
/// - Commit only follows a confirmed dispatch; a failed send leaves engine state untouched.
/// - Transport failures never escape a cycle: they are logged and counted.
/// - The engine lock is never held across network I/O.
pub struct Scanner {
    config: ScannerConfig,
    engine: SharedEngine,
    source: Arc<dyn SnapshotSource>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn Cache>,
    history: Arc<dyn AlertHistoryStore>,
    clock: Arc<dyn TimeProvider>,
    whales: Option<WhaleWatch>,
    detector: ConditionDetector,
    stats: Mutex<ScanStats>,
    last_cleanup: Mutex<DateTime<Utc>>,
}

impl Scanner {
    /// # Summary
    /// Wires a scanner from its ports.
    ///
    /// # Arguments
    /// * `config`: subjects, pacing, failure burst and housekeeping settings.
    /// * `engine`: decision core, shared with the control surface.
    /// * `clock`: the engine's clock; cleanup ticks and history timestamps use it too.
    pub fn new(
        config: ScannerConfig,
        engine: SharedEngine,
        source: Arc<dyn SnapshotSource>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn Cache>,
        history: Arc<dyn AlertHistoryStore>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        let started = clock.now();
        Self {
            config,
            engine,
            source,
            notifier,
            cache,
            history,
            clock,
            whales: None,
            detector: ConditionDetector,
            stats: Mutex::new(ScanStats::default()),
            last_cleanup: Mutex::new(started),
        }
    }

    /// Enables the whale pass at the end of each cycle.
    pub fn with_whales(mut self, source: Arc<dyn WhaleSource>, config: WhaleConfig) -> Self {
        let tracker = WhaleTracker::new(self.clock.now());
        self.whales = Some(WhaleWatch {
            source,
            tracker: Mutex::new(tracker),
            config,
        });
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    pub fn history(&self) -> &Arc<dyn AlertHistoryStore> {
        &self.history
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn whales_enabled(&self) -> bool {
        self.whales.as_ref().is_some_and(|w| w.source.enabled())
    }

    pub async fn scan_stats(&self) -> ScanStats {
        self.stats.lock().await.clone()
    }

    pub async fn whale_stats(&self) -> Option<WhaleStats> {
        match &self.whales {
            Some(w) => Some(w.tracker.lock().await.stats()),
            None => None,
        }
    }

    /// Latest snapshot per subject, sorted by subject id.
    pub async fn prices(&self) -> Result<Vec<(String, MarketSnapshot)>, ScannerError> {
        Ok(self.cache.values::<MarketSnapshot>().await?)
    }

    /// # Summary
    /// Checks one subject end to end.
    ///
    /// # Logic
    /// 1. Fetch the snapshot; failure is a transport failure.
    /// 2. Refresh the price cache.
    /// 3. Detect a condition; none means nothing to do.
    /// 4. Evaluate, dispatch, and commit on confirmed delivery.
    pub async fn check_subject(&self, subject_id: &str) -> SubjectOutcome {
        let snapshot = match self.source.fetch(subject_id).await {
            Ok(s) => s,
            Err(e) => {
                warn!(subject = subject_id, error = %e, "Snapshot fetch failed");
                return SubjectOutcome::FetchFailed(e.to_string());
            }
        };

        if let Err(e) = self.cache.set(subject_id, &snapshot).await {
            warn!(subject = subject_id, error = %e, "Price cache update failed");
        }

        let Some(kind) = self.detector.detect(&snapshot) else {
            return SubjectOutcome::Quiet;
        };

        self.dispatch(subject_id, kind, &snapshot, |priority, now| {
            MessageTemplate::format_alert(kind, priority, &snapshot, now)
        })
        .await
    }

    /// # Summary
    /// Evaluate, send, commit, mirror.
    ///
    /// # Logic
    /// 1. Evaluate under the engine lock; blocked decisions stop here.
    /// 2. Render and send with the lock released.
    /// 3. On success, commit under the lock and append the history row.
    async fn dispatch<F>(
        &self,
        subject_id: &str,
        kind: ConditionKind,
        snapshot: &MarketSnapshot,
        render: F,
    ) -> SubjectOutcome
    where
        F: FnOnce(Priority, DateTime<Utc>) -> AlertMessage,
    {
        let decision = self
            .engine
            .lock()
            .await
            .evaluate(subject_id, kind, snapshot, None);
        if !decision.approved {
            debug!(subject = subject_id, %kind, reason = %decision.reason, "Alert withheld");
            return SubjectOutcome::Blocked(decision.reason);
        }

        let message = render(decision.priority, self.clock.now());
        if let Err(e) = self.notifier.notify(&message.subject, &message.body).await {
            warn!(subject = subject_id, %kind, error = %e, "Alert dispatch failed, not committed");
            return SubjectOutcome::SendFailed(e.to_string());
        }

        let committed =
            self.engine
                .lock()
                .await
                .commit(subject_id, kind, decision.priority, snapshot.price);
        let record = match committed {
            Ok(record) => record,
            Err(e) => {
                // approval swept by a concurrent cleanup while the message was in flight
                warn!(subject = subject_id, %kind, error = %e, "Alert sent but not committed");
                return SubjectOutcome::Sent(decision.priority);
            }
        };

        let entry = AlertHistoryEntry::from_record(
            Uuid::new_v4().to_string(),
            &record,
            &snapshot.symbol,
            snapshot.change_24h,
        );
        if let Err(e) = self.history.append(&entry).await {
            error!(subject = subject_id, error = %e, "Failed to mirror alert into history");
        }
        info!(subject = subject_id, %kind, priority = %decision.priority, "Alert sent");
        SubjectOutcome::Sent(decision.priority)
    }

    /// # Summary
    /// Polls the whale source and alerts on transfers of tracked subjects.
    ///
    /// # Logic
    /// 1. Skip when whale tracking is off.
    /// 2. Fetch transfers since the last poll; keep only unseen ones.
    /// 3. Match each transfer's symbol against cached snapshots of tracked subjects.
    /// 4. Dispatch a `WhaleActivity` alert per match with the whale template.
    ///
    /// # Returns
    /// One outcome per dispatched candidate, plus a `FetchFailed` if the poll failed.
    pub async fn check_whales(&self) -> Vec<SubjectOutcome> {
        let Some(watch) = &self.whales else {
            return Vec::new();
        };
        if !watch.source.enabled() {
            return Vec::new();
        }

        let start = watch.tracker.lock().await.last_check();
        let end = self.clock.now();
        let polled = watch
            .source
            .recent_transactions(start, end, watch.config.min_value_usd, watch.config.limit)
            .await;
        let transactions = match polled {
            Ok(txs) => txs,
            Err(e) => {
                warn!(error = %e, "Whale poll failed");
                return vec![SubjectOutcome::FetchFailed(e.to_string())];
            }
        };
        let fresh = watch.tracker.lock().await.observe(end, transactions);
        if fresh.is_empty() {
            return Vec::new();
        }
        info!(count = fresh.len(), "New whale transactions");

        let by_symbol = self.tracked_by_symbol().await;
        let mut outcomes = Vec::new();
        for tx in &fresh {
            let Some((subject_id, snapshot)) = by_symbol.get(&tx.symbol.to_ascii_uppercase())
            else {
                debug!(symbol = %tx.symbol, "Whale transfer for untracked asset");
                continue;
            };
            let outcome = self
                .dispatch(subject_id, ConditionKind::WhaleActivity, snapshot, |priority, _| {
                    MessageTemplate::format_whale(tx, priority, snapshot)
                })
                .await;
            outcomes.push(outcome);
        }
        outcomes
    }

    // cached snapshots of configured subjects, keyed by upper-case symbol
    async fn tracked_by_symbol(&self) -> HashMap<String, (String, MarketSnapshot)> {
        let cached = match self.prices().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Price cache unreadable, skipping whale matching");
                return HashMap::new();
            }
        };
        cached
            .into_iter()
            .filter(|(id, _)| self.config.subjects.contains(id))
            .map(|(id, s)| (s.symbol.to_ascii_uppercase(), (id, s)))
            .collect()
    }

    /// # Summary
    /// Evicts old cooldowns and purges history past retention.
    ///
    /// # Arguments
    /// * `max_age_hours`: cooldown age limit; 0 empties the cooldown store.
    pub async fn cleanup(&self, max_age_hours: u64) -> CleanupReport {
        let cooldowns_removed = self.engine.lock().await.cleanup(max_age_hours);

        let days = i64::try_from(self.config.history_retention_days).unwrap_or(i64::MAX);
        let retention = ChronoDuration::try_days(days).unwrap_or(ChronoDuration::MAX);
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let history_purged = match self.history.purge_before(cutoff).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "History retention purge failed");
                0
            }
        };

        *self.last_cleanup.lock().await = self.clock.now();
        info!(cooldowns_removed, history_purged, "Cleanup completed");
        CleanupReport {
            cooldowns_removed,
            history_purged,
        }
    }

    /// Zeroes engine and whale counters.
    pub async fn reset_stats(&self) {
        self.engine.lock().await.reset_stats();
        if let Some(w) = &self.whales {
            w.tracker.lock().await.reset_stats();
        }
    }

    /// # Summary
    /// Runs one pass over all subjects.
    ///
    /// # Logic
    /// 1. Check subjects in order, pausing `subject_delay_secs` between them.
    /// 2. Count transport failures; at `failure_burst` abandon the cycle.
    /// 3. Run the whale pass, then the cleanup tick when due.
    /// 4. Log the cycle's statistics.
    ///
    /// A stop request is honored at the pauses only, never mid-subject.
    pub async fn run_cycle(&self, stop: &mut watch::Receiver<bool>) -> CycleReport {
        let mut report = CycleReport::default();
        let subjects = self.config.subjects.clone();

        for (i, subject_id) in subjects.iter().enumerate() {
            if i > 0 && !pause(stop, self.config.subject_delay_secs).await {
                report.stopped = true;
                return report;
            }
            let outcome = self.check_subject(subject_id).await;
            self.tally(&mut report, &outcome).await;
            if self.burst_reached(&mut report) {
                break;
            }
        }

        if !report.aborted {
            for outcome in self.check_whales().await {
                self.tally(&mut report, &outcome).await;
            }
            self.burst_reached(&mut report);
        }

        self.cleanup_if_due().await;

        let engine_stats = self.engine.lock().await.stats();
        {
            let mut stats = self.stats.lock().await;
            if report.aborted {
                stats.cycles_aborted += 1;
            } else {
                stats.cycles_completed += 1;
            }
            stats.last_cycle_at = Some(self.clock.now());
        }
        info!(
            checked = report.checked,
            sent = engine_stats.counters.approved,
            cooldown = engine_stats.counters.blocked_cooldown,
            filtered = engine_stats.counters.blocked_filter,
            rate_limited = engine_stats.counters.blocked_rate_limit,
            aborted = report.aborted,
            "Scan cycle finished"
        );
        report
    }

    async fn tally(&self, report: &mut CycleReport, outcome: &SubjectOutcome) {
        match outcome {
            SubjectOutcome::Quiet => report.checked += 1,
            SubjectOutcome::Blocked(_) => {
                report.checked += 1;
                report.blocked += 1;
            }
            SubjectOutcome::Sent(_) => {
                report.checked += 1;
                report.sent += 1;
            }
            SubjectOutcome::FetchFailed(_) => {
                report.failures += 1;
                self.stats.lock().await.fetch_failures += 1;
            }
            SubjectOutcome::SendFailed(_) => {
                report.checked += 1;
                report.failures += 1;
                self.stats.lock().await.send_failures += 1;
            }
        }
    }

    // marks the cycle aborted once the failure burst is hit
    fn burst_reached(&self, report: &mut CycleReport) -> bool {
        let burst = self.config.failure_burst;
        if burst > 0 && report.failures >= burst && !report.aborted {
            warn!(failures = report.failures, "Failure burst reached, abandoning cycle");
            report.aborted = true;
        }
        report.aborted
    }

    async fn cleanup_if_due(&self) {
        let interval =
            ChronoDuration::try_seconds(i64::try_from(self.config.cleanup_interval_secs).unwrap_or(i64::MAX))
                .unwrap_or(ChronoDuration::MAX);
        let last = *self.last_cleanup.lock().await;
        if self.clock.now().signed_duration_since(last) >= interval {
            self.cleanup(self.config.cooldown_max_age_hours).await;
        }
    }

    /// # Summary
    /// Cooperative scan loop.
    ///
    /// # Logic
    /// 1. Run a cycle.
    /// 2. Sleep `cycle_interval_secs`, or `failure_backoff_secs` after an aborted cycle.
    /// 3. Exit as soon as a stop is observed at a pause.
    pub async fn run(self: Arc<Self>, mut stop: watch::Receiver<bool>) {
        info!(subjects = self.config.subjects.len(), "Scan loop started");
        loop {
            if *stop.borrow() {
                break;
            }
            let report = self.run_cycle(&mut stop).await;
            if report.stopped {
                break;
            }
            let wait = if report.aborted {
                warn!(
                    failures = report.failures,
                    backoff_secs = self.config.failure_backoff_secs,
                    "Failure burst, backing off"
                );
                self.config.failure_backoff_secs
            } else {
                self.config.cycle_interval_secs
            };
            if !pause(&mut stop, wait).await {
                break;
            }
        }
        info!("Scan loop stopped");
    }
}

/// Sleeps `secs` unless a stop arrives first; `false` means stop.
async fn pause(stop: &mut watch::Receiver<bool>, secs: u64) -> bool {
    if *stop.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(secs)) => !*stop.borrow(),
        // a dropped sender counts as a stop too
        _ = stop.changed() => false,
    }
}

use chrono::{DateTime, Utc};
use koban_core::whale::entity::{WhaleSize, WhaleStats, WhaleTransaction};
use std::collections::{HashSet, VecDeque};

/// Ids remembered for deduplication.
pub const SEEN_CAPACITY: usize = 1000;

/// # Summary
/// Deduplicates whale transactions across polls and keeps running totals.
///
/// # Invariants
/// - A `(blockchain, hash)` pair is reported at most once while remembered.
/// - At most `SEEN_CAPACITY` ids are remembered; the oldest are forgotten first.
/// - `last_check` only moves when the caller reports a completed poll.
#[derive(Debug)]
pub struct WhaleTracker {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
    last_check: DateTime<Utc>,
    stats: WhaleStats,
}

impl WhaleTracker {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self::with_capacity(started_at, SEEN_CAPACITY)
    }

    pub fn with_capacity(started_at: DateTime<Utc>, capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
            last_check: started_at,
            stats: WhaleStats::default(),
        }
    }

    /// Start of the window the next poll should cover.
    pub fn last_check(&self) -> DateTime<Utc> {
        self.last_check
    }

    /// # Summary
    /// Folds one poll into the tracker.
    ///
    /// # Logic
    /// 1. Move `last_check` to `polled_at`.
    /// 2. Keep transactions whose id is unseen; count them by size and volume.
    /// 3. Forget the oldest ids beyond capacity.
    ///
    /// # Returns
    /// The new transactions, in input order.
    pub fn observe(
        &mut self,
        polled_at: DateTime<Utc>,
        transactions: Vec<WhaleTransaction>,
    ) -> Vec<WhaleTransaction> {
        self.last_check = polled_at;
        let mut fresh = Vec::new();
        for tx in transactions {
            let id = tx.dedup_id();
            if !self.seen.insert(id.clone()) {
                continue;
            }
            self.order.push_back(id);

            self.stats.total_detected += 1;
            self.stats.total_volume_usd += tx.amount_usd;
            match tx.size {
                WhaleSize::Mega => self.stats.mega += 1,
                WhaleSize::Large => self.stats.large += 1,
                WhaleSize::Medium => self.stats.medium += 1,
                WhaleSize::Small => self.stats.small += 1,
            }
            fresh.push(tx);
        }

        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
        fresh
    }

    pub fn stats(&self) -> WhaleStats {
        WhaleStats {
            tracked_transactions: self.seen.len(),
            ..self.stats.clone()
        }
    }

    /// Zeroes the counters; remembered ids are kept.
    pub fn reset_stats(&mut self) {
        self.stats = WhaleStats::default();
    }
}

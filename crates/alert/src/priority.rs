use koban_core::alert::entity::{ConditionKind, Priority};
use koban_core::market::entity::MarketSnapshot;

const PUMP_HIGH_CHANGE: f64 = 100.0;
const PUMP_MEDIUM_CHANGE: f64 = 50.0;
const STRONG_BUY_HIGH_CAP: f64 = 1_000_000_000.0;

/// # Summary
/// Maps a condition and its snapshot to an urgency.
///
/// # Invariants
/// - Rules are tried top to bottom and the first match wins.
/// - Total over `ConditionKind`: every kind ends in some priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityClassifier;

impl PriorityClassifier {
    /// # Summary
    /// Classifies one condition.
    ///
    /// # Logic
    /// 1. Whale activity is always High.
    /// 2. A pump beyond 100% is High; a strong buy on a >1B cap is High.
    /// 3. Other strong buys, pumps beyond 50% and volume spikes are Medium.
    /// 4. Everything else is Low.
    pub fn classify(&self, kind: ConditionKind, snapshot: &MarketSnapshot) -> Priority {
        let change = snapshot.change_24h.abs();
        match kind {
            ConditionKind::WhaleActivity => Priority::High,
            ConditionKind::Pump if change > PUMP_HIGH_CHANGE => Priority::High,
            ConditionKind::StrongBuy if snapshot.market_cap > STRONG_BUY_HIGH_CAP => {
                Priority::High
            }
            ConditionKind::StrongBuy => Priority::Medium,
            ConditionKind::Pump if change > PUMP_MEDIUM_CHANGE => Priority::Medium,
            ConditionKind::VolumeSpike => Priority::Medium,
            ConditionKind::Pump | ConditionKind::PriceDrop => Priority::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koban_core::testing::snapshot;

    #[test]
    fn test_whale_is_always_high() {
        let s = snapshot("alpha", 1.0, 0.0, 0.0, 0.0);
        assert_eq!(
            PriorityClassifier.classify(ConditionKind::WhaleActivity, &s),
            Priority::High
        );
    }

    #[test]
    fn test_pump_thresholds() {
        let c = PriorityClassifier;
        let at = |change| snapshot("alpha", 1.0, change, 0.0, 0.0);
        assert_eq!(c.classify(ConditionKind::Pump, &at(150.0)), Priority::High);
        assert_eq!(c.classify(ConditionKind::Pump, &at(100.0)), Priority::Medium);
        assert_eq!(c.classify(ConditionKind::Pump, &at(60.0)), Priority::Medium);
        assert_eq!(c.classify(ConditionKind::Pump, &at(50.0)), Priority::Low);
    }

    #[test]
    fn test_strong_buy_depends_on_market_cap() {
        let c = PriorityClassifier;
        let big = snapshot("alpha", 1.0, 12.0, 0.0, 2_000_000_000.0);
        let small = snapshot("alpha", 1.0, 12.0, 0.0, 500_000_000.0);
        assert_eq!(c.classify(ConditionKind::StrongBuy, &big), Priority::High);
        assert_eq!(c.classify(ConditionKind::StrongBuy, &small), Priority::Medium);
    }

    #[test]
    fn test_remaining_kinds() {
        let c = PriorityClassifier;
        let s = snapshot("alpha", 1.0, -30.0, 0.0, 0.0);
        assert_eq!(c.classify(ConditionKind::VolumeSpike, &s), Priority::Medium);
        assert_eq!(c.classify(ConditionKind::PriceDrop, &s), Priority::Low);
    }
}

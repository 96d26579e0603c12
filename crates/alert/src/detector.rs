use koban_core::alert::entity::ConditionKind;
use koban_core::market::entity::MarketSnapshot;

const PUMP_CHANGE: f64 = 50.0;
const VOLUME_SPIKE_RATIO: f64 = 0.5;
const PRICE_DROP_CHANGE: f64 = -20.0;
const STRONG_BUY_CHANGE: f64 = 10.0;
const STRONG_BUY_VOLUME: f64 = 100_000_000.0;

/// # Summary
/// Derives at most one condition from a snapshot.
///
/// # Invariants
/// - Pure and stateless.
/// - Rules are tried in order pump, volume spike, price drop, strong buy; the first match wins.
/// - Whale activity never comes from here; it is reported by the whale source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionDetector;

impl ConditionDetector {
    pub fn detect(&self, snapshot: &MarketSnapshot) -> Option<ConditionKind> {
        let change = snapshot.change_24h;
        if change > PUMP_CHANGE {
            Some(ConditionKind::Pump)
        } else if snapshot.volume_24h > VOLUME_SPIKE_RATIO * snapshot.market_cap {
            Some(ConditionKind::VolumeSpike)
        } else if change < PRICE_DROP_CHANGE {
            Some(ConditionKind::PriceDrop)
        } else if change > STRONG_BUY_CHANGE && snapshot.volume_24h > STRONG_BUY_VOLUME {
            Some(ConditionKind::StrongBuy)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koban_core::testing::snapshot;

    #[test]
    fn test_pump_wins_over_volume_spike() {
        let s = snapshot("alpha", 1.0, 60.0, 9e9, 1e9);
        assert_eq!(ConditionDetector.detect(&s), Some(ConditionKind::Pump));
    }

    #[test]
    fn test_volume_spike() {
        let s = snapshot("alpha", 1.0, 0.0, 6e8, 1e9);
        assert_eq!(ConditionDetector.detect(&s), Some(ConditionKind::VolumeSpike));
    }

    #[test]
    fn test_price_drop() {
        let s = snapshot("alpha", 1.0, -25.0, 1e6, 1e9);
        assert_eq!(ConditionDetector.detect(&s), Some(ConditionKind::PriceDrop));
    }

    #[test]
    fn test_strong_buy_needs_volume() {
        let quiet = snapshot("alpha", 1.0, 15.0, 5e7, 1e10);
        let loud = snapshot("alpha", 1.0, 15.0, 2e8, 1e10);
        assert_eq!(ConditionDetector.detect(&quiet), None);
        assert_eq!(ConditionDetector.detect(&loud), Some(ConditionKind::StrongBuy));
    }

    #[test]
    fn test_calm_market_yields_nothing() {
        let s = snapshot("alpha", 1.0, 2.0, 1e7, 1e9);
        assert_eq!(ConditionDetector.detect(&s), None);
    }
}

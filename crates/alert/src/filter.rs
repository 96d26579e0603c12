use koban_core::common::format_amount;
use koban_core::config::FilterConfig;
use koban_core::market::entity::MarketSnapshot;

/// # Summary
/// Verdict of the quality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityVerdict {
    Pass,
    Reject(String),
}

impl QualityVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, QualityVerdict::Pass)
    }
}

/// # Summary
/// Rejects snapshots of thinly traded or implausible markets.
///
/// # Invariants
/// - Stateless; the same snapshot always yields the same verdict.
/// - Checks run in order volume, market cap, price; the first failure wins.
/// - NaN figures fail the check they appear in.
#[derive(Debug, Clone)]
pub struct QualityFilter {
    config: FilterConfig,
}

impl QualityFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// # Summary
    /// Applies the minimum-quality rules to `snapshot`.
    ///
    /// # Returns
    /// `Reject` with a human-readable reason naming the failing figure.
    pub fn check(&self, snapshot: &MarketSnapshot) -> QualityVerdict {
        let volume = snapshot.volume_24h;
        if volume.is_nan() || volume < self.config.min_volume_24h {
            return QualityVerdict::Reject(format!("low volume (${})", format_amount(volume)));
        }

        let cap = snapshot.market_cap;
        if cap.is_nan() || cap < self.config.min_market_cap {
            return QualityVerdict::Reject(format!("low market cap (${})", format_amount(cap)));
        }

        let price = snapshot.price;
        if price.is_nan() || price <= 0.0 {
            return QualityVerdict::Reject(format!("invalid price (${})", price));
        }

        QualityVerdict::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koban_core::testing::snapshot;

    fn filter() -> QualityFilter {
        QualityFilter::new(FilterConfig::default())
    }

    #[test]
    fn test_healthy_market_passes() {
        let s = snapshot("alpha", 2.0, 5.0, 2_000_000.0, 50_000_000.0);
        assert!(filter().check(&s).is_pass());
    }

    #[test]
    fn test_low_volume_reason() {
        let s = snapshot("alpha", 2.0, 5.0, 500_000.0, 50_000_000.0);
        assert_eq!(
            filter().check(&s),
            QualityVerdict::Reject("low volume ($500,000)".to_string())
        );
    }

    #[test]
    fn test_volume_checked_before_market_cap() {
        let s = snapshot("alpha", 2.0, 5.0, 10.0, 10.0);
        assert!(matches!(filter().check(&s), QualityVerdict::Reject(r) if r.starts_with("low volume")));
    }

    #[test]
    fn test_low_market_cap_reason() {
        let s = snapshot("alpha", 2.0, 5.0, 2_000_000.0, 9_999_999.0);
        assert_eq!(
            filter().check(&s),
            QualityVerdict::Reject("low market cap ($9,999,999)".to_string())
        );
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let s = snapshot("alpha", 0.0, 5.0, 2_000_000.0, 50_000_000.0);
        assert!(matches!(filter().check(&s), QualityVerdict::Reject(r) if r.starts_with("invalid price")));
    }

    #[test]
    fn test_nan_volume_rejected() {
        let s = snapshot("alpha", 2.0, 5.0, f64::NAN, 50_000_000.0);
        assert!(!filter().check(&s).is_pass());
    }
}

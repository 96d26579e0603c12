use crate::alert::error::AlertError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// # Summary
/// Category of observed market event that may warrant a notification.
///
/// # Invariants
/// - Closed set. Classification, detection and formatting match on it exhaustively,
///   so adding a variant is a compile error until every consumer handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    StrongBuy,
    WhaleActivity,
    Pump,
    VolumeSpike,
    PriceDrop,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 5] = [
        ConditionKind::StrongBuy,
        ConditionKind::WhaleActivity,
        ConditionKind::Pump,
        ConditionKind::VolumeSpike,
        ConditionKind::PriceDrop,
    ];

    /// Stable identifier used in cooldown keys, storage and the HTTP surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::StrongBuy => "STRONG_BUY",
            ConditionKind::WhaleActivity => "WHALE",
            ConditionKind::Pump => "PUMP",
            ConditionKind::VolumeSpike => "VOLUME_SPIKE",
            ConditionKind::PriceDrop => "PRICE_DROP",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STRONG_BUY" => Ok(ConditionKind::StrongBuy),
            "WHALE" | "WHALE_ACTIVITY" => Ok(ConditionKind::WhaleActivity),
            "PUMP" => Ok(ConditionKind::Pump),
            "VOLUME_SPIKE" => Ok(ConditionKind::VolumeSpike),
            "PRICE_DROP" => Ok(ConditionKind::PriceDrop),
            _ => Err(AlertError::InvalidKind(s.to_string())),
        }
    }
}

/// # Summary
/// Urgency of an alert. Ordered `Low < Medium < High`.
///
/// # Invariants
/// - Higher urgency maps to the *shorter* cooldown (see `CooldownConfig`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    /// Header line used by the message templates.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "🔴 HIGH",
            Priority::Medium => "🟡 MEDIUM",
            Priority::Low => "🟢 LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(AlertError::InvalidPriority(s.to_string())),
        }
    }
}

/// # Summary
/// Composite key of a cooldown entry: `"{subject}|{KIND}"`.
///
/// # Invariants
/// - The kind is always the suffix after the last `|`, and kind names never
///   contain `|`, so distinct (subject, kind) pairs never collide whatever the
///   subject id holds.
/// - Built only from (subject, kind); other snapshot fields never influence it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CooldownKey(String);

impl CooldownKey {
    pub fn new(subject_id: &str, kind: ConditionKind) -> Self {
        Self(format!("{}|{}", subject_id, kind.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// # Summary
/// Most recent confirmed dispatch for one cooldown key.
///
/// # Invariants
/// - Created only by a commit that follows a confirmed send.
/// - At most one record per key; a newer commit overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    // tracked subject (provider id, e.g. "bitcoin")
    pub subject_id: String,
    pub kind: ConditionKind,
    // priority at send time; decides how long the key stays suppressed
    pub priority: Priority,
    // price at send time
    pub price: f64,
    pub sent_at: DateTime<Utc>,
}

/// # Summary
/// Outcome of one evaluation.
///
/// # Invariants
/// - `priority` is the caller's hint when one was given, the classifier's result otherwise.
/// - A blocked decision carries the reason of the first failing gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub approved: bool,
    pub reason: String,
    pub priority: Priority,
}

impl Decision {
    pub fn approved(priority: Priority) -> Self {
        Self {
            approved: true,
            reason: "approved".to_string(),
            priority,
        }
    }

    pub fn blocked(reason: impl Into<String>, priority: Priority) -> Self {
        Self {
            approved: false,
            reason: reason.into(),
            priority,
        }
    }
}

/// # Summary
/// Process-lifetime decision counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlertCounters {
    pub total_evaluations: u64,
    pub approved: u64,
    pub blocked_cooldown: u64,
    pub blocked_filter: u64,
    pub blocked_rate_limit: u64,
}

/// # Summary
/// Counters plus derived figures, as returned by `stats()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertStats {
    #[serde(flatten)]
    pub counters: AlertCounters,
    /// `approved / total_evaluations`, 0 when nothing was evaluated yet
    pub success_rate: f64,
    /// Number of cooldown records currently held
    pub active_cooldowns: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_cooldown_key_ignores_everything_but_subject_and_kind() {
        let a = CooldownKey::new("alpha", ConditionKind::Pump);
        let b = CooldownKey::new("alpha", ConditionKind::Pump);
        let c = CooldownKey::new("alpha", ConditionKind::PriceDrop);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "alpha|PUMP");
    }

    #[test]
    fn test_cooldown_key_with_pipe_in_subject() {
        let keys: Vec<CooldownKey> = ["a|PUMP", "a"]
            .iter()
            .flat_map(|id| ConditionKind::ALL.map(|kind| CooldownKey::new(id, kind)))
            .collect();
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(keys[0].as_str().rsplit_once('|'), Some(("a|PUMP", "STRONG_BUY")));
    }

    #[test]
    fn test_kind_and_priority_parse() {
        for kind in ConditionKind::ALL {
            assert_eq!(kind.as_str().parse::<ConditionKind>().unwrap(), kind);
        }
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(AlertError::InvalidPriority(_))
        ));
    }
}

use chrono::{DateTime, Utc};
use koban_core::alert::entity::{ConditionKind, Priority};
use koban_core::common::format_amount;
use koban_core::market::entity::MarketSnapshot;
use koban_core::whale::entity::WhaleTransaction;

/// # Summary
/// Rendered notification, ready for a `Notifier`.
///
/// # Invariants
/// - `body` uses Telegram-compatible HTML (`<b>` only); dynamic text is escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// # Summary
/// Renders alert and whale messages.
///
/// # Invariants
/// - An alert body always carries kind, priority, subject, price and 24h change,
///   so a sent message can be matched against the history row.
pub struct MessageTemplate;

impl MessageTemplate {
    /// # Summary
    /// Formats an approved condition.
    ///
    /// # Logic
    /// 1. Subject is the kind's emoji and title.
    /// 2. Body: priority header, name/symbol, price with 8 decimals, signed change,
    ///    a kind-specific line, then the UTC send time.
    pub fn format_alert(
        kind: ConditionKind,
        priority: Priority,
        snapshot: &MarketSnapshot,
        at: DateTime<Utc>,
    ) -> AlertMessage {
        let (emoji, title) = Self::heading(kind);
        let change = snapshot.change_24h;
        let extra = match kind {
            ConditionKind::StrongBuy => {
                format!("🏦 Market cap: ${}", format_amount(snapshot.market_cap))
            }
            ConditionKind::WhaleActivity => "📊 Activity: HIGH".to_string(),
            ConditionKind::Pump => format!("📈 {:+.1}% in 24h", change),
            ConditionKind::VolumeSpike => {
                format!("💰 Volume: ${}", format_amount(snapshot.volume_24h))
            }
            ConditionKind::PriceDrop => format!("📉 {:.1}% in 24h", change),
        };

        let mut body = format!("{}\n{} <b>{}</b> [{}]\n\n", priority.label(), emoji, title, kind);
        Self::push_subject_lines(&mut body, snapshot);
        body.push_str(&format!("\n{}", extra));
        body.push_str(&format!("\n\n⏰ {} UTC", at.format("%H:%M:%S")));

        AlertMessage {
            subject: format!("{} {}", emoji, title),
            body,
        }
    }

    /// # Summary
    /// Formats a large-holder transfer matched to a tracked subject.
    ///
    /// # Logic
    /// 1. Action follows the transaction type: mint, burn, anything else is a transfer.
    /// 2. Body: priority header with the `[WHALE]` tag, the subject's name, price and
    ///    24h change, then size label, USD and native amounts, chain, owners, time, short hash.
    pub fn format_whale(
        tx: &WhaleTransaction,
        priority: Priority,
        snapshot: &MarketSnapshot,
    ) -> AlertMessage {
        let (emoji, action) = match tx.transaction_type.to_ascii_lowercase().as_str() {
            "mint" => ("🏭", "MINTED"),
            "burn" => ("🔥", "BURNED"),
            _ => ("🐋", "TRANSFERRED"),
        };

        let mut body = format!(
            "{}\n{} <b>WHALE {}</b> [{}]\n\n",
            priority.label(),
            emoji,
            action,
            ConditionKind::WhaleActivity
        );
        Self::push_subject_lines(&mut body, snapshot);
        body.push_str(&format!("\n{}\n", tx.size.label()));
        body.push_str(&format!("💰 <b>${}</b>\n", format_amount(tx.amount_usd)));
        body.push_str(&format!(
            "📊 {:.2} {}\n\n",
            tx.amount,
            escape_html(&tx.symbol.to_uppercase())
        ));
        body.push_str(&format!("⛓️ {}\n", escape_html(&tx.blockchain.to_uppercase())));
        body.push_str(&format!("📤 From: {}\n", owner_label(&tx.from_owner)));
        body.push_str(&format!("📥 To: {}\n", owner_label(&tx.to_owner)));
        body.push_str(&format!("\n⏰ {} UTC", tx.timestamp.format("%H:%M:%S")));
        if !tx.hash.is_empty() {
            body.push_str(&format!("\n🔗 {}", escape_html(&short_hash(&tx.hash))));
        }

        AlertMessage {
            subject: format!("{} WHALE {}", emoji, action),
            body,
        }
    }

    // name/symbol, price and signed 24h change
    fn push_subject_lines(body: &mut String, snapshot: &MarketSnapshot) {
        body.push_str(&format!(
            "💎 {} ({})\n",
            escape_html(&snapshot.name),
            escape_html(&snapshot.symbol.to_uppercase())
        ));
        body.push_str(&format!("💰 ${:.8}\n", snapshot.price));
        let change = snapshot.change_24h;
        let direction = if change >= 0.0 { "📈" } else { "📉" };
        body.push_str(&format!("{} {:+.2}% (24h)\n", direction, change));
    }

    fn heading(kind: ConditionKind) -> (&'static str, &'static str) {
        match kind {
            ConditionKind::StrongBuy => ("🚀", "STRONG BUY SIGNAL"),
            ConditionKind::WhaleActivity => ("🐋", "WHALE ACTIVITY"),
            ConditionKind::Pump => ("⚡", "PUMP DETECTED"),
            ConditionKind::VolumeSpike => ("📊", "VOLUME SPIKE"),
            ConditionKind::PriceDrop => ("📉", "SIGNIFICANT DROP"),
        }
    }
}

fn owner_label(owner: &str) -> String {
    let label = match owner.to_ascii_lowercase().as_str() {
        "exchange" => "🏦 Exchange",
        "whale" => "🐋 Whale",
        "" | "unknown" => "❓ Unknown",
        "genesis" => "🌟 Genesis",
        "miner" => "⛏️ Miner",
        "ico" => "🚀 ICO",
        "defi" => "🌾 DeFi",
        "merchant" => "🏪 Merchant",
        other => return format!("📍 {}", escape_html(&title_case(other))),
    };
    label.to_string()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// first and last 8 chars; short hashes are kept whole
fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 16 {
        return hash.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use koban_core::testing::snapshot;
    use koban_core::whale::entity::WhaleSize;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_alert_body_is_auditable() {
        let s = snapshot("alpha", 1.2, 60.0, 5e6, 2e8);
        let msg = MessageTemplate::format_alert(ConditionKind::Pump, Priority::Medium, &s, noon());
        assert_eq!(msg.subject, "⚡ PUMP DETECTED");
        assert!(msg.body.starts_with("🟡 MEDIUM"));
        assert!(msg.body.contains("[PUMP]"));
        assert!(msg.body.contains("alpha (ALPHA)"));
        assert!(msg.body.contains("$1.20000000"));
        assert!(msg.body.contains("+60.00% (24h)"));
        assert!(msg.body.ends_with("⏰ 12:30:05 UTC"));
    }

    #[test]
    fn test_volume_spike_shows_grouped_volume() {
        let s = snapshot("alpha", 1.0, 0.0, 6_000_000.0, 1e7);
        let msg =
            MessageTemplate::format_alert(ConditionKind::VolumeSpike, Priority::Medium, &s, noon());
        assert!(msg.body.contains("💰 Volume: $6,000,000"));
    }

    #[test]
    fn test_names_are_escaped() {
        let mut s = snapshot("alpha", 1.0, 0.0, 0.0, 0.0);
        s.name = "A<B>&C".to_string();
        let msg = MessageTemplate::format_alert(ConditionKind::PriceDrop, Priority::Low, &s, noon());
        assert!(msg.body.contains("A&lt;B&gt;&amp;C"));
    }

    #[test]
    fn test_whale_message() {
        let tx = WhaleTransaction {
            hash: "0123456789abcdef0123456789abcdef".to_string(),
            blockchain: "ethereum".to_string(),
            symbol: "eth".to_string(),
            amount: 12_000.5,
            amount_usd: 60_000_000.0,
            from_owner: "exchange".to_string(),
            to_owner: "cold wallet".to_string(),
            timestamp: noon(),
            transaction_type: "burn".to_string(),
            size: WhaleSize::from_usd(60_000_000.0),
        };
        let s = snapshot("ethereum", 3_100.5, -4.25, 2e9, 4e11);
        let msg = MessageTemplate::format_whale(&tx, Priority::High, &s);
        assert_eq!(msg.subject, "🔥 WHALE BURNED");
        assert!(msg.body.starts_with("🔴 HIGH"));
        assert!(msg.body.contains("[WHALE]"));
        assert!(msg.body.contains("ethereum (ETHEREUM)"));
        assert!(msg.body.contains("$3100.50000000"));
        assert!(msg.body.contains("📉 -4.25% (24h)"));
        assert!(msg.body.contains("🔴 MEGA WHALE"));
        assert!(msg.body.contains("$60,000,000"));
        assert!(msg.body.contains("12000.50 ETH"));
        assert!(msg.body.contains("🏦 Exchange"));
        assert!(msg.body.contains("📍 Cold Wallet"));
        assert!(msg.body.contains("01234567...89abcdef"));
    }
}

use chrono::{Duration, TimeZone, Utc};
use koban_core::alert::entity::{AlertRecord, ConditionKind, Priority};
use koban_core::store::port::{AlertHistoryEntry, AlertHistoryStore};
use koban_store::config::set_root_dir;
use koban_store::history::SqliteAlertHistory;
use koban_store::memory::MemoryAlertHistory;
use tempfile::tempdir;

fn entry(subject: &str, kind: ConditionKind, minutes: i64) -> AlertHistoryEntry {
    let record = AlertRecord {
        subject_id: subject.to_string(),
        kind,
        priority: Priority::Medium,
        price: 1.5,
        sent_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes),
    };
    AlertHistoryEntry::from_record(
        uuid::Uuid::new_v4().to_string(),
        &record,
        &subject.to_uppercase(),
        12.5,
    )
}

/// Exercises one store through the whole port contract.
async fn check_contract(store: &dyn AlertHistoryStore) -> anyhow::Result<()> {
    assert_eq!(store.count().await?, 0);
    assert!(store.recent(10).await?.is_empty());

    store.append(&entry("alpha", ConditionKind::Pump, 0)).await?;
    store.append(&entry("beta", ConditionKind::PriceDrop, 10)).await?;
    store.append(&entry("gamma", ConditionKind::WhaleActivity, 20)).await?;
    assert_eq!(store.count().await?, 3);

    let recent = store.recent(2).await?;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].subject_id, "gamma");
    assert_eq!(recent[0].kind, ConditionKind::WhaleActivity);
    assert_eq!(recent[0].symbol, "GAMMA");
    assert_eq!(recent[1].subject_id, "beta");
    assert_eq!(recent[1].priority, Priority::Medium);
    assert_eq!(recent[1].change_24h, 12.5);

    let cutoff = Utc.with_ymd_and_hms(2024, 5, 1, 8, 10, 0).unwrap();
    assert_eq!(store.purge_before(cutoff).await?, 1);
    assert_eq!(store.count().await?, 2);
    assert!(store
        .recent(50)
        .await?
        .iter()
        .all(|e| e.subject_id != "alpha"));
    Ok(())
}

#[tokio::test]
async fn test_sqlite_history_contract() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let store = SqliteAlertHistory::open(&tmp.path().join("history.db")).await?;
    check_contract(&store).await
}

#[tokio::test]
async fn test_memory_history_contract() -> anyhow::Result<()> {
    check_contract(&MemoryAlertHistory::new()).await
}

#[tokio::test]
async fn test_sqlite_history_survives_reopen() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    set_root_dir(tmp.path().to_path_buf());

    {
        let store = SqliteAlertHistory::new().await?;
        store.append(&entry("alpha", ConditionKind::VolumeSpike, 0)).await?;
    }

    let reopened = SqliteAlertHistory::new().await?;
    let rows = reopened.recent(50).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, ConditionKind::VolumeSpike);
    assert!(tmp.path().join("alerts.db").exists());
    Ok(())
}

//! Integration tests for snapshot files on disk

use loyaltychain::account::AccountId;
use loyaltychain::error::ChainError;
use loyaltychain::ledger::Ledger;
use loyaltychain::params::LedgerParams;
use loyaltychain::snapshot::{FileSnapshotStore, SnapshotFormat, SnapshotStore};
use loyaltychain::transaction::{CallEnvelope, LedgerCall};
use tempfile::TempDir;

fn busy_ledger() -> Result<Ledger, Box<dyn std::error::Error>> {
    let admin = AccountId::from("admin");
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");

    let mut ledger = Ledger::new(admin.clone());
    let calls = vec![
        CallEnvelope::new(admin.clone(), 1, LedgerCall::Initialize),
        CallEnvelope::new(admin.clone(), 2, LedgerCall::Mint { recipient: alice.clone(), amount: 30_000 }),
        CallEnvelope::new(alice.clone(), 3, LedgerCall::Transfer { recipient: bob.clone(), amount: 6_000 }),
        CallEnvelope::new(alice.clone(), 4, LedgerCall::Stake { amount: 10_000, tier: 3 }),
        CallEnvelope::new(bob.clone(), 5, LedgerCall::Stake { amount: 5_000, tier: 2 }),
        CallEnvelope::new(admin, 6, LedgerCall::SetPaused { pause: true }),
    ];
    for receipt in ledger.replay(&calls) {
        receipt.outcome?;
    }
    Ok(ledger)
}

#[test]
fn test_json_snapshot_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = FileSnapshotStore::new(dir.path().join("ledger.json"));
    let ledger = busy_ledger()?;

    store.save(ledger.state())?;
    let restored = store.load_ledger(&LedgerParams::default())?.ok_or("snapshot missing")?;

    assert_eq!(restored.state(), ledger.state());
    assert_eq!(restored.block_height(), 6);
    assert!(restored.is_paused());
    Ok(())
}

#[test]
fn test_bincode_snapshot_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = FileSnapshotStore::new(dir.path().join("nested").join("ledger.bin"));
    let ledger = busy_ledger()?;

    store.save(ledger.state())?;
    let restored = store.load()?.ok_or("snapshot missing")?;

    assert_eq!(&restored, ledger.state());
    Ok(())
}

#[test]
fn test_missing_snapshot_loads_as_none() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = FileSnapshotStore::new(dir.path().join("absent.json"));
    assert!(store.load()?.is_none());
    Ok(())
}

#[test]
fn test_edited_snapshot_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("ledger.json");
    let store = FileSnapshotStore::with_format(&path, SnapshotFormat::Json);
    store.save(busy_ledger()?.state())?;

    let mut snapshot: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    snapshot["state"]["total_supply"] = serde_json::json!(999_999);
    std::fs::write(&path, serde_json::to_string(&snapshot)?)?;

    assert!(matches!(store.load(), Err(ChainError::SnapshotError(_))));
    Ok(())
}

#[test]
fn test_save_leaves_no_temp_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = FileSnapshotStore::new(dir.path().join("ledger.json"));
    store.save(busy_ledger()?.state())?;

    let names: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["ledger.json".to_string()]);
    Ok(())
}

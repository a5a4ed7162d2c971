//! Integration tests for persisted chest opening.

use bomber::catalog::{ChestType, Rarity};
use bomber::rewards::ChestManager;
use bomber::storage::Database;
use bomber::{AppConfig, LedgerManager};
use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
}

#[test]
fn test_bronze_opens_follow_weight_table() {
    let mut db = Database::open_in_memory().unwrap();
    let config = AppConfig::default();
    let user = Uuid::new_v4();
    let opens = 1_000;

    let tx = db.transaction().unwrap();
    let chest_ids: Vec<Uuid> = {
        LedgerManager::new(&tx, &config).get_or_create(user, now()).unwrap();
        let chests = ChestManager::new(&tx, &config);
        (0..opens)
            .map(|_| {
                chests
                    .enqueue(user, ChestType::Bronze, "test", now())
                    .unwrap()
                    .chest_id
            })
            .collect()
    };
    tx.commit().unwrap();

    let chests = ChestManager::new(db.connection(), &config);
    let mut rng = ChaCha8Rng::seed_from_u64(1_000);
    let mut counts = [0u32; 4];
    for chest_id in &chest_ids {
        let opened = chests.open_with_rng(user, *chest_id, now(), &mut rng).unwrap();
        assert_eq!(opened.contents.items.len(), 1);
        counts[opened.contents.items[0].rarity as usize] += 1;
    }

    let weights = &config.chests.bronze.weights;
    let total: u64 = Rarity::ALL.iter().map(|r| weights.get(*r)).sum();
    for rarity in Rarity::ALL {
        let expected = weights.get(rarity) as f64 / total as f64;
        let observed = counts[rarity as usize] as f64 / opens as f64;
        assert!(
            (observed - expected).abs() < 0.05,
            "{:?}: observed {:.3}, expected {:.3}",
            rarity,
            observed,
            expected
        );
    }

    let profile = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(profile.chests_opened, opens as u64);
}

#[test]
fn test_reopen_after_restart_returns_stored_contents() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bomber.db");
    let config = AppConfig::default();
    let user = Uuid::new_v4();

    let (chest_id, first) = {
        let db = Database::open(&path).unwrap();
        LedgerManager::new(db.connection(), &config)
            .get_or_create(user, now())
            .unwrap();
        let chests = ChestManager::new(db.connection(), &config);
        let chest_id = chests
            .enqueue(user, ChestType::Gold, "level_up:10", now())
            .unwrap()
            .chest_id;
        let first = chests.open(user, chest_id, now()).unwrap();
        (chest_id, first)
    };

    let db = Database::open(&path).unwrap();
    let coins = LedgerManager::new(db.connection(), &config)
        .require(user)
        .unwrap()
        .coins;
    let second = ChestManager::new(db.connection(), &config)
        .open(user, chest_id, now())
        .unwrap();

    assert!(!second.newly_opened);
    assert_eq!(second.contents, first.contents);
    assert_eq!(second.chest.opened_at, first.chest.opened_at);
    let after = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(after.coins, coins);
}

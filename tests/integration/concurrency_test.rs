//! Integration tests for concurrent submissions against one database file.

use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use bomber::storage::Database;
use bomber::submission::{submit_drive, SubmissionResult};
use bomber::{AppConfig, LedgerManager, RawDriveEvent};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
}

fn drive(distance: f64) -> RawDriveEvent {
    RawDriveEvent {
        distance,
        ball_speed: 150.0,
        launch_angle: 12.0,
        wind: 0.0,
        night_mode: false,
        venue_id: "driving_range".to_string(),
        equipment_used: None,
    }
}

/// A night drive long enough for the 2024-06-01 challenge (big_stick, 320 yd).
fn qualifying_drive() -> RawDriveEvent {
    RawDriveEvent {
        distance: 330.0,
        ball_speed: 170.0,
        wind: -15.0,
        night_mode: true,
        ..drive(330.0)
    }
}

/// Spawn `threads` writers that each submit `per_thread` copies of `event`
/// for `user`, and collect every result.
fn hammer(
    path: &Path,
    user: Uuid,
    threads: usize,
    per_thread: usize,
    event: RawDriveEvent,
) -> Vec<SubmissionResult> {
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let path = path.to_path_buf();
            let barrier = Arc::clone(&barrier);
            let event = event.clone();
            thread::spawn(move || {
                let config = AppConfig::default();
                let mut db = Database::open(&path).unwrap();
                barrier.wait();
                (0..per_thread)
                    .map(|_| submit_drive(&mut db, &config, user, &event, now()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect()
}

fn claim_rows(db: &Database, user: Uuid) -> i64 {
    db.connection()
        .query_row(
            "SELECT COUNT(*) FROM daily_challenge_claims WHERE user_id = ?1",
            [user.to_string()],
            |row| row.get(0),
        )
        .unwrap()
}

fn setup() -> (TempDir, Uuid) {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::default();
    let db = Database::open(&dir.path().join("bomber.db")).unwrap();
    let user = Uuid::new_v4();
    LedgerManager::new(db.connection(), &config)
        .get_or_create(user, now())
        .unwrap();
    (dir, user)
}

#[test]
fn test_two_concurrent_drives_both_count() {
    let (dir, user) = setup();
    let path = dir.path().join("bomber.db");

    // 200 yd with the starter driver is 40 XP
    hammer(&path, user, 2, 1, drive(200.0));

    let config = AppConfig::default();
    let db = Database::open(&path).unwrap();
    let profile = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(profile.xp, 80);
    assert_eq!(profile.total_drives, 2);
}

#[test]
fn test_many_writers_no_lost_updates() {
    let (dir, user) = setup();
    let path = dir.path().join("bomber.db");

    let results = hammer(&path, user, 4, 5, drive(200.0));
    assert_eq!(results.len(), 20);
    assert!(results.iter().all(|r| r.omitted.is_empty()));

    let config = AppConfig::default();
    let db = Database::open(&path).unwrap();
    let profile = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(profile.total_drives, 20);
    assert_eq!(profile.xp, 20 * 40);

    // Achievement and daily rewards were granted once despite the race
    let unlocks: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM achievement_unlocks WHERE user_id = ?1 AND achievement_id = 'first_swing'",
            [user.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(unlocks, 1);
    // 200 yd never meets that day's 320 yd challenge
    assert_eq!(claim_rows(&db, user), 0);
    assert!(results.iter().all(|r| r.challenge_reward.is_none()));
}

#[test]
fn test_concurrent_qualifying_drives_claim_once() {
    let (dir, user) = setup();
    let path = dir.path().join("bomber.db");

    let results = hammer(&path, user, 4, 1, qualifying_drive());
    assert_eq!(results.len(), 4);

    let granted = results
        .iter()
        .filter(|r| r.challenge_reward.is_some())
        .count();
    assert_eq!(granted, 1);

    let db = Database::open(&path).unwrap();
    assert_eq!(claim_rows(&db, user), 1);
    let config = AppConfig::default();
    let profile = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(profile.total_drives, 4);
}

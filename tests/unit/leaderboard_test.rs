//! Unit tests for leaderboard queries

use bomber::leaderboards::{DriveRecord, LeaderboardFilter, LeaderboardManager, RankStatus};
use bomber::storage::config::AppConfig;
use bomber::storage::Database;
use bomber::LedgerManager;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn record(user_id: Uuid, distance: u32, recorded_at: DateTime<Utc>) -> DriveRecord {
    DriveRecord {
        id: Uuid::new_v4(),
        user_id,
        distance,
        ball_speed: 140.0,
        launch_angle: 11.0,
        wind: 0.0,
        night_mode: false,
        venue_id: "driving_range".to_string(),
        driver_id: "driver_rookie".to_string(),
        ball_id: "ball_range".to_string(),
        recorded_at,
    }
}

fn setup(players: usize) -> (Database, Vec<Uuid>) {
    let db = Database::open_in_memory().unwrap();
    let config = AppConfig::default();
    let users = {
        let ledger = LedgerManager::new(db.connection(), &config);
        (0..players)
            .map(|_| {
                let user = Uuid::new_v4();
                ledger.get_or_create(user, start()).unwrap();
                user
            })
            .collect()
    };
    (db, users)
}

#[test]
fn test_top_n_sorted_with_ties_by_time() {
    let (db, users) = setup(5);
    let board = LeaderboardManager::new(db.connection());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for i in 0..200 {
        let user = users[rng.gen_range(0..users.len())];
        // Narrow range forces plenty of equal distances
        let distance = rng.gen_range(240..260);
        board
            .record_drive(&record(user, distance, start() + Duration::minutes(i)))
            .unwrap();
    }

    let top = board.top_n(25, &LeaderboardFilter::default(), start()).unwrap();
    assert_eq!(top.len(), 25);
    for (i, pair) in top.windows(2).enumerate() {
        let (a, b) = (&pair[0].drive, &pair[1].drive);
        assert!(a.distance >= b.distance);
        if a.distance == b.distance {
            assert!(a.recorded_at <= b.recorded_at);
        }
        assert_eq!(pair[0].rank as usize, i + 1);
    }
}

#[test]
fn test_top_n_never_exceeds_entries() {
    let (db, users) = setup(1);
    let board = LeaderboardManager::new(db.connection());
    board.record_drive(&record(users[0], 250, start())).unwrap();

    let top = board.top_n(10, &LeaderboardFilter::default(), start()).unwrap();
    assert_eq!(top.len(), 1);
}

#[test]
fn test_unranked_without_drives() {
    let (db, users) = setup(1);
    let board = LeaderboardManager::new(db.connection());
    let status = board
        .rank_of(users[0], &LeaderboardFilter::default(), start())
        .unwrap();
    assert_eq!(status, RankStatus::Unranked);
}

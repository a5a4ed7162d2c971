//! Integration tests for drive submission.
//!
//! Covers the full path from a raw drive event to the stored profile,
//! leaderboard, achievements and chests.

use std::collections::HashSet;

use bomber::achievements::AchievementEvaluator;
use bomber::leaderboards::{LeaderboardFilter, LeaderboardManager};
use bomber::storage::Database;
use bomber::submission::{submit_drive, Stage};
use bomber::{AppConfig, BomberError, BomberService, InMemoryAccounts, LedgerManager, RawDriveEvent};
use chrono::{DateTime, TimeZone, Utc};
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

fn unlock_rows(db: &Database, user: Uuid, achievement_id: &str) -> i64 {
    db.connection()
        .query_row(
            "SELECT COUNT(*) FROM achievement_unlocks WHERE user_id = ?1 AND achievement_id = ?2",
            [user.to_string(), achievement_id.to_string()],
            |row| row.get(0),
        )
        .unwrap()
}

#[test]
fn test_century_drive_granted_once_on_replay() {
    let mut db = Database::open_in_memory().unwrap();
    let config = AppConfig::default();
    let user = Uuid::new_v4();

    let first = submit_drive(&mut db, &config, user, &drive(310.0), now()).unwrap();
    let century: Vec<_> = first
        .new_achievements
        .iter()
        .filter(|a| a.achievement_id == "century_drive")
        .collect();
    assert_eq!(century.len(), 1);

    let coins_after_first = LedgerManager::new(db.connection(), &config)
        .require(user)
        .unwrap()
        .coins;

    let replay = submit_drive(&mut db, &config, user, &drive(310.0), now()).unwrap();
    assert!(replay.new_achievements.is_empty());
    assert_eq!(unlock_rows(&db, user, "century_drive"), 1);

    // Only the per-drive coins move; the achievement reward is not paid twice
    let profile = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(profile.coins, coins_after_first + config.xp.coins_per_drive);
}

#[test]
fn test_stale_unlock_set_grants_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    let config = AppConfig::default();
    let user = Uuid::new_v4();
    submit_drive(&mut db, &config, user, &drive(310.0), now()).unwrap();

    let ledger = LedgerManager::new(db.connection(), &config);
    let before = ledger.require(user).unwrap();
    let stats = ledger.stats_snapshot(user).unwrap();

    let granted = AchievementEvaluator::new(db.connection(), &config)
        .evaluate(user, &stats, &HashSet::new(), now())
        .unwrap();
    assert!(granted.is_empty());

    let after = ledger.require(user).unwrap();
    assert_eq!(after.coins, before.coins);
    assert_eq!(after.gems, before.gems);
    assert_eq!(unlock_rows(&db, user, "century_drive"), 1);
}

#[test]
fn test_level_up_queues_chest() {
    let mut db = Database::open_in_memory().unwrap();
    let config = AppConfig::default();
    let user = Uuid::new_v4();

    // 60 XP each; the second crosses 100
    submit_drive(&mut db, &config, user, &drive(300.0), now()).unwrap();
    let result = submit_drive(&mut db, &config, user, &drive(300.0), now()).unwrap();

    let level_up = result.level_up.unwrap();
    assert_eq!((level_up.from, level_up.to), (1, 2));
    assert!(result.chests_earned.iter().any(|c| c.source == "level_up:2"));
}

#[test]
fn test_failed_achievement_stage_keeps_drive() {
    let mut db = Database::open_in_memory().unwrap();
    let config = AppConfig::default();
    let user = Uuid::new_v4();
    db.connection()
        .execute_batch("DROP TABLE achievement_unlocks;")
        .unwrap();

    let result = submit_drive(&mut db, &config, user, &drive(310.0), now()).unwrap();
    assert_eq!(result.omitted, vec![Stage::Achievements]);
    assert!(result.new_achievements.is_empty());
    assert_eq!(result.new_rank.and_then(|r| r.rank()), Some(1));

    let profile = LedgerManager::new(db.connection(), &config).require(user).unwrap();
    assert_eq!(profile.xp, 62);
    assert_eq!(profile.best_distance, 310);
    let top = LeaderboardManager::new(db.connection())
        .top_n(10, &LeaderboardFilter::default(), now())
        .unwrap();
    assert_eq!(top.len(), 1);
}

fn service() -> (BomberService<InMemoryAccounts>, Uuid) {
    let user = Uuid::new_v4();
    let mut accounts = InMemoryAccounts::new();
    accounts.insert(user, "venue_tester");
    let svc = BomberService::new(
        Database::open_in_memory().unwrap(),
        AppConfig::default(),
        accounts,
    )
    .with_clock(now);
    (svc, user)
}

#[test]
fn test_locked_venue_rejected_without_changes() {
    let (mut svc, user) = service();
    let mut event = drive(280.0);
    event.venue_id = "desert_canyon".to_string();

    let result = svc.submit_drive(user, &event);
    assert!(matches!(result, Err(BomberError::Validation(_))));

    let view = svc.profile(user).unwrap();
    assert_eq!(view.profile.xp, 0);
    assert_eq!(view.profile.total_drives, 0);
    assert!(svc.personal_top(user, 5).unwrap().is_empty());
}

#[test]
fn test_unknown_venue_rejected() {
    let (mut svc, user) = service();
    let mut event = drive(280.0);
    event.venue_id = "moon_base".to_string();
    assert!(matches!(
        svc.submit_drive(user, &event),
        Err(BomberError::Validation(_))
    ));
}

#[test]
fn test_unknown_user_rejected() {
    let (mut svc, _) = service();
    assert!(matches!(
        svc.submit_drive(Uuid::new_v4(), &drive(250.0)),
        Err(BomberError::NotFound(_))
    ));
}

#[test]
fn test_night_filter_and_personal_top() {
    let (mut svc, user) = service();
    svc.submit_drive(user, &drive(250.0)).unwrap();
    let mut night = drive(230.0);
    night.night_mode = true;
    svc.submit_drive(user, &night).unwrap();

    let night_only = LeaderboardFilter {
        night_mode: Some(true),
        ..Default::default()
    };
    let board = svc.leaderboard(10, &night_only).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].drive.distance, 230);
    assert_eq!(board[0].username.as_deref(), Some("venue_tester"));

    let best: Vec<u32> = svc
        .personal_top(user, 5)
        .unwrap()
        .iter()
        .map(|d| d.distance)
        .collect();
    assert_eq!(best, vec![250, 230]);
}

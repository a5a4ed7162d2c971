//! Integration tests for the daily challenge claim.

use bomber::catalog::challenge_for_date;
use bomber::challenges::ClaimOutcome;
use bomber::storage::Database;
use bomber::{AppConfig, BomberService, InMemoryAccounts, RawDriveEvent};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 20, 30, 0).unwrap()
}

/// A night drive that satisfies every single-drive challenge.
fn qualifying_drive() -> RawDriveEvent {
    RawDriveEvent {
        distance: 330.0,
        ball_speed: 170.0,
        launch_angle: 12.0,
        wind: -15.0,
        night_mode: true,
        venue_id: "driving_range".to_string(),
        equipment_used: None,
    }
}

fn service() -> (BomberService<InMemoryAccounts>, Uuid) {
    let user = Uuid::new_v4();
    let mut accounts = InMemoryAccounts::new();
    accounts.insert(user, "daily_player");
    let svc = BomberService::new(
        Database::open_in_memory().unwrap(),
        AppConfig::default(),
        accounts,
    )
    .with_clock(now);
    (svc, user)
}

#[test]
fn test_reward_paid_once_per_day() {
    let (mut svc, user) = service();

    // Five drives also satisfy the drive-count challenge
    let granted = (0..5)
        .map(|_| svc.submit_drive(user, &qualifying_drive()).unwrap())
        .filter(|r| r.challenge_reward.is_some())
        .count();
    assert_eq!(granted, 1);

    let coins = svc.profile(user).unwrap().profile.coins;
    let again = svc.claim_daily_challenge(user).unwrap();
    assert!(matches!(again, ClaimOutcome::AlreadyClaimed(_)));
    assert_eq!(svc.profile(user).unwrap().profile.coins, coins);

    let status = svc.daily_challenge(user).unwrap();
    assert_eq!(status.challenge.id, challenge_for_date(now().date_naive()).id);
    assert_eq!(status.drives_today, 5);
    assert!(status.claim.is_some());
}

#[test]
fn test_claim_without_drives_is_not_qualified() {
    let (mut svc, user) = service();
    let outcome = svc.claim_daily_challenge(user).unwrap();
    assert_eq!(outcome, ClaimOutcome::NotQualified);
    assert!(svc.daily_challenge(user).unwrap().claim.is_none());
}

#[test]
fn test_stored_claim_matches_granted_reward() {
    let (mut svc, user) = service();
    let mut granted = None;
    for _ in 0..5 {
        let result = svc.submit_drive(user, &qualifying_drive()).unwrap();
        if result.challenge_reward.is_some() {
            granted = result.challenge_reward;
        }
    }
    let granted = granted.unwrap();

    match svc.claim_daily_challenge(user).unwrap() {
        ClaimOutcome::AlreadyClaimed(stored) => {
            assert_eq!(stored.challenge_id, granted.challenge_id);
            assert_eq!(stored.reward, granted.reward);
            assert_eq!(stored.date, granted.date);
        }
        other => panic!("expected stored claim, got {:?}", other),
    }
}

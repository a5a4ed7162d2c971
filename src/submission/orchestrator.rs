//! Drive submission orchestrator.
//!
//! One drive, one immediate transaction. The ledger update runs first and
//! its failure aborts the submission. Leaderboard, achievement and daily
//! challenge stages each run in their own savepoint: a failing stage is
//! rolled back alone, logged and listed in `omitted`, and the drive still
//! counts.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use uuid::Uuid;

use super::validation::{validate_drive, EquipmentUsed, RawDriveEvent, ValidatedDrive};
use crate::achievements::evaluator::{AchievementEvaluator, UnlockedAchievement};
use crate::catalog::equipment::equipment;
use crate::catalog::types::{DriveStats, EquipmentType};
use crate::catalog::venues::{is_unlocked, venue, VenueProgress};
use crate::challenges::tracker::{ChallengeReward, ChallengeTracker, ClaimOutcome};
use crate::error::{BomberError, BomberResult};
use crate::leaderboards::rankings::{DriveRecord, LeaderboardFilter, LeaderboardManager, RankStatus};
use crate::ledger::manager::LedgerManager;
use crate::ledger::types::{
    ChestSummary, DivisionChange, DriveResult, EquipmentOwnership, LevelUp, PlayerProfile,
};
use crate::progression::curve::level_from_xp;
use crate::progression::xp::XpBreakdown;
use crate::storage::config::AppConfig;
use crate::storage::database::Database;

/// Optional stage of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Leaderboard,
    Achievements,
    DailyChallenge,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Leaderboard => "leaderboard",
            Stage::Achievements => "achievements",
            Stage::DailyChallenge => "daily_challenge",
        }
    }
}

/// Everything one drive changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResult {
    pub drive_id: Uuid,
    pub distance: u32,
    pub xp: XpBreakdown,
    pub total_xp: u64,
    pub level: u64,
    pub level_up: Option<LevelUp>,
    pub division_change: Option<DivisionChange>,
    pub coins_gained: u64,
    pub daily_bonus_awarded: bool,
    pub personal_best: bool,
    pub current_streak: u32,
    pub new_achievements: Vec<UnlockedAchievement>,
    /// Level-up, promotion, achievement and challenge chests, in that order
    pub chests_earned: Vec<ChestSummary>,
    pub challenge_reward: Option<ChallengeReward>,
    /// `None` when the leaderboard stage was omitted
    pub new_rank: Option<RankStatus>,
    /// Stages that failed and were rolled back
    pub omitted: Vec<Stage>,
}

/// Validate and book one drive.
pub fn submit_drive(
    db: &mut Database,
    config: &AppConfig,
    user_id: Uuid,
    raw: &RawDriveEvent,
    now: DateTime<Utc>,
) -> BomberResult<SubmissionResult> {
    let drive = validate_drive(raw, &config.limits)?;

    let result = db.run_transaction(|tx| book_drive(tx, config, user_id, &drive, now))?;

    tracing::info!(
        "Drive {} for {}: {} yd, +{} XP",
        result.drive_id,
        user_id,
        result.distance,
        result.xp.total
    );
    if !result.omitted.is_empty() {
        tracing::warn!("Drive {} booked without {:?}", result.drive_id, result.omitted);
    }
    Ok(result)
}

fn book_drive(
    tx: &mut Transaction<'_>,
    config: &AppConfig,
    user_id: Uuid,
    drive: &ValidatedDrive,
    now: DateTime<Utc>,
) -> BomberResult<SubmissionResult> {
    let today = now.date_naive();

    let (delta, driver, ball) = {
        let ledger = LedgerManager::new(tx, config);
        let profile = ledger.get_or_create(user_id, now)?;
        check_venue(&drive.venue_id, &profile, config)?;
        let (driver, ball) = resolve_equipment(&ledger, &profile, drive.equipment_used.as_ref())?;

        let delta = ledger.apply_drive_result(
            user_id,
            &DriveResult {
                distance: drive.distance,
                night_mode: drive.night_mode,
                driver_rarity: driver.rarity,
            },
            now,
        )?;
        (delta, driver, ball)
    };

    let mut omitted = Vec::new();
    let record = DriveRecord {
        id: Uuid::new_v4(),
        user_id,
        distance: drive.distance,
        ball_speed: drive.ball_speed,
        launch_angle: drive.launch_angle,
        wind: drive.wind,
        night_mode: drive.night_mode,
        venue_id: drive.venue_id.clone(),
        driver_id: driver.equipment_id,
        ball_id: ball.equipment_id,
        recorded_at: now,
    };

    let new_rank = run_stage(tx, Stage::Leaderboard, &mut omitted, |conn| {
        let board = LeaderboardManager::new(conn);
        board.record_drive(&record)?;
        board.rank_of(user_id, &LeaderboardFilter::default(), now)
    })?;

    let new_achievements = run_stage(tx, Stage::Achievements, &mut omitted, |conn| {
        AchievementEvaluator::new(conn, config).evaluate_current(user_id, now)
    })?
    .unwrap_or_default();

    let claim = run_stage(tx, Stage::DailyChallenge, &mut omitted, |conn| {
        let tracker = ChallengeTracker::new(conn, config);
        let stats = DriveStats {
            distance: drive.distance,
            ball_speed: drive.ball_speed,
            launch_angle: drive.launch_angle,
            wind: drive.wind,
            night_mode: drive.night_mode,
            drives_today: tracker.drives_on(user_id, today)?,
        };
        tracker.claim(user_id, today, &stats, now)
    })?;
    let challenge_reward = claim.and_then(ClaimOutcome::granted);

    let mut chests_earned = delta.chests_earned.clone();
    chests_earned.extend(new_achievements.iter().filter_map(|a| a.chest.clone()));
    chests_earned.extend(challenge_reward.as_ref().and_then(|c| c.chest.clone()));

    Ok(SubmissionResult {
        drive_id: record.id,
        distance: drive.distance,
        xp: delta.xp,
        total_xp: delta.xp_after,
        level: level_from_xp(delta.xp_after, &config.progression).level,
        level_up: delta.level_up,
        division_change: delta.division_change,
        coins_gained: delta.coins_gained,
        daily_bonus_awarded: delta.daily_bonus_awarded,
        personal_best: delta.personal_best,
        current_streak: delta.current_streak,
        new_achievements,
        chests_earned,
        challenge_reward,
        new_rank,
        omitted,
    })
}

/// Run an optional stage inside a savepoint.
///
/// Lock conflicts still abort the whole transaction so it can be retried.
fn run_stage<T, F>(
    tx: &mut Transaction<'_>,
    stage: Stage,
    omitted: &mut Vec<Stage>,
    f: F,
) -> BomberResult<Option<T>>
where
    F: FnOnce(&Connection) -> BomberResult<T>,
{
    let sp = tx.savepoint()?;
    match f(&*sp) {
        Ok(value) => {
            sp.commit()?;
            Ok(Some(value))
        }
        Err(e) if e.is_transient() => Err(e),
        Err(e) => {
            tracing::warn!("{} stage failed, rolled back: {}", stage.as_str(), e);
            omitted.push(stage);
            Ok(None)
        }
    }
}

fn check_venue(venue_id: &str, profile: &PlayerProfile, config: &AppConfig) -> BomberResult<()> {
    let venue = venue(venue_id)
        .ok_or_else(|| BomberError::Validation(format!("unknown venue {}", venue_id)))?;
    let progress = VenueProgress {
        xp: profile.xp,
        level: level_from_xp(profile.xp, &config.progression).level,
        total_drives: profile.total_drives,
    };
    if !is_unlocked(venue, &progress) {
        return Err(BomberError::Validation(format!(
            "venue {} is still locked",
            venue_id
        )));
    }
    Ok(())
}

fn resolve_equipment(
    ledger: &LedgerManager<'_>,
    profile: &PlayerProfile,
    used: Option<&EquipmentUsed>,
) -> BomberResult<(EquipmentOwnership, EquipmentOwnership)> {
    let (driver_id, ball_id) = match used {
        Some(used) => (used.driver_id.as_str(), used.ball_id.as_str()),
        None => (
            profile.equipped_driver_id.as_str(),
            profile.equipped_ball_id.as_str(),
        ),
    };
    Ok((
        owned_in_slot(ledger, profile.user_id, driver_id, EquipmentType::Driver)?,
        owned_in_slot(ledger, profile.user_id, ball_id, EquipmentType::Ball)?,
    ))
}

fn owned_in_slot(
    ledger: &LedgerManager<'_>,
    user_id: Uuid,
    equipment_id: &str,
    slot: EquipmentType,
) -> BomberResult<EquipmentOwnership> {
    let item = equipment(equipment_id)
        .ok_or_else(|| BomberError::Validation(format!("unknown equipment {}", equipment_id)))?;
    if item.equipment_type != slot {
        return Err(BomberError::Validation(format!(
            "{} is not a {}",
            equipment_id,
            slot.as_str()
        )));
    }
    ledger
        .ownership(user_id, equipment_id)?
        .ok_or_else(|| BomberError::Validation(format!("{} is not owned", equipment_id)))
}

//! Profile ledger types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::equipment::{STARTER_BALL_ID, STARTER_DRIVER_ID};
use crate::catalog::types::{ChestType, EquipmentType, Rarity, StatsSnapshot};
use crate::progression::curve::LevelProgress;
use crate::progression::divisions::Division;
use crate::progression::xp::XpBreakdown;

/// Authoritative player state, one row per user.
///
/// `level` and `division` are display caches rewritten on every XP change;
/// readers derive both from `xp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub user_id: Uuid,
    pub xp: u64,
    pub level: u64,
    pub division: String,
    pub coins: u64,
    pub gems: u64,
    pub total_drives: u64,
    pub night_drives: u64,
    pub best_distance: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_played_date: Option<NaiveDate>,
    pub last_daily_reward_at: Option<DateTime<Utc>>,
    pub equipped_driver_id: String,
    pub equipped_ball_id: String,
    pub chests_opened: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerProfile {
    /// A fresh profile with the starter kit equipped.
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            xp: 0,
            level: 1,
            division: "bronze".to_string(),
            coins: 0,
            gems: 0,
            total_drives: 0,
            night_drives: 0,
            best_distance: 0,
            current_streak: 0,
            longest_streak: 0,
            last_played_date: None,
            last_daily_reward_at: None,
            equipped_driver_id: STARTER_DRIVER_ID.to_string(),
            equipped_ball_id: STARTER_BALL_ID.to_string(),
            chests_opened: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Statistics for achievement predicates.
    pub fn stats_snapshot(&self, level: u64, equipment_owned: u64) -> StatsSnapshot {
        StatsSnapshot {
            total_drives: self.total_drives,
            best_distance: self.best_distance as u64,
            longest_streak: self.longest_streak as u64,
            night_drives: self.night_drives,
            level,
            equipment_owned,
        }
    }
}

/// An owned equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentOwnership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub equipment_id: String,
    pub equipment_type: EquipmentType,
    pub rarity: Rarity,
    pub level: u32,
    /// Copies received beyond the first
    pub duplicates_owned: u32,
    pub acquired_at: DateTime<Utc>,
}

/// The parts of a validated drive the ledger books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveResult {
    pub distance: u32,
    pub night_mode: bool,
    /// Rarity of the driver the shot was hit with
    pub driver_rarity: Rarity,
}

/// Result of handing an item to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// First copy; a new ownership row exists
    New,
    /// Already owned; the duplicate counter went up
    Duplicate { duplicates_owned: u32 },
}

/// A chest that was just queued for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChestSummary {
    pub chest_id: Uuid,
    pub chest_type: ChestType,
    pub source: String,
}

/// Level transition caused by one drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub from: u64,
    pub to: u64,
}

/// Division transition caused by one drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivisionChange {
    pub from: String,
    pub to: String,
}

/// Everything a drive changed on the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDelta {
    pub xp: XpBreakdown,
    pub xp_before: u64,
    pub xp_after: u64,
    pub level_before: u64,
    pub level_after: u64,
    pub level_up: Option<LevelUp>,
    pub division_change: Option<DivisionChange>,
    pub coins_gained: u64,
    pub daily_bonus_awarded: bool,
    pub personal_best: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub chests_earned: Vec<ChestSummary>,
    /// Profile after the update
    pub profile: PlayerProfile,
}

/// Profile plus everything derived from it, for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub profile: PlayerProfile,
    pub level: LevelProgress,
    pub xp_to_next_level: u64,
    /// Share of the current level already earned, 0.0 to 1.0
    pub level_fraction: f64,
    pub division: Division,
    pub next_division: Option<Division>,
    pub xp_to_next_division: Option<u64>,
    pub equipment: Vec<EquipmentOwnership>,
}

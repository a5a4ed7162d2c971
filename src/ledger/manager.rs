//! Profile ledger.
//!
//! The only code that writes `profiles` and `equipment_ownership`. Callers
//! hand in a connection that is already inside an immediate transaction
//! (a `Transaction` or `Savepoint` derefs to one), so each read-modify-write
//! below is serialized per database.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::types::{
    Acquisition, ChestSummary, DivisionChange, DriveResult, EquipmentOwnership, LevelUp,
    PlayerProfile, ProfileDelta, ProfileView,
};
use crate::catalog::equipment::{
    require_equipment, upgrade_cost, MAX_EQUIPMENT_LEVEL, STARTER_BALL_ID, STARTER_DRIVER_ID,
};
use crate::catalog::types::{
    ChestType, EquipmentItem, EquipmentType, Rarity, RewardPayload, StatsSnapshot,
};
use crate::error::{BomberError, BomberResult};
use crate::progression::curve::level_from_xp;
use crate::progression::divisions::{division_from_xp, next_division, xp_to_next_division};
use crate::progression::streak::advance_streak;
use crate::progression::xp::{xp_for_drive, XpInput};
use crate::rewards::chests::ChestManager;
use crate::storage::config::AppConfig;
use crate::storage::database::{
    format_timestamp, get_enum, get_opt_date, get_opt_timestamp, get_timestamp, get_u64, get_uuid,
};

const PROFILE_COLUMNS: &str = "user_id, xp, level, division, coins, gems, total_drives,
    night_drives, best_distance, current_streak, longest_streak, last_played_date,
    last_daily_reward_at, equipped_driver_id, equipped_ball_id, chests_opened,
    created_at, updated_at";

const OWNERSHIP_COLUMNS: &str = "id, user_id, equipment_id, equipment_type, rarity, level,
    duplicates_owned, acquired_at";

/// Chest granted for reaching `level`.
pub fn chest_for_level(level: u64) -> ChestType {
    if level % 10 == 0 {
        ChestType::Gold
    } else if level % 5 == 0 {
        ChestType::Silver
    } else {
        ChestType::Bronze
    }
}

/// Manager for player profiles and equipment ownership.
pub struct LedgerManager<'a> {
    conn: &'a Connection,
    config: &'a AppConfig,
}

impl<'a> LedgerManager<'a> {
    /// Create a new ledger manager with a database connection.
    pub fn new(conn: &'a Connection, config: &'a AppConfig) -> Self {
        Self { conn, config }
    }

    /// Get a profile by user id.
    pub fn get(&self, user_id: Uuid) -> BomberResult<Option<PlayerProfile>> {
        let sql = format!("SELECT {} FROM profiles WHERE user_id = ?1", PROFILE_COLUMNS);
        self.conn
            .query_row(&sql, params![user_id.to_string()], parse_profile_row)
            .optional()
            .map_err(BomberError::from)
    }

    /// Get a profile that must exist.
    pub fn require(&self, user_id: Uuid) -> BomberResult<PlayerProfile> {
        self.get(user_id)?
            .ok_or_else(|| BomberError::NotFound(format!("profile {}", user_id)))
    }

    /// Get the profile, creating it with the starter kit on first use.
    pub fn get_or_create(&self, user_id: Uuid, now: DateTime<Utc>) -> BomberResult<PlayerProfile> {
        if let Some(profile) = self.get(user_id)? {
            return Ok(profile);
        }

        let profile = PlayerProfile::new(user_id, now);
        let ts = format_timestamp(now);
        self.conn.execute(
            "INSERT INTO profiles
             (user_id, xp, level, division, equipped_driver_id, equipped_ball_id,
              created_at, updated_at)
             VALUES (?1, 0, 1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user_id.to_string(),
                profile.division,
                profile.equipped_driver_id,
                profile.equipped_ball_id,
                ts,
            ],
        )?;

        for id in [STARTER_DRIVER_ID, STARTER_BALL_ID] {
            self.grant_equipment(user_id, require_equipment(id)?, now)?;
        }

        tracing::info!("Created profile for {}", user_id);
        Ok(profile)
    }

    /// Profile with derived level and division.
    ///
    /// A user with no drives yet gets the fresh profile they would start
    /// with; nothing is written.
    pub fn view(&self, user_id: Uuid, now: DateTime<Utc>) -> BomberResult<ProfileView> {
        let (profile, equipment) = match self.get(user_id)? {
            Some(profile) => {
                let equipment = self.owned_equipment(user_id)?;
                (profile, equipment)
            }
            None => (
                PlayerProfile::new(user_id, now),
                starter_kit(user_id, now)?,
            ),
        };

        let level = level_from_xp(profile.xp, &self.config.progression);
        Ok(ProfileView {
            xp_to_next_level: level.xp_to_next_level(),
            level_fraction: level.fraction(),
            level,
            division: *division_from_xp(profile.xp),
            next_division: next_division(profile.xp).copied(),
            xp_to_next_division: xp_to_next_division(profile.xp),
            profile,
            equipment,
        })
    }

    /// Book one drive against the profile.
    ///
    /// Updates counters, bests, streak and XP, credits drive coins and the
    /// daily first-drive bonus, and queues a chest per level gained plus a
    /// platinum chest on division promotion.
    pub fn apply_drive_result(
        &self,
        user_id: Uuid,
        drive: &DriveResult,
        now: DateTime<Utc>,
    ) -> BomberResult<ProfileDelta> {
        let before = self.get_or_create(user_id, now)?;
        let today = now.date_naive();
        let mut profile = before.clone();

        profile.total_drives += 1;
        if drive.night_mode {
            profile.night_drives += 1;
        }
        let personal_best = drive.distance > before.best_distance;
        if personal_best {
            profile.best_distance = drive.distance;
        }

        let streak = advance_streak(
            before.last_played_date,
            today,
            before.current_streak,
            before.longest_streak,
            &self.config.streak,
        );
        profile.current_streak = streak.current;
        profile.longest_streak = streak.longest;
        // A backdated drive never moves the last play day backwards.
        profile.last_played_date = Some(before.last_played_date.map_or(today, |d| d.max(today)));

        let xp = xp_for_drive(
            &XpInput {
                distance: drive.distance,
                night_mode: drive.night_mode,
                streak: streak.current,
                driver_rarity: drive.driver_rarity,
            },
            &self.config.xp,
        );
        profile.xp = before.xp.saturating_add(xp.total);

        let level_before = level_from_xp(before.xp, &self.config.progression).level;
        let level_after = level_from_xp(profile.xp, &self.config.progression).level;
        let division_before = division_from_xp(before.xp);
        let division_after = division_from_xp(profile.xp);
        profile.level = level_after;
        profile.division = division_after.id.to_string();

        let daily_bonus_awarded = before
            .last_daily_reward_at
            .map_or(true, |at| today > at.date_naive());
        let mut coins_gained = self.config.xp.coins_per_drive;
        if daily_bonus_awarded {
            coins_gained = coins_gained.saturating_add(self.config.xp.daily_bonus_coins);
            profile.last_daily_reward_at = Some(now);
        }
        profile.coins = before.coins.saturating_add(coins_gained);
        profile.updated_at = now;

        self.conn.execute(
            "UPDATE profiles SET
             xp = ?1, level = ?2, division = ?3, coins = ?4, total_drives = ?5,
             night_drives = ?6, best_distance = ?7, current_streak = ?8, longest_streak = ?9,
             last_played_date = ?10, last_daily_reward_at = ?11, updated_at = ?12
             WHERE user_id = ?13",
            params![
                profile.xp as i64,
                profile.level as i64,
                profile.division,
                profile.coins as i64,
                profile.total_drives as i64,
                profile.night_drives as i64,
                profile.best_distance,
                profile.current_streak,
                profile.longest_streak,
                today.to_string(),
                profile.last_daily_reward_at.map(format_timestamp),
                format_timestamp(now),
                user_id.to_string(),
            ],
        )?;

        let chests = ChestManager::new(self.conn, self.config);
        let mut chests_earned = Vec::new();
        for level in (level_before + 1)..=level_after {
            chests_earned.push(chests.enqueue(
                user_id,
                chest_for_level(level),
                &format!("level_up:{}", level),
                now,
            )?);
        }

        let division_change = if division_after.min_xp > division_before.min_xp {
            chests_earned.push(chests.enqueue(
                user_id,
                ChestType::Platinum,
                &format!("division:{}", division_after.id),
                now,
            )?);
            tracing::info!(
                "{} promoted from {} to {}",
                user_id,
                division_before.name,
                division_after.name
            );
            Some(DivisionChange {
                from: division_before.id.to_string(),
                to: division_after.id.to_string(),
            })
        } else {
            None
        };

        let level_up = if level_after > level_before {
            tracing::info!("{} reached level {}", user_id, level_after);
            Some(LevelUp {
                from: level_before,
                to: level_after,
            })
        } else {
            None
        };

        tracing::debug!(
            "Drive booked for {}: {} yd, +{} XP, +{} coins",
            user_id,
            drive.distance,
            xp.total,
            coins_gained
        );

        Ok(ProfileDelta {
            xp,
            xp_before: before.xp,
            xp_after: profile.xp,
            level_before,
            level_after,
            level_up,
            division_change,
            coins_gained,
            daily_bonus_awarded,
            personal_best,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            chests_earned,
            profile,
        })
    }

    /// Add coins and gems to a profile.
    pub fn credit(&self, user_id: Uuid, coins: u64, gems: u64, now: DateTime<Utc>) -> BomberResult<()> {
        let updated = self.conn.execute(
            "UPDATE profiles SET coins = coins + ?1, gems = gems + ?2, updated_at = ?3
             WHERE user_id = ?4",
            params![coins as i64, gems as i64, format_timestamp(now), user_id.to_string()],
        )?;
        if updated == 0 {
            return Err(BomberError::NotFound(format!("profile {}", user_id)));
        }
        Ok(())
    }

    /// Credit an achievement or challenge reward, queueing its chest if any.
    pub fn grant_reward(
        &self,
        user_id: Uuid,
        reward: &RewardPayload,
        source: &str,
        now: DateTime<Utc>,
    ) -> BomberResult<Option<ChestSummary>> {
        self.credit(user_id, reward.coins, reward.gems, now)?;
        reward
            .chest
            .map(|chest_type| {
                ChestManager::new(self.conn, self.config).enqueue(user_id, chest_type, source, now)
            })
            .transpose()
    }

    /// Hand an item to a player. A second copy bumps the duplicate counter.
    pub fn grant_equipment(
        &self,
        user_id: Uuid,
        item: &EquipmentItem,
        now: DateTime<Utc>,
    ) -> BomberResult<Acquisition> {
        if let Some(owned) = self.ownership(user_id, item.id)? {
            self.conn.execute(
                "UPDATE equipment_ownership SET duplicates_owned = duplicates_owned + 1
                 WHERE id = ?1",
                params![owned.id.to_string()],
            )?;
            return Ok(Acquisition::Duplicate {
                duplicates_owned: owned.duplicates_owned + 1,
            });
        }

        self.conn.execute(
            "INSERT INTO equipment_ownership
             (id, user_id, equipment_id, equipment_type, rarity, level, duplicates_owned, acquired_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, 0, ?6)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                item.id,
                item.equipment_type.as_str(),
                item.rarity.as_str(),
                format_timestamp(now),
            ],
        )?;
        tracing::debug!("{} acquired {}", user_id, item.id);
        Ok(Acquisition::New)
    }

    /// Ownership row for one item.
    pub fn ownership(
        &self,
        user_id: Uuid,
        equipment_id: &str,
    ) -> BomberResult<Option<EquipmentOwnership>> {
        let sql = format!(
            "SELECT {} FROM equipment_ownership WHERE user_id = ?1 AND equipment_id = ?2",
            OWNERSHIP_COLUMNS
        );
        self.conn
            .query_row(
                &sql,
                params![user_id.to_string(), equipment_id],
                parse_ownership_row,
            )
            .optional()
            .map_err(BomberError::from)
    }

    /// All items a player owns, oldest first.
    pub fn owned_equipment(&self, user_id: Uuid) -> BomberResult<Vec<EquipmentOwnership>> {
        let sql = format!(
            "SELECT {} FROM equipment_ownership WHERE user_id = ?1
             ORDER BY acquired_at ASC, equipment_id ASC",
            OWNERSHIP_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id.to_string()], parse_ownership_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(BomberError::from)
    }

    /// Ids of every owned item.
    pub fn owned_ids(&self, user_id: Uuid) -> BomberResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT equipment_id FROM equipment_ownership WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id.to_string()], |row| row.get(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(BomberError::from)
    }

    /// Put an owned item in its slot.
    pub fn equip(
        &self,
        user_id: Uuid,
        equipment_id: &str,
        now: DateTime<Utc>,
    ) -> BomberResult<PlayerProfile> {
        let item = require_equipment(equipment_id)?;
        self.require(user_id)?;
        if self.ownership(user_id, equipment_id)?.is_none() {
            return Err(BomberError::Validation(format!(
                "{} is not owned",
                equipment_id
            )));
        }

        let column = match item.equipment_type {
            EquipmentType::Driver => "equipped_driver_id",
            EquipmentType::Ball => "equipped_ball_id",
        };
        self.conn.execute(
            &format!(
                "UPDATE profiles SET {} = ?1, updated_at = ?2 WHERE user_id = ?3",
                column
            ),
            params![equipment_id, format_timestamp(now), user_id.to_string()],
        )?;

        tracing::info!("{} equipped {}", user_id, equipment_id);
        self.require(user_id)
    }

    /// Spend coins to raise an owned item one level.
    pub fn upgrade_equipment(
        &self,
        user_id: Uuid,
        equipment_id: &str,
        now: DateTime<Utc>,
    ) -> BomberResult<EquipmentOwnership> {
        let item = require_equipment(equipment_id)?;
        let profile = self.require(user_id)?;
        let owned = self.ownership(user_id, equipment_id)?.ok_or_else(|| {
            BomberError::Validation(format!("{} is not owned", equipment_id))
        })?;

        if owned.level >= MAX_EQUIPMENT_LEVEL {
            return Err(BomberError::Validation(format!(
                "{} is already at max level {}",
                equipment_id, MAX_EQUIPMENT_LEVEL
            )));
        }
        let cost = upgrade_cost(item.rarity, owned.level);
        if profile.coins < cost {
            return Err(BomberError::Validation(format!(
                "upgrade costs {} coins, {} available",
                cost, profile.coins
            )));
        }

        self.conn.execute(
            "UPDATE profiles SET coins = coins - ?1, updated_at = ?2 WHERE user_id = ?3",
            params![cost as i64, format_timestamp(now), user_id.to_string()],
        )?;
        self.conn.execute(
            "UPDATE equipment_ownership SET level = level + 1 WHERE id = ?1",
            params![owned.id.to_string()],
        )?;

        tracing::info!(
            "{} upgraded {} to level {} for {} coins",
            user_id,
            equipment_id,
            owned.level + 1,
            cost
        );
        Ok(EquipmentOwnership {
            level: owned.level + 1,
            ..owned
        })
    }

    /// Statistics for achievement predicates.
    pub fn stats_snapshot(&self, user_id: Uuid) -> BomberResult<StatsSnapshot> {
        let profile = self.require(user_id)?;
        let owned: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM equipment_ownership WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        let level = level_from_xp(profile.xp, &self.config.progression).level;
        Ok(profile.stats_snapshot(level, owned as u64))
    }

    /// Count an opened chest on the profile.
    pub fn record_chest_opened(&self, user_id: Uuid, now: DateTime<Utc>) -> BomberResult<()> {
        self.conn.execute(
            "UPDATE profiles SET chests_opened = chests_opened + 1, updated_at = ?1
             WHERE user_id = ?2",
            params![format_timestamp(now), user_id.to_string()],
        )?;
        Ok(())
    }
}

/// Ownership rows a brand new profile starts with.
fn starter_kit(user_id: Uuid, now: DateTime<Utc>) -> BomberResult<Vec<EquipmentOwnership>> {
    [STARTER_DRIVER_ID, STARTER_BALL_ID]
        .iter()
        .map(|id| {
            let item = require_equipment(id)?;
            Ok(EquipmentOwnership {
                id: Uuid::nil(),
                user_id,
                equipment_id: item.id.to_string(),
                equipment_type: item.equipment_type,
                rarity: item.rarity,
                level: 1,
                duplicates_owned: 0,
                acquired_at: now,
            })
        })
        .collect()
}

fn parse_profile_row(row: &Row<'_>) -> rusqlite::Result<PlayerProfile> {
    Ok(PlayerProfile {
        user_id: get_uuid(row, 0)?,
        xp: get_u64(row, 1)?,
        level: get_u64(row, 2)?,
        division: row.get(3)?,
        coins: get_u64(row, 4)?,
        gems: get_u64(row, 5)?,
        total_drives: get_u64(row, 6)?,
        night_drives: get_u64(row, 7)?,
        best_distance: row.get(8)?,
        current_streak: row.get(9)?,
        longest_streak: row.get(10)?,
        last_played_date: get_opt_date(row, 11)?,
        last_daily_reward_at: get_opt_timestamp(row, 12)?,
        equipped_driver_id: row
            .get::<_, Option<String>>(13)?
            .unwrap_or_else(|| STARTER_DRIVER_ID.to_string()),
        equipped_ball_id: row
            .get::<_, Option<String>>(14)?
            .unwrap_or_else(|| STARTER_BALL_ID.to_string()),
        chests_opened: get_u64(row, 15)?,
        created_at: get_timestamp(row, 16)?,
        updated_at: get_timestamp(row, 17)?,
    })
}

fn parse_ownership_row(row: &Row<'_>) -> rusqlite::Result<EquipmentOwnership> {
    Ok(EquipmentOwnership {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        equipment_id: row.get(2)?,
        equipment_type: get_enum(row, 3, EquipmentType::from_str)?,
        rarity: get_enum(row, 4, Rarity::from_str)?,
        level: row.get(5)?,
        duplicates_owned: row.get(6)?,
        acquired_at: get_timestamp(row, 7)?,
    })
}

//! Achievement evaluation and granting.
//!
//! The unique key on `(user_id, achievement_id)` is what keeps a reward
//! from being paid twice; a second insert is skipped, never surfaced.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::achievements::{require_achievement, ACHIEVEMENTS};
use crate::catalog::types::{AchievementDef, RewardPayload, StatsSnapshot};
use crate::error::{BomberError, BomberResult};
use crate::ledger::manager::LedgerManager;
use crate::ledger::types::ChestSummary;
use crate::storage::config::AppConfig;
use crate::storage::database::{format_timestamp, get_timestamp};

/// A stored unlock joined with its definition.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementUnlock {
    pub achievement: AchievementDef,
    pub unlocked_at: DateTime<Utc>,
}

/// An achievement granted during this evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnlockedAchievement {
    pub achievement_id: String,
    pub name: String,
    pub reward: RewardPayload,
    pub chest: Option<ChestSummary>,
}

/// Definitions satisfied by `stats` and missing from `already_unlocked`.
pub fn newly_qualified(
    stats: &StatsSnapshot,
    already_unlocked: &HashSet<String>,
) -> Vec<&'static AchievementDef> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !already_unlocked.contains(a.id) && a.is_met(stats))
        .collect()
}

/// Grants achievements and lists unlocks.
pub struct AchievementEvaluator<'a> {
    conn: &'a Connection,
    config: &'a AppConfig,
}

impl<'a> AchievementEvaluator<'a> {
    /// Create a new evaluator with a database connection.
    pub fn new(conn: &'a Connection, config: &'a AppConfig) -> Self {
        Self { conn, config }
    }

    /// Ids of every achievement the player holds.
    pub fn unlocked_ids(&self, user_id: Uuid) -> BomberResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT achievement_id FROM achievement_unlocks WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id.to_string()], |row| row.get(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(BomberError::from)
    }

    /// Unlocks of a player, oldest first.
    pub fn unlocked(&self, user_id: Uuid) -> BomberResult<Vec<AchievementUnlock>> {
        let mut stmt = self.conn.prepare(
            "SELECT achievement_id, unlocked_at FROM achievement_unlocks
             WHERE user_id = ?1
             ORDER BY unlocked_at ASC, achievement_id ASC",
        )?;
        let rows = stmt.query_map(params![user_id.to_string()], parse_unlock_row)?;

        let mut unlocks = Vec::new();
        for row in rows {
            let (achievement_id, unlocked_at) = row?;
            unlocks.push(AchievementUnlock {
                achievement: *require_achievement(&achievement_id)?,
                unlocked_at,
            });
        }
        Ok(unlocks)
    }

    /// Grant every achievement `stats` newly satisfies.
    ///
    /// Running it again with the same snapshot and an up-to-date
    /// `already_unlocked` set grants nothing.
    pub fn evaluate(
        &self,
        user_id: Uuid,
        stats: &StatsSnapshot,
        already_unlocked: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> BomberResult<Vec<UnlockedAchievement>> {
        let mut granted = Vec::new();
        for def in newly_qualified(stats, already_unlocked) {
            match self.grant(user_id, def, now) {
                Ok(unlock) => granted.push(unlock),
                Err(e) if e.is_duplicate() => {
                    tracing::debug!("{} already holds {}", user_id, def.id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(granted)
    }

    /// Evaluate against the stored profile and unlock set.
    pub fn evaluate_current(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> BomberResult<Vec<UnlockedAchievement>> {
        let stats = LedgerManager::new(self.conn, self.config).stats_snapshot(user_id)?;
        let already = self.unlocked_ids(user_id)?;
        self.evaluate(user_id, &stats, &already, now)
    }

    fn grant(
        &self,
        user_id: Uuid,
        def: &AchievementDef,
        now: DateTime<Utc>,
    ) -> BomberResult<UnlockedAchievement> {
        self.conn.execute(
            "INSERT INTO achievement_unlocks (id, user_id, achievement_id, unlocked_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                def.id,
                format_timestamp(now),
            ],
        )?;

        let chest = LedgerManager::new(self.conn, self.config).grant_reward(
            user_id,
            &def.reward,
            &format!("achievement:{}", def.id),
            now,
        )?;

        tracing::info!(
            "{} unlocked {} achievement {}",
            user_id,
            def.category.as_str(),
            def.name
        );
        Ok(UnlockedAchievement {
            achievement_id: def.id.to_string(),
            name: def.name.to_string(),
            reward: def.reward,
            chest,
        })
    }
}

fn parse_unlock_row(row: &Row<'_>) -> rusqlite::Result<(String, DateTime<Utc>)> {
    Ok((row.get(0)?, get_timestamp(row, 1)?))
}

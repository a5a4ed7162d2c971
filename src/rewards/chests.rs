//! Persisted chests.
//!
//! A chest is queued with no contents. The first open rolls the contents,
//! stores them next to `opened_at` and pays them out in the same
//! transaction, then grants any achievement the new items earn. Every later
//! open returns the stored contents unchanged.

use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use super::generator::{roll_chest, RewardBundle};
use crate::achievements::evaluator::{AchievementEvaluator, UnlockedAchievement};
use crate::catalog::equipment::require_equipment;
use crate::catalog::types::ChestType;
use crate::error::{BomberError, BomberResult};
use crate::ledger::manager::LedgerManager;
use crate::ledger::types::ChestSummary;
use crate::storage::config::AppConfig;
use crate::storage::database::{
    conversion_error, format_timestamp, get_enum, get_opt_timestamp, get_timestamp, get_uuid,
};

/// A reward chest, pending while `opened_at` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chest_type: ChestType,
    pub source: String,
    pub earned_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
    pub contents: Option<RewardBundle>,
}

impl Chest {
    pub fn is_pending(&self) -> bool {
        self.opened_at.is_none()
    }
}

/// Result of an open request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenedChest {
    pub chest: Chest,
    pub contents: RewardBundle,
    /// False when the chest had already been opened and nothing was paid
    pub newly_opened: bool,
    /// Achievements earned by this open; empty on a repeat open
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Manager for reward chests.
pub struct ChestManager<'a> {
    conn: &'a Connection,
    config: &'a AppConfig,
}

impl<'a> ChestManager<'a> {
    /// Create a new chest manager with a database connection.
    pub fn new(conn: &'a Connection, config: &'a AppConfig) -> Self {
        Self { conn, config }
    }

    /// Queue an unopened chest.
    pub fn enqueue(
        &self,
        user_id: Uuid,
        chest_type: ChestType,
        source: &str,
        now: DateTime<Utc>,
    ) -> BomberResult<ChestSummary> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO chests (id, user_id, chest_type, source, earned_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                user_id.to_string(),
                chest_type.as_str(),
                source,
                format_timestamp(now),
            ],
        )?;

        tracing::info!("{} earned a {} chest ({})", user_id, chest_type.as_str(), source);
        Ok(ChestSummary {
            chest_id: id,
            chest_type,
            source: source.to_string(),
        })
    }

    /// Get a chest by id.
    pub fn get(&self, chest_id: Uuid) -> BomberResult<Option<Chest>> {
        self.conn
            .query_row(
                "SELECT id, user_id, chest_type, source, earned_at, opened_at, contents_json
                 FROM chests WHERE id = ?1",
                params![chest_id.to_string()],
                parse_chest_row,
            )
            .optional()
            .map_err(BomberError::from)
    }

    /// All chests of a player, pending first, then by earn time.
    pub fn list(&self, user_id: Uuid) -> BomberResult<Vec<Chest>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, chest_type, source, earned_at, opened_at, contents_json
             FROM chests
             WHERE user_id = ?1
             ORDER BY opened_at IS NOT NULL, earned_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![user_id.to_string()], parse_chest_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(BomberError::from)
    }

    /// Open a chest with the thread-local CSPRNG.
    pub fn open(&self, user_id: Uuid, chest_id: Uuid, now: DateTime<Utc>) -> BomberResult<OpenedChest> {
        self.open_with_rng(user_id, chest_id, now, &mut rand::thread_rng())
    }

    /// Open a chest, drawing with `rng` if it is still pending.
    ///
    /// Chests of other players are reported as not found.
    pub fn open_with_rng<R: Rng + ?Sized>(
        &self,
        user_id: Uuid,
        chest_id: Uuid,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> BomberResult<OpenedChest> {
        let chest = self
            .get(chest_id)?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| BomberError::NotFound(format!("chest {}", chest_id)))?;

        match self.pay_out(chest, now, rng) {
            Err(BomberError::AlreadyClaimed(_)) => self.stored(chest_id),
            other => other,
        }
    }

    fn pay_out<R: Rng + ?Sized>(
        &self,
        chest: Chest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> BomberResult<OpenedChest> {
        if !chest.is_pending() {
            return Err(BomberError::AlreadyClaimed(format!("chest {}", chest.id)));
        }

        let ledger = LedgerManager::new(self.conn, self.config);
        let owned = ledger.owned_ids(chest.user_id)?;
        let contents = roll_chest(chest.chest_type, &self.config.chests, &owned, rng);

        let updated = self.conn.execute(
            "UPDATE chests SET opened_at = ?1, contents_json = ?2
             WHERE id = ?3 AND opened_at IS NULL",
            params![
                format_timestamp(now),
                serde_json::to_string(&contents)?,
                chest.id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(BomberError::AlreadyClaimed(format!("chest {}", chest.id)));
        }

        ledger.credit(chest.user_id, contents.coins, contents.gems, now)?;
        for item in &contents.items {
            ledger.grant_equipment(chest.user_id, require_equipment(&item.equipment_id)?, now)?;
        }
        ledger.record_chest_opened(chest.user_id, now)?;
        let unlocked =
            AchievementEvaluator::new(self.conn, self.config).evaluate_current(chest.user_id, now)?;

        tracing::info!(
            "{} opened {} chest {}: {} coins, {} gems, {} new items",
            chest.user_id,
            chest.chest_type.as_str(),
            chest.id,
            contents.coins,
            contents.gems,
            contents.new_items().count()
        );

        Ok(OpenedChest {
            chest: Chest {
                opened_at: Some(now),
                contents: Some(contents.clone()),
                ..chest
            },
            contents,
            newly_opened: true,
            unlocked,
        })
    }

    fn stored(&self, chest_id: Uuid) -> BomberResult<OpenedChest> {
        let chest = self
            .get(chest_id)?
            .ok_or_else(|| BomberError::NotFound(format!("chest {}", chest_id)))?;
        let contents = chest.contents.clone().ok_or_else(|| {
            BomberError::NotFound(format!("contents of chest {}", chest_id))
        })?;
        tracing::debug!("Chest {} already opened, returning stored contents", chest_id);
        Ok(OpenedChest {
            chest,
            contents,
            newly_opened: false,
            unlocked: Vec::new(),
        })
    }
}

fn parse_chest_row(row: &Row<'_>) -> rusqlite::Result<Chest> {
    let contents_json: Option<String> = row.get(6)?;
    let contents = contents_json
        .map(|json| {
            serde_json::from_str(&json).map_err(|e| conversion_error(6, e))
        })
        .transpose()?;

    Ok(Chest {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        chest_type: get_enum(row, 2, ChestType::from_str)?,
        source: row.get(3)?,
        earned_at: get_timestamp(row, 4)?,
        opened_at: get_opt_timestamp(row, 5)?,
        contents,
    })
}

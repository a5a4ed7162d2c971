//! Daily challenge tracking.
//!
//! One claim per player per calendar day, enforced by the unique key on
//! `(user_id, challenge_date)`.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::challenges::challenge_for_date;
use crate::catalog::types::{ChallengeDef, DriveStats, RewardPayload};
use crate::error::{BomberError, BomberResult};
use crate::ledger::manager::LedgerManager;
use crate::ledger::types::ChestSummary;
use crate::storage::config::AppConfig;
use crate::storage::database::{conversion_error, format_timestamp, get_date, get_timestamp};

/// A stored daily challenge claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeReward {
    pub challenge_id: String,
    pub date: NaiveDate,
    pub reward: RewardPayload,
    /// Chest queued by this claim; only known to the request that granted it
    pub chest: Option<ChestSummary>,
    pub claimed_at: DateTime<Utc>,
}

/// Outcome of a claim attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reward", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Granted(ChallengeReward),
    /// The day's reward was paid earlier; this is the stored claim
    AlreadyClaimed(ChallengeReward),
    NotQualified,
}

impl ClaimOutcome {
    /// The reward paid by this call, if any.
    pub fn granted(self) -> Option<ChallengeReward> {
        match self {
            ClaimOutcome::Granted(reward) => Some(reward),
            _ => None,
        }
    }
}

/// Today's challenge and where the player stands on it.
#[derive(Debug, Clone, Serialize)]
pub struct DailyChallengeStatus {
    pub date: NaiveDate,
    pub challenge: ChallengeDef,
    pub drives_today: u32,
    pub claim: Option<ChallengeReward>,
}

/// Issues and claims daily challenges.
pub struct ChallengeTracker<'a> {
    conn: &'a Connection,
    config: &'a AppConfig,
}

impl<'a> ChallengeTracker<'a> {
    /// Create a new tracker with a database connection.
    pub fn new(conn: &'a Connection, config: &'a AppConfig) -> Self {
        Self { conn, config }
    }

    /// The challenge everyone plays on `date`.
    pub fn current_challenge(&self, date: NaiveDate) -> &'static ChallengeDef {
        challenge_for_date(date)
    }

    /// The player's claim for `date`, if made.
    pub fn claim_for(&self, user_id: Uuid, date: NaiveDate) -> BomberResult<Option<ChallengeReward>> {
        self.conn
            .query_row(
                "SELECT challenge_id, challenge_date, reward_json, claimed_at
                 FROM daily_challenge_claims
                 WHERE user_id = ?1 AND challenge_date = ?2",
                params![user_id.to_string(), date.to_string()],
                parse_claim_row,
            )
            .optional()
            .map_err(BomberError::from)
    }

    /// Drives the player recorded on `date` (UTC).
    pub fn drives_on(&self, user_id: Uuid, date: NaiveDate) -> BomberResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM drives WHERE user_id = ?1 AND substr(recorded_at, 1, 10) = ?2",
            params![user_id.to_string(), date.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// Challenge, progress and claim for `date`.
    pub fn status(&self, user_id: Uuid, date: NaiveDate) -> BomberResult<DailyChallengeStatus> {
        Ok(DailyChallengeStatus {
            date,
            challenge: *self.current_challenge(date),
            drives_today: self.drives_on(user_id, date)?,
            claim: self.claim_for(user_id, date)?,
        })
    }

    /// Claim the day's reward with the given drive.
    pub fn claim(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        stats: &DriveStats,
        now: DateTime<Utc>,
    ) -> BomberResult<ClaimOutcome> {
        if let Some(existing) = self.claim_for(user_id, date)? {
            return Ok(ClaimOutcome::AlreadyClaimed(existing));
        }

        let challenge = self.current_challenge(date);
        if !challenge.condition.is_met(stats) {
            return Ok(ClaimOutcome::NotQualified);
        }

        match self.insert_claim(user_id, date, challenge, now) {
            Ok(reward) => Ok(ClaimOutcome::Granted(reward)),
            Err(e) if e.is_duplicate() => match self.claim_for(user_id, date)? {
                Some(existing) => Ok(ClaimOutcome::AlreadyClaimed(existing)),
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Claim using any drive already recorded on `date`.
    pub fn claim_from_history(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> BomberResult<ClaimOutcome> {
        if let Some(existing) = self.claim_for(user_id, date)? {
            return Ok(ClaimOutcome::AlreadyClaimed(existing));
        }

        let drives_today = self.drives_on(user_id, date)?;
        let mut stmt = self.conn.prepare(
            "SELECT distance, ball_speed, launch_angle, wind, night_mode
             FROM drives
             WHERE user_id = ?1 AND substr(recorded_at, 1, 10) = ?2
             ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map(params![user_id.to_string(), date.to_string()], |row| {
            Ok(DriveStats {
                distance: row.get(0)?,
                ball_speed: row.get(1)?,
                launch_angle: row.get(2)?,
                wind: row.get(3)?,
                night_mode: row.get(4)?,
                drives_today,
            })
        })?;

        for stats in rows {
            let outcome = self.claim(user_id, date, &stats?, now)?;
            if outcome != ClaimOutcome::NotQualified {
                return Ok(outcome);
            }
        }
        Ok(ClaimOutcome::NotQualified)
    }

    fn insert_claim(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        challenge: &ChallengeDef,
        now: DateTime<Utc>,
    ) -> BomberResult<ChallengeReward> {
        self.conn.execute(
            "INSERT INTO daily_challenge_claims
             (id, user_id, challenge_date, challenge_id, reward_json, claimed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                date.to_string(),
                challenge.id,
                serde_json::to_string(&challenge.reward)?,
                format_timestamp(now),
            ],
        )?;

        let chest = LedgerManager::new(self.conn, self.config).grant_reward(
            user_id,
            &challenge.reward,
            &format!("challenge:{}", challenge.id),
            now,
        )?;

        tracing::info!("{} completed daily challenge {} for {}", user_id, challenge.name, date);
        Ok(ChallengeReward {
            challenge_id: challenge.id.to_string(),
            date,
            reward: challenge.reward,
            chest,
            claimed_at: now,
        })
    }
}

fn parse_claim_row(row: &Row<'_>) -> rusqlite::Result<ChallengeReward> {
    let reward_json: String = row.get(2)?;

    Ok(ChallengeReward {
        challenge_id: row.get(0)?,
        date: get_date(row, 1)?,
        reward: serde_json::from_str(&reward_json).map_err(|e| conversion_error(2, e))?,
        chest: None,
        claimed_at: get_timestamp(row, 3)?,
    })
}

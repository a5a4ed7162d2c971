//! Leaderboard rankings.
//!
//! Rankings are derived by query from the append-only `drives` log. Longer
//! drives rank higher; equal distances go to the earlier drive, then to the
//! earlier insert.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BomberError, BomberResult};
use crate::storage::database::{format_timestamp, get_timestamp, get_uuid};

/// Ranking order shared by every leaderboard query.
const RANK_ORDER: &str = "distance DESC, recorded_at ASC, seq ASC";

const DRIVE_COLUMNS: &str = "seq, id, user_id, distance, ball_speed, launch_angle, wind,
    night_mode, venue_id, driver_id, ball_id, recorded_at";

/// One recorded drive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub distance: u32,
    pub ball_speed: f64,
    pub launch_angle: f64,
    pub wind: f64,
    pub night_mode: bool,
    pub venue_id: String,
    pub driver_id: String,
    pub ball_id: String,
    pub recorded_at: DateTime<Utc>,
}

/// Time range filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    AllTime,
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimeRange {
    /// First instant inside the range, relative to `now`.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let first_day = match self {
            TimeRange::AllTime => return None,
            TimeRange::Today => today,
            TimeRange::ThisWeek => today - Duration::days(today.weekday().num_days_from_monday() as i64),
            TimeRange::ThisMonth => NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?,
        };
        first_day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::AllTime => "all_time",
            TimeRange::Today => "today",
            TimeRange::ThisWeek => "this_week",
            TimeRange::ThisMonth => "this_month",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all_time" => Some(TimeRange::AllTime),
            "today" => Some(TimeRange::Today),
            "this_week" => Some(TimeRange::ThisWeek),
            "this_month" => Some(TimeRange::ThisMonth),
            _ => None,
        }
    }
}

/// Leaderboard filter options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardFilter {
    pub venue_id: Option<String>,
    pub night_mode: Option<bool>,
    pub time_range: TimeRange,
}

/// Leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub drive: DriveRecord,
    /// Filled in from the account directory for display
    pub username: Option<String>,
}

/// A player's position on a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankStatus {
    Ranked {
        rank: u32,
        total_entries: u32,
        best_distance: u32,
    },
    Unranked,
}

impl RankStatus {
    pub fn rank(&self) -> Option<u32> {
        match self {
            RankStatus::Ranked { rank, .. } => Some(*rank),
            RankStatus::Unranked => None,
        }
    }
}

/// Manager for the drive log and the rankings built on it.
pub struct LeaderboardManager<'a> {
    conn: &'a Connection,
}

impl<'a> LeaderboardManager<'a> {
    /// Create a new leaderboard manager with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append a drive to the log. Past entries are never touched.
    pub fn record_drive(&self, drive: &DriveRecord) -> BomberResult<()> {
        self.conn.execute(
            "INSERT INTO drives
             (id, user_id, distance, ball_speed, launch_angle, wind, night_mode,
              venue_id, driver_id, ball_id, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                drive.id.to_string(),
                drive.user_id.to_string(),
                drive.distance,
                drive.ball_speed,
                drive.launch_angle,
                drive.wind,
                drive.night_mode,
                drive.venue_id,
                drive.driver_id,
                drive.ball_id,
                format_timestamp(drive.recorded_at),
            ],
        )?;
        Ok(())
    }

    /// The `n` best drives matching `filter`.
    pub fn top_n(
        &self,
        n: usize,
        filter: &LeaderboardFilter,
        now: DateTime<Utc>,
    ) -> BomberResult<Vec<LeaderboardEntry>> {
        let (clause, mut values) = filter_clause(filter, now);
        values.push(Value::Integer(n as i64));
        let sql = format!(
            "SELECT {} FROM drives WHERE {} ORDER BY {} LIMIT ?",
            DRIVE_COLUMNS, clause, RANK_ORDER
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), parse_drive_row)?;

        let mut entries = Vec::new();
        for (index, row) in rows.enumerate() {
            let (_, drive) = row?;
            entries.push(LeaderboardEntry {
                rank: index as u32 + 1,
                drive,
                username: None,
            });
        }
        Ok(entries)
    }

    /// 1-based position of the player's best matching drive among all
    /// matching drives.
    pub fn rank_of(
        &self,
        user_id: Uuid,
        filter: &LeaderboardFilter,
        now: DateTime<Utc>,
    ) -> BomberResult<RankStatus> {
        let (clause, values) = filter_clause(filter, now);

        let mut best_values = values.clone();
        best_values.push(Value::Text(user_id.to_string()));
        let best_sql = format!(
            "SELECT {} FROM drives WHERE {} AND user_id = ? ORDER BY {} LIMIT 1",
            DRIVE_COLUMNS, clause, RANK_ORDER
        );
        let best = self
            .conn
            .query_row(&best_sql, params_from_iter(best_values), parse_drive_row)
            .optional()?;

        let (seq, best) = match best {
            Some(found) => found,
            None => return Ok(RankStatus::Unranked),
        };

        let recorded_at = format_timestamp(best.recorded_at);
        let mut ahead_values = values.clone();
        ahead_values.extend([
            Value::Integer(best.distance as i64),
            Value::Integer(best.distance as i64),
            Value::Text(recorded_at.clone()),
            Value::Text(recorded_at),
            Value::Integer(seq),
        ]);
        let ahead_sql = format!(
            "SELECT COUNT(*) FROM drives WHERE {} AND (
                distance > ?
                OR (distance = ? AND (recorded_at < ? OR (recorded_at = ? AND seq < ?)))
             )",
            clause
        );
        let ahead: i64 = self
            .conn
            .query_row(&ahead_sql, params_from_iter(ahead_values), |row| row.get(0))?;

        let total_sql = format!("SELECT COUNT(*) FROM drives WHERE {}", clause);
        let total: i64 = self
            .conn
            .query_row(&total_sql, params_from_iter(values), |row| row.get(0))?;

        Ok(RankStatus::Ranked {
            rank: ahead as u32 + 1,
            total_entries: total as u32,
            best_distance: best.distance,
        })
    }

    /// A player's `n` best drives.
    pub fn personal_top(&self, user_id: Uuid, n: usize) -> BomberResult<Vec<DriveRecord>> {
        let sql = format!(
            "SELECT {} FROM drives WHERE user_id = ?1 ORDER BY {} LIMIT ?2",
            DRIVE_COLUMNS, RANK_ORDER
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id.to_string(), n as i64], |row| {
            parse_drive_row(row).map(|(_, drive)| drive)
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(BomberError::from)
    }
}

/// SQL condition and positional values for a filter.
fn filter_clause(filter: &LeaderboardFilter, now: DateTime<Utc>) -> (String, Vec<Value>) {
    let mut conditions = vec!["1 = 1".to_string()];
    let mut values = Vec::new();

    if let Some(venue_id) = &filter.venue_id {
        conditions.push("venue_id = ?".to_string());
        values.push(Value::Text(venue_id.clone()));
    }
    if let Some(night_mode) = filter.night_mode {
        conditions.push("night_mode = ?".to_string());
        values.push(Value::Integer(night_mode as i64));
    }
    if let Some(start) = filter.time_range.start(now) {
        conditions.push("recorded_at >= ?".to_string());
        values.push(Value::Text(format_timestamp(start)));
    }

    (conditions.join(" AND "), values)
}

fn parse_drive_row(row: &Row<'_>) -> rusqlite::Result<(i64, DriveRecord)> {
    Ok((
        row.get(0)?,
        DriveRecord {
            id: get_uuid(row, 1)?,
            user_id: get_uuid(row, 2)?,
            distance: row.get(3)?,
            ball_speed: row.get(4)?,
            launch_angle: row.get(5)?,
            wind: row.get(6)?,
            night_mode: row.get(7)?,
            venue_id: row.get(8)?,
            driver_id: row.get(9)?,
            ball_id: row.get(10)?,
            recorded_at: get_timestamp(row, 11)?,
        },
    ))
}

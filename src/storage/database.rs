//! Database operations using rusqlite.
//!
//! Each user-scoped write runs inside one `BEGIN IMMEDIATE` transaction so
//! that SQLite's writer lock serializes concurrent submissions. Lock
//! conflicts that outlast the busy timeout are retried a bounded number of
//! times before surfacing as [`BomberError::ConcurrencyConflict`].

use crate::error::BomberError;
use crate::storage::config::DatabaseSettings;
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{
    Connection, ErrorCode, Result as SqliteResult, Row, Transaction, TransactionBehavior,
};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
    max_retries: u32,
}

impl Database {
    /// Open or create a database at the given path with default settings.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Self::open_with(path, &DatabaseSettings::default())
    }

    /// Open or create a database at the given path.
    pub fn open_with(path: &Path, settings: &DatabaseSettings) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self {
            conn,
            max_retries: settings.max_retries,
        };
        db.initialize(settings)?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let settings = DatabaseSettings::default();
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self {
            conn,
            max_retries: settings.max_retries,
        };
        db.initialize(&settings)?;

        Ok(db)
    }

    /// Initialize pragmas and the database schema.
    fn initialize(&self, settings: &DatabaseSettings) -> Result<(), DatabaseError> {
        self.conn
            .busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        // Create schema version table
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin an immediate (write-locking) transaction.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, DatabaseError> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DatabaseError::from)
    }

    /// Run `f` inside an immediate transaction and commit it.
    ///
    /// The closure is re-run from scratch when the store reports a lock
    /// conflict, up to the configured retry budget.
    pub fn run_transaction<T, F>(&mut self, mut f: F) -> Result<T, BomberError>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, BomberError>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(&mut f) {
                Err(e) if e.is_transient() && attempts <= self.max_retries => {
                    tracing::warn!("Transaction conflict (attempt {}): {}", attempts, e);
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!("Giving up after {} conflicting attempts", attempts);
                    return Err(BomberError::ConcurrencyConflict { attempts });
                }
                other => return other,
            }
        }
    }

    fn attempt<T, F>(&mut self, f: &mut F) -> Result<T, BomberError>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, BomberError>,
    {
        let mut tx = self.transaction()?;
        let value = f(&mut tx)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }
}

/// Format a timestamp for storage.
///
/// Fixed millisecond precision keeps lexical order equal to time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(e.to_string()))
}

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::DeserializationError(e.to_string()))
}

/// Wrap a column decoding failure for use inside row mappers.
pub fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Read a UUID column.
pub fn get_uuid(row: &Row<'_>, idx: usize) -> SqliteResult<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

/// Read a timestamp column.
pub fn get_timestamp(row: &Row<'_>, idx: usize) -> SqliteResult<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    parse_timestamp(&s).map_err(|e| conversion_error(idx, e))
}

/// Read a nullable timestamp column.
pub fn get_opt_timestamp(row: &Row<'_>, idx: usize) -> SqliteResult<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| parse_timestamp(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Read a `YYYY-MM-DD` column.
pub fn get_date(row: &Row<'_>, idx: usize) -> SqliteResult<NaiveDate> {
    let s: String = row.get(idx)?;
    parse_date(&s).map_err(|e| conversion_error(idx, e))
}

/// Read a nullable `YYYY-MM-DD` column.
pub fn get_opt_date(row: &Row<'_>, idx: usize) -> SqliteResult<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| parse_date(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Read a non-negative counter column.
pub fn get_u64(row: &Row<'_>, idx: usize) -> SqliteResult<u64> {
    let v: i64 = row.get(idx)?;
    Ok(v.max(0) as u64)
}

/// Read a column holding one of the catalog enums' `as_str` forms.
pub fn get_enum<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> SqliteResult<T> {
    let s: String = row.get(idx)?;
    parse(&s).ok_or_else(|| {
        conversion_error(
            idx,
            DatabaseError::DeserializationError(format!("unknown value {:?}", s)),
        )
    })
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _) => match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    DatabaseError::Busy(e.to_string())
                }
                ErrorCode::ConstraintViolation
                    if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    DatabaseError::DuplicateKey(e.to_string())
                }
                ErrorCode::ConstraintViolation => DatabaseError::ConstraintViolation(e.to_string()),
                _ => DatabaseError::QueryFailed(e.to_string()),
            },
            _ => DatabaseError::QueryFailed(e.to_string()),
        }
    }
}

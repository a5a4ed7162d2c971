//! Error taxonomy for the progression engine.
//!
//! Storage failures are wrapped rather than flattened so callers can tell a
//! transient lock conflict (safe to resubmit) from a hard failure.

use crate::storage::config::ConfigError;
use crate::storage::database::DatabaseError;

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum BomberError {
    /// Implausible or malformed input; nothing was mutated.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown user, chest, achievement or equipment id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique-constrained grant already exists. Absorbed internally and
    /// turned into the previously stored result.
    #[error("Already claimed: {0}")]
    AlreadyClaimed(String),

    /// The store kept rejecting the transaction with lock conflicts.
    #[error("Concurrency conflict after {attempts} attempts, please retry")]
    ConcurrencyConflict { attempts: u32 },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BomberError {
    /// Whether the failure is a lock conflict that a retry can resolve.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BomberError::ConcurrencyConflict { .. } | BomberError::Database(DatabaseError::Busy(_))
        )
    }

    /// Whether the failure came from a unique key rejecting a second insert.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            BomberError::AlreadyClaimed(_) | BomberError::Database(DatabaseError::DuplicateKey(_))
        )
    }
}

impl From<rusqlite::Error> for BomberError {
    fn from(e: rusqlite::Error) -> Self {
        BomberError::Database(DatabaseError::from(e))
    }
}

impl From<serde_json::Error> for BomberError {
    fn from(e: serde_json::Error) -> Self {
        BomberError::Database(DatabaseError::SerializationError(e.to_string()))
    }
}

/// Result alias used across the engine.
pub type BomberResult<T> = Result<T, BomberError>;

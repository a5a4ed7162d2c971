//! Bomber - driving-distance progression and rewards engine
//!
//! Turns recorded drives into persistent player state: XP, levels,
//! divisions, equipment, loot chests, achievements, daily challenges and
//! leaderboard rank. All state lives in SQLite; each write is one
//! immediate transaction.

pub mod accounts;
pub mod achievements;
pub mod catalog;
pub mod challenges;
pub mod error;
pub mod leaderboards;
pub mod ledger;
pub mod progression;
pub mod rewards;
pub mod service;
pub mod storage;
pub mod submission;

// Re-export commonly used types
pub use accounts::{AccountDirectory, InMemoryAccounts};
pub use error::{BomberError, BomberResult};
pub use ledger::manager::LedgerManager;
pub use service::BomberService;
pub use storage::config::AppConfig;
pub use submission::{submit_drive, RawDriveEvent, SubmissionResult};

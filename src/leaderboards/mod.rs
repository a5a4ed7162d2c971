//! Leaderboards module
//!
//! Append-only drive log and the rankings derived from it.

pub mod rankings;

// Re-export commonly used types
pub use rankings::{
    DriveRecord, LeaderboardEntry, LeaderboardFilter, LeaderboardManager, RankStatus, TimeRange,
};

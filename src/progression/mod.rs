//! Progression module
//!
//! Pure projections of cumulative XP: the level curve and the division
//! ladder, plus the per-drive XP formula and streak rules.

pub mod curve;
pub mod divisions;
pub mod streak;
pub mod xp;

pub use curve::{level_from_xp, LevelProgress};
pub use divisions::{division_from_xp, next_division, Division};
pub use streak::{advance_streak, StreakUpdate};
pub use xp::{xp_for_drive, XpBreakdown, XpInput};

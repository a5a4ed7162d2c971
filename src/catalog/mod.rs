//! Reward catalog module
//!
//! Static tables for equipment, achievements, daily challenges and venues.
//! Entries are immutable data keyed by id.

pub mod achievements;
pub mod challenges;
pub mod equipment;
pub mod types;
pub mod venues;

// Re-export commonly used types
pub use achievements::{achievement, ACHIEVEMENTS};
pub use challenges::{challenge_for_date, DAILY_CHALLENGES};
pub use equipment::{equipment, require_equipment, EQUIPMENT};
pub use types::{
    AchievementDef, ChallengeDef, ChestType, DriveStats, EquipmentItem, EquipmentType, Rarity,
    RewardPayload, StatsSnapshot, Venue,
};
pub use venues::{venue, VENUES};

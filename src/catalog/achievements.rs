//! Achievement definitions.

use super::types::{
    AchievementCategory, AchievementDef, ChestType, CriteriaType, Criterion, RewardPayload,
};
use crate::error::BomberError;

/// All achievements in display order.
pub static ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_swing",
        name: "First Swing",
        description: "Record your first drive",
        icon: "🏌️",
        category: AchievementCategory::Volume,
        requirements: &[Criterion::new(CriteriaType::TotalDrives, 1)],
        reward: RewardPayload {
            coins: 50,
            gems: 0,
            chest: None,
        },
    },
    // Distance
    AchievementDef {
        id: "century_drive",
        name: "Century Drive",
        description: "Hit a drive of 300 yards or more",
        icon: "💯",
        category: AchievementCategory::Distance,
        requirements: &[
            Criterion::new(CriteriaType::TotalDrives, 1),
            Criterion::new(CriteriaType::BestDistance, 300),
        ],
        reward: RewardPayload {
            coins: 150,
            gems: 2,
            chest: None,
        },
    },
    AchievementDef {
        id: "big_bomber",
        name: "Big Bomber",
        description: "Hit a drive of 350 yards or more",
        icon: "💣",
        category: AchievementCategory::Distance,
        requirements: &[Criterion::new(CriteriaType::BestDistance, 350)],
        reward: RewardPayload {
            coins: 300,
            gems: 5,
            chest: Some(ChestType::Gold),
        },
    },
    AchievementDef {
        id: "monster_drive",
        name: "Monster Drive",
        description: "Hit a drive of 400 yards or more",
        icon: "🚀",
        category: AchievementCategory::Distance,
        requirements: &[Criterion::new(CriteriaType::BestDistance, 400)],
        reward: RewardPayload {
            coins: 500,
            gems: 15,
            chest: Some(ChestType::Platinum),
        },
    },
    // Volume
    AchievementDef {
        id: "regular",
        name: "Range Regular",
        description: "Record 10 drives",
        icon: "🎯",
        category: AchievementCategory::Volume,
        requirements: &[Criterion::new(CriteriaType::TotalDrives, 10)],
        reward: RewardPayload {
            coins: 100,
            gems: 0,
            chest: None,
        },
    },
    AchievementDef {
        id: "grinder",
        name: "Grinder",
        description: "Record 100 drives",
        icon: "⚙️",
        category: AchievementCategory::Volume,
        requirements: &[Criterion::new(CriteriaType::TotalDrives, 100)],
        reward: RewardPayload {
            coins: 500,
            gems: 0,
            chest: Some(ChestType::Silver),
        },
    },
    AchievementDef {
        id: "marathon",
        name: "Bucket Marathon",
        description: "Record 1,000 drives",
        icon: "🏆",
        category: AchievementCategory::Volume,
        requirements: &[Criterion::new(CriteriaType::TotalDrives, 1000)],
        reward: RewardPayload {
            coins: 0,
            gems: 25,
            chest: Some(ChestType::Platinum),
        },
    },
    AchievementDef {
        id: "night_owl",
        name: "Night Owl",
        description: "Record 10 drives in night mode",
        icon: "🦉",
        category: AchievementCategory::Volume,
        requirements: &[Criterion::new(CriteriaType::NightDrives, 10)],
        reward: RewardPayload {
            coins: 150,
            gems: 0,
            chest: None,
        },
    },
    // Consistency
    AchievementDef {
        id: "hat_trick",
        name: "Hat Trick",
        description: "Play 3 days in a row",
        icon: "📅",
        category: AchievementCategory::Consistency,
        requirements: &[Criterion::new(CriteriaType::LongestStreak, 3)],
        reward: RewardPayload {
            coins: 75,
            gems: 0,
            chest: None,
        },
    },
    AchievementDef {
        id: "week_warrior",
        name: "Week Warrior",
        description: "Play 7 days in a row",
        icon: "🔥",
        category: AchievementCategory::Consistency,
        requirements: &[Criterion::new(CriteriaType::LongestStreak, 7)],
        reward: RewardPayload {
            coins: 200,
            gems: 0,
            chest: Some(ChestType::Silver),
        },
    },
    AchievementDef {
        id: "iron_habit",
        name: "Iron Habit",
        description: "Play 30 days in a row",
        icon: "🌟",
        category: AchievementCategory::Consistency,
        requirements: &[Criterion::new(CriteriaType::LongestStreak, 30)],
        reward: RewardPayload {
            coins: 0,
            gems: 20,
            chest: Some(ChestType::Gold),
        },
    },
    // Collection
    AchievementDef {
        id: "collector",
        name: "Collector",
        description: "Own 5 different pieces of equipment",
        icon: "🎒",
        category: AchievementCategory::Collection,
        requirements: &[Criterion::new(CriteriaType::EquipmentOwned, 5)],
        reward: RewardPayload {
            coins: 200,
            gems: 0,
            chest: None,
        },
    },
    AchievementDef {
        id: "full_bag",
        name: "Full Bag",
        description: "Own 12 different pieces of equipment",
        icon: "👜",
        category: AchievementCategory::Collection,
        requirements: &[Criterion::new(CriteriaType::EquipmentOwned, 12)],
        reward: RewardPayload {
            coins: 0,
            gems: 10,
            chest: None,
        },
    },
    // Progression
    AchievementDef {
        id: "level_10",
        name: "Double Digits",
        description: "Reach level 10",
        icon: "🔟",
        category: AchievementCategory::Progression,
        requirements: &[Criterion::new(CriteriaType::Level, 10)],
        reward: RewardPayload {
            coins: 0,
            gems: 5,
            chest: Some(ChestType::Gold),
        },
    },
    AchievementDef {
        id: "level_25",
        name: "Seasoned Striker",
        description: "Reach level 25",
        icon: "👑",
        category: AchievementCategory::Progression,
        requirements: &[Criterion::new(CriteriaType::Level, 25)],
        reward: RewardPayload {
            coins: 1000,
            gems: 10,
            chest: Some(ChestType::Platinum),
        },
    },
];

/// Look up an achievement definition.
pub fn achievement(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Look up an achievement that must exist.
pub fn require_achievement(id: &str) -> Result<&'static AchievementDef, BomberError> {
    achievement(id).ok_or_else(|| BomberError::NotFound(format!("achievement {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::StatsSnapshot;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<_> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_every_achievement_has_requirements() {
        assert!(ACHIEVEMENTS.iter().all(|a| !a.requirements.is_empty()));
    }

    #[test]
    fn test_century_drive_predicate() {
        let def = achievement("century_drive").unwrap();
        let short = StatsSnapshot {
            total_drives: 1,
            best_distance: 299,
            ..Default::default()
        };
        let long = StatsSnapshot {
            best_distance: 310,
            ..short
        };
        assert!(!def.is_met(&short));
        assert!(def.is_met(&long));
    }
}

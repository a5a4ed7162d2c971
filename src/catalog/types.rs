//! Core catalog types.
//!
//! Catalog entries are plain tagged records keyed by string id. Behavior
//! hangs off the enums, never off per-entry code.

use serde::{Deserialize, Serialize};

/// Equipment rarity, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers in ascending order.
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

/// Equipment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Driver,
    Ball,
}

impl EquipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::Driver => "driver",
            EquipmentType::Ball => "ball",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "driver" => Some(EquipmentType::Driver),
            "ball" => Some(EquipmentType::Ball),
            _ => None,
        }
    }
}

/// Chest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestType {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ChestType {
    pub const ALL: [ChestType; 4] = [
        ChestType::Bronze,
        ChestType::Silver,
        ChestType::Gold,
        ChestType::Platinum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChestType::Bronze => "bronze",
            ChestType::Silver => "silver",
            ChestType::Gold => "gold",
            ChestType::Platinum => "platinum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bronze" => Some(ChestType::Bronze),
            "silver" => Some(ChestType::Silver),
            "gold" => Some(ChestType::Gold),
            "platinum" => Some(ChestType::Platinum),
            _ => None,
        }
    }
}

/// Equipment definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquipmentItem {
    pub id: &'static str,
    pub name: &'static str,
    pub equipment_type: EquipmentType,
    pub rarity: Rarity,
    pub description: &'static str,
}

/// Reward granted by an achievement or challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardPayload {
    pub coins: u64,
    pub gems: u64,
    pub chest: Option<ChestType>,
}

/// Achievement category, for grouping in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    /// Single-drive distance milestones
    Distance,
    /// Drive count milestones
    Volume,
    /// Streak-based achievements
    Consistency,
    /// Equipment collection
    Collection,
    /// Level milestones
    Progression,
}

impl AchievementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Distance => "distance",
            AchievementCategory::Volume => "volume",
            AchievementCategory::Consistency => "consistency",
            AchievementCategory::Collection => "collection",
            AchievementCategory::Progression => "progression",
        }
    }
}

/// Statistic an achievement criterion reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaType {
    TotalDrives,
    BestDistance,
    LongestStreak,
    NightDrives,
    Level,
    EquipmentOwned,
}

/// One threshold over the stats snapshot: `stat >= value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Criterion {
    pub kind: CriteriaType,
    pub value: u64,
}

impl Criterion {
    pub const fn new(kind: CriteriaType, value: u64) -> Self {
        Self { kind, value }
    }

    /// Whether the snapshot satisfies this criterion.
    pub fn is_met(&self, stats: &StatsSnapshot) -> bool {
        let current = match self.kind {
            CriteriaType::TotalDrives => stats.total_drives,
            CriteriaType::BestDistance => stats.best_distance,
            CriteriaType::LongestStreak => stats.longest_streak,
            CriteriaType::NightDrives => stats.night_drives,
            CriteriaType::Level => stats.level,
            CriteriaType::EquipmentOwned => stats.equipment_owned,
        };
        current >= self.value
    }
}

/// Achievement definition. Unlocks when every requirement holds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub requirements: &'static [Criterion],
    pub reward: RewardPayload,
}

impl AchievementDef {
    pub fn is_met(&self, stats: &StatsSnapshot) -> bool {
        self.requirements.iter().all(|c| c.is_met(stats))
    }
}

/// Player statistics the achievement predicates are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub total_drives: u64,
    pub best_distance: u64,
    pub longest_streak: u64,
    pub night_drives: u64,
    pub level: u64,
    pub equipment_owned: u64,
}

/// Condition a single drive must satisfy to complete a daily challenge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeCondition {
    /// Carry at least `min_yards`
    Distance { min_yards: u32 },
    /// Carry at least `min_yards` with night mode on
    NightDistance { min_yards: u32 },
    /// Ball speed of at least `min_mph`
    BallSpeed { min_mph: f64 },
    /// Launch angle inside the window and at least `min_yards`
    LaunchWindow {
        min_degrees: f64,
        max_degrees: f64,
        min_yards: u32,
    },
    /// Headwind of at least `min_wind` mph and at least `min_yards`
    Headwind { min_wind: f64, min_yards: u32 },
    /// At least `drives` drives recorded today
    DriveCount { drives: u32 },
}

impl ChallengeCondition {
    /// Whether the drive stats satisfy the condition.
    pub fn is_met(&self, stats: &DriveStats) -> bool {
        match *self {
            ChallengeCondition::Distance { min_yards } => stats.distance >= min_yards,
            ChallengeCondition::NightDistance { min_yards } => {
                stats.night_mode && stats.distance >= min_yards
            }
            ChallengeCondition::BallSpeed { min_mph } => stats.ball_speed >= min_mph,
            ChallengeCondition::LaunchWindow {
                min_degrees,
                max_degrees,
                min_yards,
            } => {
                (min_degrees..=max_degrees).contains(&stats.launch_angle)
                    && stats.distance >= min_yards
            }
            // Negative wind is blowing into the golfer
            ChallengeCondition::Headwind {
                min_wind,
                min_yards,
            } => -stats.wind >= min_wind && stats.distance >= min_yards,
            ChallengeCondition::DriveCount { drives } => stats.drives_today >= drives,
        }
    }
}

/// The drive facts a challenge claim is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveStats {
    pub distance: u32,
    pub ball_speed: f64,
    pub launch_angle: f64,
    /// mph; positive is a tailwind, negative a headwind
    pub wind: f64,
    pub night_mode: bool,
    pub drives_today: u32,
}

/// Daily challenge template.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChallengeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: ChallengeCondition,
    pub reward: RewardPayload,
}

/// Prerequisite for playing a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VenueRequirement {
    None,
    /// Division id that must have been reached
    Division(&'static str),
    TotalDrives(u64),
    Level(u64),
}

/// Venue definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Venue {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: VenueRequirement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_ordering() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }

    #[test]
    fn test_enum_string_roundtrip() {
        for rarity in Rarity::ALL {
            assert_eq!(Rarity::from_str(rarity.as_str()), Some(rarity));
        }
        for chest in ChestType::ALL {
            assert_eq!(ChestType::from_str(chest.as_str()), Some(chest));
        }
        assert_eq!(EquipmentType::from_str("putter"), None);
    }

    #[test]
    fn test_criterion_threshold() {
        let stats = StatsSnapshot {
            best_distance: 300,
            ..Default::default()
        };
        assert!(Criterion::new(CriteriaType::BestDistance, 300).is_met(&stats));
        assert!(!Criterion::new(CriteriaType::BestDistance, 301).is_met(&stats));
    }

    #[test]
    fn test_night_distance_requires_night_mode() {
        let condition = ChallengeCondition::NightDistance { min_yards: 250 };
        let mut stats = DriveStats {
            distance: 280,
            ..Default::default()
        };
        assert!(!condition.is_met(&stats));
        stats.night_mode = true;
        assert!(condition.is_met(&stats));
    }

    #[test]
    fn test_headwind_sign() {
        let condition = ChallengeCondition::Headwind {
            min_wind: 10.0,
            min_yards: 200,
        };
        let tailwind = DriveStats {
            distance: 260,
            wind: 15.0,
            ..Default::default()
        };
        let headwind = DriveStats {
            wind: -12.0,
            ..tailwind
        };
        assert!(!condition.is_met(&tailwind));
        assert!(condition.is_met(&headwind));
    }
}

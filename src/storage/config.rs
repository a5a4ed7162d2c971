//! Engine configuration.
//!
//! Every balancing knob (level curve, XP formula, streak grace, chest
//! weights, plausibility limits) lives here so it can be tuned from
//! `config.toml` without a rebuild. A missing file or section means defaults.

use crate::catalog::types::{ChestType, Rarity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub progression: ProgressionSettings,
    pub xp: XpSettings,
    pub streak: StreakSettings,
    pub chests: ChestSettings,
    pub limits: DriveLimits,
    /// Static account directory used by the command-line front end.
    pub accounts: Vec<AccountEntry>,
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file; defaults to `bomber.db` in the data directory
    pub path: Option<PathBuf>,
    /// How long a writer waits on the lock before reporting busy
    pub busy_timeout_ms: u64,
    /// Retries after a busy/locked failure before giving up
    pub max_retries: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5000,
            max_retries: 3,
        }
    }
}

impl DatabaseSettings {
    /// Resolve the database path, falling back to the data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| get_data_dir().join("bomber.db"))
    }
}

/// Level curve coefficients.
///
/// XP to advance from level `L` is `base + linear*(L-1) + quadratic*(L-1)^2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionSettings {
    pub base_xp: u64,
    pub linear_xp: u64,
    pub quadratic_xp: u64,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            base_xp: 100,
            linear_xp: 25,
            quadratic_xp: 5,
        }
    }
}

/// Per-drive XP and coin formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XpSettings {
    /// Yards of carry per point of base XP
    pub yards_per_xp: u32,
    /// Floor for base XP on any valid drive
    pub min_xp: u64,
    pub night_bonus_pct: u64,
    pub streak_bonus_pct_per_day: u64,
    pub max_streak_bonus_pct: u64,
    /// Bonus percentage by rarity of the driver used
    pub rarity_bonus_pct: RarityTable,
    pub coins_per_drive: u64,
    /// Credited on the first drive of each calendar day
    pub daily_bonus_coins: u64,
}

impl Default for XpSettings {
    fn default() -> Self {
        Self {
            yards_per_xp: 5,
            min_xp: 5,
            night_bonus_pct: 20,
            streak_bonus_pct_per_day: 2,
            max_streak_bonus_pct: 20,
            rarity_bonus_pct: RarityTable {
                common: 0,
                rare: 5,
                epic: 10,
                legendary: 15,
            },
            coins_per_drive: 5,
            daily_bonus_coins: 50,
        }
    }
}

/// Streak rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakSettings {
    /// Missed days tolerated before the streak resets
    pub grace_days: u32,
}

/// A value per rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityTable {
    pub common: u64,
    pub rare: u64,
    pub epic: u64,
    pub legendary: u64,
}

impl RarityTable {
    pub fn get(&self, rarity: Rarity) -> u64 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// Contents rules for one chest tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChestTierSettings {
    /// Reward slots drawn per open (capped by tiers with non-zero weight)
    pub slots: u8,
    /// Relative draw weight per rarity tier
    pub weights: RarityTable,
    pub coin_floor: u64,
    pub gem_floor: u64,
}

impl Default for ChestTierSettings {
    fn default() -> Self {
        Self {
            slots: 1,
            weights: RarityTable {
                common: 1,
                ..Default::default()
            },
            coin_floor: 0,
            gem_floor: 0,
        }
    }
}

/// Chest weight tables and duplicate payouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChestSettings {
    pub bronze: ChestTierSettings,
    pub silver: ChestTierSettings,
    pub gold: ChestTierSettings,
    pub platinum: ChestTierSettings,
    /// Coins paid instead of a duplicate item
    pub duplicate_coins: RarityTable,
}

impl Default for ChestSettings {
    fn default() -> Self {
        Self {
            bronze: ChestTierSettings {
                slots: 1,
                weights: RarityTable {
                    common: 70,
                    rare: 22,
                    epic: 7,
                    legendary: 1,
                },
                coin_floor: 20,
                gem_floor: 0,
            },
            silver: ChestTierSettings {
                slots: 2,
                weights: RarityTable {
                    common: 55,
                    rare: 30,
                    epic: 12,
                    legendary: 3,
                },
                coin_floor: 50,
                gem_floor: 1,
            },
            gold: ChestTierSettings {
                slots: 3,
                weights: RarityTable {
                    common: 35,
                    rare: 38,
                    epic: 20,
                    legendary: 7,
                },
                coin_floor: 120,
                gem_floor: 3,
            },
            platinum: ChestTierSettings {
                slots: 4,
                weights: RarityTable {
                    common: 15,
                    rare: 40,
                    epic: 30,
                    legendary: 15,
                },
                coin_floor: 300,
                gem_floor: 8,
            },
            duplicate_coins: RarityTable {
                common: 25,
                rare: 75,
                epic: 200,
                legendary: 500,
            },
        }
    }
}

impl ChestSettings {
    /// Settings for a chest tier.
    pub fn tier(&self, chest_type: ChestType) -> &ChestTierSettings {
        match chest_type {
            ChestType::Bronze => &self.bronze,
            ChestType::Silver => &self.silver,
            ChestType::Gold => &self.gold,
            ChestType::Platinum => &self.platinum,
        }
    }
}

/// Physically plausible bounds for a recorded drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveLimits {
    pub min_distance: u32,
    pub max_distance: u32,
    pub max_ball_speed: f64,
    pub min_launch_angle: f64,
    pub max_launch_angle: f64,
    pub max_wind: f64,
}

impl Default for DriveLimits {
    fn default() -> Self {
        Self {
            min_distance: 1,
            max_distance: 500,
            max_ball_speed: 230.0,
            min_launch_angle: -10.0,
            max_launch_angle: 60.0,
            max_wind: 60.0,
        }
    }
}

/// One entry of the static account directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub id: Uuid,
    pub username: String,
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "bomber", "Bomber")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from a file; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    /// Reject settings that would break the pure functions downstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progression.base_xp == 0 {
            return Err(ConfigError::Invalid(
                "progression.base_xp must be positive".to_string(),
            ));
        }
        if self.xp.yards_per_xp == 0 {
            return Err(ConfigError::Invalid(
                "xp.yards_per_xp must be positive".to_string(),
            ));
        }
        if self.limits.min_distance > self.limits.max_distance {
            return Err(ConfigError::Invalid(
                "limits.min_distance exceeds limits.max_distance".to_string(),
            ));
        }
        for chest_type in ChestType::ALL {
            let tier = self.chests.tier(chest_type);
            let total = Rarity::ALL.iter().map(|r| tier.weights.get(*r)).sum::<u64>();
            if total == 0 {
                return Err(ConfigError::Invalid(format!(
                    "chests.{} has no positive weight",
                    chest_type.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Save configuration to a file.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

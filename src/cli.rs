//! Command-line argument parsing.

use std::path::PathBuf;

use bomber::leaderboards::{LeaderboardFilter, TimeRange};
use bomber::submission::{EquipmentUsed, RawDriveEvent};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

/// Bomber progression and rewards
#[derive(Parser)]
#[command(name = "bomber")]
#[command(about = "Bomber driving-distance progression and rewards", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to config.toml in the data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Player id or username from the account directory
    #[arg(long, short, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show profile, level and division
    Profile,

    /// Submit a drive
    Drive(DriveArgs),

    /// Show the top drives
    Leaderboard {
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show the player's rank
    Rank {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show the player's best drives
    Best {
        #[arg(long, short = 'n', default_value_t = 5)]
        limit: usize,
    },

    /// List unlocked achievements
    Achievements,

    /// List venues and whether they are unlocked
    Venues,

    /// List pending and opened chests
    Chests,

    /// Open a chest
    OpenChest { chest_id: Uuid },

    /// Show today's challenge
    Challenge,

    /// Claim today's challenge with a drive booked today
    Claim,

    /// Equip an owned driver or ball
    Equip { equipment_id: String },

    /// Spend coins to upgrade an owned item
    Upgrade { equipment_id: String },
}

#[derive(Args)]
pub struct DriveArgs {
    /// Carry in yards
    pub distance: f64,

    /// Ball speed in mph
    #[arg(long, default_value_t = 150.0)]
    pub ball_speed: f64,

    /// Launch angle in degrees
    #[arg(long, default_value_t = 12.0, allow_hyphen_values = true)]
    pub launch_angle: f64,

    /// Wind in mph, negative for a headwind
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub wind: f64,

    #[arg(long)]
    pub night: bool,

    #[arg(long, default_value = bomber::catalog::venues::DEFAULT_VENUE_ID)]
    pub venue: String,

    /// Driver to use instead of the equipped one (requires --ball)
    #[arg(long, requires = "ball")]
    pub driver: Option<String>,

    /// Ball to use instead of the equipped one (requires --driver)
    #[arg(long, requires = "driver")]
    pub ball: Option<String>,
}

impl DriveArgs {
    pub fn to_event(&self) -> RawDriveEvent {
        let equipment_used = match (&self.driver, &self.ball) {
            (Some(driver_id), Some(ball_id)) => Some(EquipmentUsed {
                driver_id: driver_id.clone(),
                ball_id: ball_id.clone(),
            }),
            _ => None,
        };
        RawDriveEvent {
            distance: self.distance,
            ball_speed: self.ball_speed,
            launch_angle: self.launch_angle,
            wind: self.wind,
            night_mode: self.night,
            venue_id: self.venue.clone(),
            equipment_used,
        }
    }
}

#[derive(Args)]
pub struct FilterArgs {
    /// Only drives at this venue
    #[arg(long)]
    pub venue: Option<String>,

    /// Only night (true) or day (false) drives
    #[arg(long)]
    pub night: Option<bool>,

    /// all_time, today, this_week or this_month
    #[arg(long, default_value = "all_time", value_parser = parse_time_range)]
    pub range: TimeRange,
}

impl FilterArgs {
    pub fn to_filter(&self) -> LeaderboardFilter {
        LeaderboardFilter {
            venue_id: self.venue.clone(),
            night_mode: self.night,
            time_range: self.range,
        }
    }
}

fn parse_time_range(s: &str) -> Result<TimeRange, String> {
    TimeRange::from_str(s).ok_or_else(|| format!("unknown time range '{}'", s))
}

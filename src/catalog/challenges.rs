//! Daily challenge templates and the date rotation.

use chrono::{Datelike, NaiveDate};

use super::types::{ChallengeCondition, ChallengeDef, ChestType, RewardPayload};

/// Challenge templates in rotation order.
pub static DAILY_CHALLENGES: &[ChallengeDef] = &[
    ChallengeDef {
        id: "long_haul",
        name: "Long Haul",
        description: "Carry a drive 280 yards",
        condition: ChallengeCondition::Distance { min_yards: 280 },
        reward: RewardPayload {
            coins: 100,
            gems: 0,
            chest: None,
        },
    },
    ChallengeDef {
        id: "moonlight_bomber",
        name: "Moonlight Bomber",
        description: "Carry a drive 250 yards in night mode",
        condition: ChallengeCondition::NightDistance { min_yards: 250 },
        reward: RewardPayload {
            coins: 150,
            gems: 1,
            chest: None,
        },
    },
    ChallengeDef {
        id: "speed_demon",
        name: "Speed Demon",
        description: "Reach 160 mph ball speed",
        condition: ChallengeCondition::BallSpeed { min_mph: 160.0 },
        reward: RewardPayload {
            coins: 120,
            gems: 0,
            chest: None,
        },
    },
    ChallengeDef {
        id: "launch_window",
        name: "Launch Window",
        description: "Launch between 10 and 14 degrees and carry 250 yards",
        condition: ChallengeCondition::LaunchWindow {
            min_degrees: 10.0,
            max_degrees: 14.0,
            min_yards: 250,
        },
        reward: RewardPayload {
            coins: 120,
            gems: 0,
            chest: None,
        },
    },
    ChallengeDef {
        id: "into_the_wind",
        name: "Into the Wind",
        description: "Carry 230 yards into a 10 mph headwind",
        condition: ChallengeCondition::Headwind {
            min_wind: 10.0,
            min_yards: 230,
        },
        reward: RewardPayload {
            coins: 150,
            gems: 0,
            chest: None,
        },
    },
    ChallengeDef {
        id: "volume_day",
        name: "Volume Day",
        description: "Record 5 drives today",
        condition: ChallengeCondition::DriveCount { drives: 5 },
        reward: RewardPayload {
            coins: 80,
            gems: 0,
            chest: None,
        },
    },
    ChallengeDef {
        id: "big_stick",
        name: "Big Stick",
        description: "Carry a drive 320 yards",
        condition: ChallengeCondition::Distance { min_yards: 320 },
        reward: RewardPayload {
            coins: 200,
            gems: 0,
            chest: Some(ChestType::Bronze),
        },
    },
];

/// The challenge active on `date`.
///
/// Indexed by days since the Common Era so every player sees the same
/// challenge all day and the rotation never restarts at New Year.
pub fn challenge_for_date(date: NaiveDate) -> &'static ChallengeDef {
    let day = date.num_days_from_ce().max(0) as usize;
    &DAILY_CHALLENGES[day % DAILY_CHALLENGES.len()]
}

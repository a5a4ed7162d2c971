//! Daily challenges module

pub mod tracker;

pub use tracker::{ChallengeReward, ChallengeTracker, ClaimOutcome, DailyChallengeStatus};

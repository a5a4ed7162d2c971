//! Achievements module
//!
//! Evaluates achievement predicates and grants each at most once per player.

pub mod evaluator;

pub use evaluator::{AchievementEvaluator, AchievementUnlock, UnlockedAchievement};

//! Rewards module
//!
//! Chest content generation and the persisted chest lifecycle.

pub mod chests;
pub mod generator;

pub use chests::{Chest, ChestManager, OpenedChest};
pub use generator::{roll_chest, RewardBundle, RewardItem};

//! Level curve.
//!
//! Levels start at 1. The XP needed to leave a level grows quadratically,
//! so late levels take proportionally longer.

use serde::Serialize;

use crate::storage::config::ProgressionSettings;

/// Where a cumulative XP total sits on the level curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub level: u64,
    /// XP earned since reaching `level`
    pub current_xp_in_level: u64,
    /// XP the whole of `level` spans
    pub xp_required_for_next_level: u64,
}

impl LevelProgress {
    /// XP still missing before the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        self.xp_required_for_next_level - self.current_xp_in_level
    }

    /// Fraction of the current level completed, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        self.current_xp_in_level as f64 / self.xp_required_for_next_level as f64
    }
}

/// XP needed to advance from `level` to `level + 1`. Never zero.
pub fn xp_for_level(level: u64, settings: &ProgressionSettings) -> u64 {
    let n = level.saturating_sub(1);
    settings
        .base_xp
        .saturating_add(settings.linear_xp.saturating_mul(n))
        .saturating_add(settings.quadratic_xp.saturating_mul(n.saturating_mul(n)))
        .max(1)
}

/// Cumulative XP at which `level` is reached.
pub fn total_xp_for_level(level: u64, settings: &ProgressionSettings) -> u64 {
    (1..level.max(1)).fold(0u64, |total, l| {
        total.saturating_add(xp_for_level(l, settings))
    })
}

/// Map cumulative XP to a level and the progress within it.
pub fn level_from_xp(xp: u64, settings: &ProgressionSettings) -> LevelProgress {
    let mut level = 1;
    let mut remaining = xp;
    loop {
        let step = xp_for_level(level, settings);
        if remaining < step {
            return LevelProgress {
                level,
                current_xp_in_level: remaining,
                xp_required_for_next_level: step,
            };
        }
        remaining -= step;
        level += 1;
    }
}

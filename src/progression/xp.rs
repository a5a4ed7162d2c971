//! XP awarded per drive.

use serde::Serialize;

use crate::catalog::types::Rarity;
use crate::storage::config::XpSettings;

/// Drive facts the XP formula reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpInput {
    pub distance: u32,
    pub night_mode: bool,
    /// Streak including the day of this drive
    pub streak: u32,
    pub driver_rarity: Rarity,
}

/// How a drive's XP was put together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpBreakdown {
    pub base: u64,
    pub night_bonus_pct: u64,
    pub streak_bonus_pct: u64,
    pub rarity_bonus_pct: u64,
    pub total: u64,
}

/// Streak bonus percentage; the first day of a streak earns nothing.
pub fn streak_bonus_pct(streak: u32, settings: &XpSettings) -> u64 {
    (streak.saturating_sub(1) as u64)
        .saturating_mul(settings.streak_bonus_pct_per_day)
        .min(settings.max_streak_bonus_pct)
}

/// XP for one drive. Integer arithmetic, rounded down.
pub fn xp_for_drive(input: &XpInput, settings: &XpSettings) -> XpBreakdown {
    let per = settings.yards_per_xp.max(1);
    let base = (input.distance / per) as u64;
    let base = base.max(settings.min_xp);

    let night_bonus_pct = if input.night_mode {
        settings.night_bonus_pct
    } else {
        0
    };
    let streak_bonus_pct = streak_bonus_pct(input.streak, settings);
    let rarity_bonus_pct = settings.rarity_bonus_pct.get(input.driver_rarity);

    let multiplier = 100u64
        .saturating_add(night_bonus_pct)
        .saturating_add(streak_bonus_pct)
        .saturating_add(rarity_bonus_pct);
    let total = base.saturating_mul(multiplier) / 100;

    XpBreakdown {
        base,
        night_bonus_pct,
        streak_bonus_pct,
        rarity_bonus_pct,
        total,
    }
}

//! Division ladder.

use serde::Serialize;

/// A named rank tier reached at `min_xp` cumulative XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Division {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub min_xp: u64,
}

/// Divisions sorted by ascending `min_xp`. The first entry starts at zero.
pub static DIVISIONS: &[Division] = &[
    Division {
        id: "bronze",
        name: "Bronze",
        color: "#CD7F32",
        icon: "🥉",
        min_xp: 0,
    },
    Division {
        id: "silver",
        name: "Silver",
        color: "#C0C0C0",
        icon: "🥈",
        min_xp: 1_000,
    },
    Division {
        id: "gold",
        name: "Gold",
        color: "#FFD700",
        icon: "🥇",
        min_xp: 3_000,
    },
    Division {
        id: "platinum",
        name: "Platinum",
        color: "#E5E4E2",
        icon: "💠",
        min_xp: 7_500,
    },
    Division {
        id: "diamond",
        name: "Diamond",
        color: "#B9F2FF",
        icon: "💎",
        min_xp: 15_000,
    },
    Division {
        id: "legendary",
        name: "Legendary",
        color: "#9B30FF",
        icon: "👑",
        min_xp: 30_000,
    },
];

fn position_for_xp(xp: u64) -> usize {
    // partition_point counts entries with min_xp <= xp; the first is always 0
    DIVISIONS
        .partition_point(|d| d.min_xp <= xp)
        .saturating_sub(1)
}

/// The highest division whose threshold `xp` has reached.
pub fn division_from_xp(xp: u64) -> &'static Division {
    &DIVISIONS[position_for_xp(xp)]
}

/// The division above the current one, or `None` at the top.
pub fn next_division(xp: u64) -> Option<&'static Division> {
    DIVISIONS.get(position_for_xp(xp) + 1)
}

/// XP still needed to reach the next division.
pub fn xp_to_next_division(xp: u64) -> Option<u64> {
    next_division(xp).map(|d| d.min_xp - xp)
}

/// Look up a division by id.
pub fn division(id: &str) -> Option<&'static Division> {
    DIVISIONS.iter().find(|d| d.id == id)
}

//! Venue definitions and unlock rules.

use serde::Serialize;

use super::types::{Venue, VenueRequirement};
use crate::progression::divisions::{division, division_from_xp};

/// Venue every player can use.
pub const DEFAULT_VENUE_ID: &str = "driving_range";

/// All venues, easiest first.
pub static VENUES: &[Venue] = &[
    Venue {
        id: DEFAULT_VENUE_ID,
        name: "Driving Range",
        description: "Flat mats and a wide-open field",
        requirement: VenueRequirement::None,
    },
    Venue {
        id: "links_course",
        name: "Links Course",
        description: "Firm seaside fairways with plenty of roll",
        requirement: VenueRequirement::TotalDrives(10),
    },
    Venue {
        id: "desert_canyon",
        name: "Desert Canyon",
        description: "Thin air and a long carry over the wash",
        requirement: VenueRequirement::Division("silver"),
    },
    Venue {
        id: "night_stadium",
        name: "Night Stadium",
        description: "Floodlit target greens after dark",
        requirement: VenueRequirement::Level(8),
    },
    Venue {
        id: "mountain_peak",
        name: "Mountain Peak",
        description: "High altitude tee box above the clouds",
        requirement: VenueRequirement::Division("gold"),
    },
    Venue {
        id: "volcano_rim",
        name: "Volcano Rim",
        description: "One shot across the crater, no second chances",
        requirement: VenueRequirement::Division("diamond"),
    },
];

/// Player facts venue requirements are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VenueProgress {
    pub xp: u64,
    pub level: u64,
    pub total_drives: u64,
}

/// A venue and whether the player may use it.
#[derive(Debug, Clone, Serialize)]
pub struct VenueStatus {
    pub venue: Venue,
    pub unlocked: bool,
}

/// Look up a venue by id.
pub fn venue(id: &str) -> Option<&'static Venue> {
    VENUES.iter().find(|v| v.id == id)
}

/// Whether the player meets the venue's prerequisite.
pub fn is_unlocked(venue: &Venue, progress: &VenueProgress) -> bool {
    match venue.requirement {
        VenueRequirement::None => true,
        VenueRequirement::TotalDrives(drives) => progress.total_drives >= drives,
        VenueRequirement::Level(level) => progress.level >= level,
        VenueRequirement::Division(id) => match division(id) {
            Some(required) => division_from_xp(progress.xp).min_xp >= required.min_xp,
            None => false,
        },
    }
}

/// Unlock state of every venue.
pub fn venue_statuses(progress: &VenueProgress) -> Vec<VenueStatus> {
    VENUES
        .iter()
        .map(|v| VenueStatus {
            venue: *v,
            unlocked: is_unlocked(v, progress),
        })
        .collect()
}

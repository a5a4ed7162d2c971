//! Unit tests for the static catalogs.

use std::collections::HashSet;

use bomber::catalog::equipment::{equipment_by_rarity, STARTER_BALL_ID, STARTER_DRIVER_ID};
use bomber::catalog::types::VenueRequirement;
use bomber::catalog::{
    achievement, equipment, EquipmentType, Rarity, ACHIEVEMENTS, DAILY_CHALLENGES, EQUIPMENT,
    VENUES,
};
use bomber::progression::divisions::division;

fn assert_unique<'a>(ids: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for id in ids {
        assert!(seen.insert(id), "duplicate id {}", id);
    }
}

#[test]
fn test_ids_are_unique() {
    assert_unique(EQUIPMENT.iter().map(|e| e.id));
    assert_unique(ACHIEVEMENTS.iter().map(|a| a.id));
    assert_unique(DAILY_CHALLENGES.iter().map(|c| c.id));
    assert_unique(VENUES.iter().map(|v| v.id));
}

#[test]
fn test_starter_kit_is_common() {
    let driver = equipment(STARTER_DRIVER_ID).unwrap();
    let ball = equipment(STARTER_BALL_ID).unwrap();
    assert_eq!(driver.equipment_type, EquipmentType::Driver);
    assert_eq!(ball.equipment_type, EquipmentType::Ball);
    assert_eq!(driver.rarity, Rarity::Common);
    assert_eq!(ball.rarity, Rarity::Common);
}

#[test]
fn test_every_rarity_can_drop() {
    for rarity in Rarity::ALL {
        assert!(!equipment_by_rarity(rarity).is_empty(), "{:?}", rarity);
    }
}

#[test]
fn test_venue_requirements_reference_real_divisions() {
    for venue in VENUES {
        if let VenueRequirement::Division(id) = venue.requirement {
            assert!(division(id).is_some(), "{} needs unknown division {}", venue.id, id);
        }
    }
}

#[test]
fn test_achievement_lookup() {
    let century = achievement("century_drive").unwrap();
    assert_eq!(century.name, "Century Drive");
    assert!(achievement("hole_in_one").is_none());
    assert!(ACHIEVEMENTS.iter().all(|a| !a.requirements.is_empty()));
}

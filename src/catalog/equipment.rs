//! Equipment catalog.

use super::types::{EquipmentItem, EquipmentType, Rarity};
use crate::error::BomberError;

/// Driver every new profile starts with.
pub const STARTER_DRIVER_ID: &str = "driver_rookie";
/// Ball every new profile starts with.
pub const STARTER_BALL_ID: &str = "ball_range";

/// Highest upgrade level an owned item can reach.
pub const MAX_EQUIPMENT_LEVEL: u32 = 10;

/// All equipment, drivers first.
pub static EQUIPMENT: &[EquipmentItem] = &[
    EquipmentItem {
        id: STARTER_DRIVER_ID,
        name: "Rookie Driver",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Common,
        description: "Forgiving 460cc head for learning the swing",
    },
    EquipmentItem {
        id: "driver_persimmon",
        name: "Persimmon Classic",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Common,
        description: "Old-school wood with a sweet sound",
    },
    EquipmentItem {
        id: "driver_steel_shaft",
        name: "Steel Shaft Standard",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Common,
        description: "Stiff shaft, honest feedback",
    },
    EquipmentItem {
        id: "driver_carbon_crown",
        name: "Carbon Crown",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Rare,
        description: "Lightweight crown lowers the center of gravity",
    },
    EquipmentItem {
        id: "driver_tour_tuned",
        name: "Tour Tuned",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Rare,
        description: "Adjustable hosel for dialing in launch",
    },
    EquipmentItem {
        id: "driver_titan_x",
        name: "Titan X",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Epic,
        description: "Forged titanium face with a hot spring effect",
    },
    EquipmentItem {
        id: "driver_stormbreaker",
        name: "Stormbreaker",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Epic,
        description: "Low-spin head that cuts through the wind",
    },
    EquipmentItem {
        id: "driver_thunderclap",
        name: "Thunderclap",
        equipment_type: EquipmentType::Driver,
        rarity: Rarity::Legendary,
        description: "Long-drive competition spec, not for the faint of heart",
    },
    EquipmentItem {
        id: STARTER_BALL_ID,
        name: "Range Ball",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Common,
        description: "Scuffed but dependable",
    },
    EquipmentItem {
        id: "ball_distance_two_piece",
        name: "Two-Piece Distance",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Common,
        description: "Hard cover, low spin",
    },
    EquipmentItem {
        id: "ball_soft_feel",
        name: "Soft Feel",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Common,
        description: "Low compression for slower swings",
    },
    EquipmentItem {
        id: "ball_urethane_tour",
        name: "Urethane Tour",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Rare,
        description: "Tour-level cover and consistent flight",
    },
    EquipmentItem {
        id: "ball_glow",
        name: "Night Glow",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Rare,
        description: "Lights up under the stadium lamps",
    },
    EquipmentItem {
        id: "ball_aero_dimple",
        name: "Aero Dimple",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Epic,
        description: "Hexagonal dimples for a flatter trajectory",
    },
    EquipmentItem {
        id: "ball_comet",
        name: "Comet",
        equipment_type: EquipmentType::Ball,
        rarity: Rarity::Legendary,
        description: "Leaves a trail you can see from the clubhouse",
    },
];

/// Look up an equipment item by id.
pub fn equipment(id: &str) -> Option<&'static EquipmentItem> {
    EQUIPMENT.iter().find(|item| item.id == id)
}

/// Look up an equipment item that must exist.
pub fn require_equipment(id: &str) -> Result<&'static EquipmentItem, BomberError> {
    equipment(id).ok_or_else(|| BomberError::NotFound(format!("equipment {}", id)))
}

/// All items of a given rarity.
pub fn equipment_by_rarity(rarity: Rarity) -> Vec<&'static EquipmentItem> {
    EQUIPMENT.iter().filter(|item| item.rarity == rarity).collect()
}

/// Coins needed to raise an owned item from `level` to `level + 1`.
pub fn upgrade_cost(rarity: Rarity, level: u32) -> u64 {
    let base = match rarity {
        Rarity::Common => 50,
        Rarity::Rare => 120,
        Rarity::Epic => 300,
        Rarity::Legendary => 750,
    };
    base * level as u64
}

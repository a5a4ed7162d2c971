//! Chest content generation.
//!
//! Rarity tiers are drawn without replacement, weighted by the chest tier's
//! table, then an item is picked uniformly inside each drawn tier. Items the
//! player already owns turn into a coin payout.

use std::collections::HashSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::equipment::equipment_by_rarity;
use crate::catalog::types::{ChestType, EquipmentType, Rarity};
use crate::storage::config::{ChestSettings, ChestTierSettings};

/// One drawn reward slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub equipment_id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    pub rarity: Rarity,
    /// Already owned; paid out as `coins` instead
    pub duplicate: bool,
    pub coins: u64,
}

/// Everything a chest paid out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    /// Currency floor plus duplicate payouts
    pub coins: u64,
    pub gems: u64,
    pub items: Vec<RewardItem>,
}

impl RewardBundle {
    /// Items that were new to the player.
    pub fn new_items(&self) -> impl Iterator<Item = &RewardItem> {
        self.items.iter().filter(|i| !i.duplicate)
    }
}

/// Draw the distinct rarity tiers for one chest.
///
/// At most `slots` tiers come back; tiers with zero weight are never drawn.
pub fn draw_rarities<R: Rng + ?Sized>(tier: &ChestTierSettings, rng: &mut R) -> Vec<Rarity> {
    let mut pool: Vec<(Rarity, u64)> = Rarity::ALL
        .iter()
        .map(|r| (*r, tier.weights.get(*r)))
        .filter(|(_, weight)| *weight > 0)
        .collect();

    let mut drawn = Vec::with_capacity(tier.slots as usize);
    for _ in 0..tier.slots {
        let dist = match WeightedIndex::new(pool.iter().map(|(_, w)| *w)) {
            Ok(dist) => dist,
            Err(_) => break,
        };
        let (rarity, _) = pool.remove(dist.sample(rng));
        drawn.push(rarity);
    }
    drawn
}

/// Generate the contents of a chest for a player owning `owned`.
pub fn roll_chest<R: Rng + ?Sized>(
    chest_type: ChestType,
    settings: &ChestSettings,
    owned: &HashSet<String>,
    rng: &mut R,
) -> RewardBundle {
    let tier = settings.tier(chest_type);
    let mut bundle = RewardBundle {
        coins: tier.coin_floor,
        gems: tier.gem_floor,
        items: Vec::new(),
    };
    let mut seen: HashSet<&str> = HashSet::new();

    for rarity in draw_rarities(tier, rng) {
        let candidates = equipment_by_rarity(rarity);
        let item = match candidates.choose(rng) {
            Some(item) => *item,
            None => continue,
        };

        let duplicate = owned.contains(item.id) || !seen.insert(item.id);
        let coins = if duplicate {
            settings.duplicate_coins.get(rarity)
        } else {
            0
        };
        bundle.coins = bundle.coins.saturating_add(coins);
        bundle.items.push(RewardItem {
            equipment_id: item.id.to_string(),
            name: item.name.to_string(),
            equipment_type: item.equipment_type,
            rarity,
            duplicate,
            coins,
        });
    }

    bundle
}

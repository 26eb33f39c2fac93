//! Between-round shop: rarity-weighted offers, purchases, paid refresh

use rand::Rng;

use super::equipment::{EquipmentItem, ItemKind, Rarity};
use super::state::Player;
use crate::seconds_to_ticks;
use crate::tuning::{RarityWeights, ShopTuning};

/// Why a purchase did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    NoSuchSlot,
    QuotaReached,
    InsufficientFunds,
    InventoryFull,
}

/// Offered items plus the shopping clock and quota counter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shop {
    offers: Vec<EquipmentItem>,
    /// Ticks left in the shopping phase
    pub timer_ticks: u32,
    /// Purchases made since the last round started
    pub purchases_this_round: u32,
}

impl Shop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offers(&self) -> &[EquipmentItem] {
        &self.offers
    }

    /// Start a shopping phase: fresh offers and a full clock
    pub fn open(&mut self, catalog: &[EquipmentItem], tuning: &ShopTuning, rng: &mut impl Rng) {
        self.restock(catalog, tuning, rng);
        self.timer_ticks = seconds_to_ticks(tuning.time_limit_secs);
    }

    pub fn reset_quota(&mut self) {
        self.purchases_this_round = 0;
    }

    pub fn tick_timer(&mut self) {
        if self.timer_ticks > 0 {
            self.timer_ticks -= 1;
        }
    }

    pub fn is_closed(&self, tuning: &ShopTuning) -> bool {
        self.timer_ticks == 0 || self.quota_met(tuning)
    }

    pub fn quota_met(&self, tuning: &ShopTuning) -> bool {
        self.purchases_this_round >= tuning.purchases_per_round
    }

    /// Replace every offer with a new roll
    pub fn restock(&mut self, catalog: &[EquipmentItem], tuning: &ShopTuning, rng: &mut impl Rng) {
        self.offers.clear();
        for _ in 0..tuning.offer_count {
            let rarity = roll_rarity(&tuning.rarity_weights, rng);
            let pool: Vec<&EquipmentItem> = catalog.iter().filter(|i| i.rarity == rarity).collect();
            if pool.is_empty() {
                log::debug!("No {} items in catalog, slot left empty", rarity.as_str());
                continue;
            }
            self.offers.push(pool[rng.random_range(0..pool.len())].clone());
        }
    }

    /// Pay `refresh_cost` for a new set of offers
    pub fn refresh(
        &mut self,
        player: &mut Player,
        catalog: &[EquipmentItem],
        tuning: &ShopTuning,
        rng: &mut impl Rng,
    ) -> Result<u32, PurchaseError> {
        if player.money < tuning.refresh_cost {
            return Err(PurchaseError::InsufficientFunds);
        }
        player.money -= tuning.refresh_cost;
        self.restock(catalog, tuning, rng);
        Ok(tuning.refresh_cost)
    }

    /// Buy the offer in `slot`. On any failure nothing changes.
    /// `enforce_quota` is false for pre-run purchases from the menu.
    pub fn purchase(
        &mut self,
        slot: usize,
        player: &mut Player,
        tuning: &ShopTuning,
        enforce_quota: bool,
    ) -> Result<EquipmentItem, PurchaseError> {
        if enforce_quota && self.quota_met(tuning) {
            return Err(PurchaseError::QuotaReached);
        }
        let item = self.offers.get(slot).ok_or(PurchaseError::NoSuchSlot)?;
        if player.money < item.cost {
            return Err(PurchaseError::InsufficientFunds);
        }
        match item.kind {
            ItemKind::Consumable { heal } => {
                player.heal(heal);
            }
            _ => {
                player
                    .equipment
                    .equip(item.clone(), &mut player.stats)
                    .map_err(|_| PurchaseError::InventoryFull)?;
                player.clamp_health();
            }
        }

        let item = self.offers.remove(slot);
        player.money -= item.cost;
        if enforce_quota {
            self.purchases_this_round += 1;
        }
        Ok(item)
    }
}

/// Draw a rarity by percentage weights
pub fn roll_rarity(weights: &RarityWeights, rng: &mut impl Rng) -> Rarity {
    let total = weights.total();
    if total == 0 {
        return Rarity::Common;
    }
    let roll = rng.random_range(0..total);
    let mut cumulative = 0;
    for rarity in Rarity::ALL {
        cumulative += weights.get(rarity);
        if cumulative > roll {
            return rarity;
        }
    }
    Rarity::Common
}

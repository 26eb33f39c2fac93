//! Equipment items, the item catalog, and the player's equipment ledger

use serde::{Deserialize, Serialize};

use super::stats::{StatBlock, StatKind};
use crate::consts::MAX_ACTIVE_ITEMS;

/// Item rarity (also drives shop offer odds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Weapon parameters carried by active items
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Seconds between shots before cooldown scaling
    pub cooldown_secs: f32,
    /// Per-hit multiplier on the player's damage stat
    pub damage_multiplier: f32,
}

/// What an item does once bought
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Grants an independent auto-attack; at most `MAX_ACTIVE_ITEMS` equipped
    Active(WeaponStats),
    /// Pure stat modifiers, uncapped
    Passive,
    /// Used immediately on purchase
    Consumable { heal: f32 },
}

/// A single (stat, multiplier) modifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatEffect {
    pub stat: StatKind,
    pub multiplier: f32,
}

/// Immutable item descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub name: String,
    pub rarity: Rarity,
    pub kind: ItemKind,
    pub cost: u32,
    #[serde(default)]
    pub effects: Vec<StatEffect>,
}

impl EquipmentItem {
    pub fn is_active(&self) -> bool {
        matches!(self.kind, ItemKind::Active(_))
    }

    pub fn weapon(&self) -> Option<WeaponStats> {
        match self.kind {
            ItemKind::Active(w) => Some(w),
            _ => None,
        }
    }

    fn apply(&self, stats: &mut StatBlock) {
        for effect in &self.effects {
            stats.push_multiplier(effect.stat, effect.multiplier);
        }
    }

    fn revert(&self, stats: &mut StatBlock) {
        for effect in &self.effects {
            if !stats.remove_multiplier(effect.stat, effect.multiplier) {
                log::warn!(
                    "{}: no {} x{} modifier to remove",
                    self.name,
                    effect.stat.as_str(),
                    effect.multiplier
                );
            }
        }
    }
}

/// Why an equip attempt did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipError {
    /// Already carrying `MAX_ACTIVE_ITEMS` weapons
    InventoryFull,
    /// Consumables are used, never equipped
    NotEquippable,
}

/// An equipped weapon and its own attack cooldown
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponSlot {
    pub item: EquipmentItem,
    pub weapon: WeaponStats,
    /// Ticks until this weapon may fire again (0 = ready)
    pub cooldown_ticks: u32,
}

/// Equipped actives (capped) and passives (uncapped)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentLedger {
    actives: Vec<WeaponSlot>,
    passives: Vec<EquipmentItem>,
}

impl EquipmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actives(&self) -> &[WeaponSlot] {
        &self.actives
    }

    pub fn actives_mut(&mut self) -> &mut [WeaponSlot] {
        &mut self.actives
    }

    pub fn passives(&self) -> &[EquipmentItem] {
        &self.passives
    }

    pub fn is_full(&self) -> bool {
        self.actives.len() >= MAX_ACTIVE_ITEMS
    }

    /// Whether `item` would be accepted by `equip` right now
    pub fn can_equip(&self, item: &EquipmentItem) -> Result<(), EquipError> {
        match item.kind {
            ItemKind::Active(_) if self.is_full() => Err(EquipError::InventoryFull),
            ItemKind::Active(_) | ItemKind::Passive => Ok(()),
            ItemKind::Consumable { .. } => Err(EquipError::NotEquippable),
        }
    }

    /// Equip an item and push its modifiers onto `stats`
    pub fn equip(&mut self, item: EquipmentItem, stats: &mut StatBlock) -> Result<(), EquipError> {
        self.can_equip(&item)?;
        item.apply(stats);
        match item.kind {
            ItemKind::Active(weapon) => self.actives.push(WeaponSlot {
                item,
                weapon,
                cooldown_ticks: 0,
            }),
            _ => self.passives.push(item),
        }
        Ok(())
    }

    /// Unequip one copy of `item` (last equipped first) and pop its modifiers.
    /// Returns false if the item was not equipped.
    pub fn unequip(&mut self, item: &EquipmentItem, stats: &mut StatBlock) -> bool {
        let removed = if item.is_active() {
            self.actives
                .iter()
                .rposition(|slot| slot.item == *item)
                .map(|pos| self.actives.remove(pos).item)
        } else {
            self.passives
                .iter()
                .rposition(|p| p == item)
                .map(|pos| self.passives.remove(pos))
        };
        match removed {
            Some(item) => {
                item.revert(stats);
                true
            }
            None => false,
        }
    }
}

fn passive(name: &str, rarity: Rarity, cost: u32, effects: &[(StatKind, f32)]) -> EquipmentItem {
    EquipmentItem {
        name: name.to_string(),
        rarity,
        kind: ItemKind::Passive,
        cost,
        effects: effects
            .iter()
            .map(|&(stat, multiplier)| StatEffect { stat, multiplier })
            .collect(),
    }
}

fn weapon(name: &str, rarity: Rarity, cost: u32, cooldown_secs: f32, damage_multiplier: f32) -> EquipmentItem {
    EquipmentItem {
        name: name.to_string(),
        rarity,
        kind: ItemKind::Active(WeaponStats {
            cooldown_secs,
            damage_multiplier,
        }),
        cost,
        effects: Vec::new(),
    }
}

/// The default item catalog (weapons, relics, shop upgrades, consumables)
pub fn default_catalog() -> Vec<EquipmentItem> {
    use Rarity::*;
    use StatKind::*;

    vec![
        // Weapons
        weapon("Magic Wand", Common, 50, 1.5, 0.75),
        weapon("Knife", Common, 50, 1.0, 0.5),
        weapon("Whip", Common, 50, 1.2, 1.0),
        weapon("Fire Wand", Rare, 75, 2.0, 1.25),
        weapon("Cross Bow", Rare, 75, 1.8, 0.75),
        weapon("Lightning Ring", Epic, 100, 2.5, 1.5),
        // Relics
        passive("Wings", Rare, 75, &[(MoveSpeed, 1.3)]),
        passive("Spinach", Common, 50, &[(Damage, 1.2)]),
        passive("Empty Tome", Common, 50, &[(CooldownScale, 0.85)]),
        passive("Clover", Rare, 75, &[(CritChance, 2.0)]),
        passive("Hollow Heart", Rare, 75, &[(MaxHealth, 1.25)]),
        // Upgrades
        passive("Sharp Blade", Common, 50, &[(Damage, 1.1)]),
        passive("Running Shoes", Common, 50, &[(MoveSpeed, 1.1)]),
        passive("Leather Armor", Common, 50, &[(Defense, 1.1)]),
        passive("Enchanted Sword", Rare, 100, &[(Damage, 1.2)]),
        passive("Swift Boots", Rare, 100, &[(MoveSpeed, 1.2)]),
        passive("Steel Armor", Rare, 100, &[(Defense, 1.2)]),
        passive("Quick Loader", Rare, 100, &[(AttackSpeed, 1.15)]),
        passive("Ancient Blade", Epic, 200, &[(Damage, 1.35)]),
        passive("Hermes Boots", Epic, 200, &[(MoveSpeed, 1.35)]),
        passive("Dragon Scale", Epic, 200, &[(Defense, 1.35)]),
        passive("Critical Eye", Epic, 200, &[(CritChance, 1.5)]),
        passive("God Slayer", Legendary, 300, &[(Damage, 1.5)]),
        passive("Sonic Boots", Legendary, 300, &[(MoveSpeed, 1.5)]),
        passive("Holy Armor", Legendary, 300, &[(Defense, 1.5)]),
        passive("Death's Eye", Legendary, 300, &[(CritDamage, 1.5)]),
        passive("Eagle Lens", Epic, 150, &[(AttackRange, 1.25)]),
        // Consumables
        EquipmentItem {
            name: "Healing Draught".to_string(),
            rarity: Common,
            kind: ItemKind::Consumable { heal: 60.0 },
            cost: 30,
            effects: Vec::new(),
        },
        EquipmentItem {
            name: "Phoenix Ember".to_string(),
            rarity: Legendary,
            kind: ItemKind::Consumable { heal: 400.0 },
            cost: 150,
            effects: Vec::new(),
        },
    ]
}

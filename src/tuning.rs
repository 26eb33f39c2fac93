//! Data-driven game balance
//!
//! All numbers the simulation reads (player base stats, round pacing, enemy
//! roster, spawn tables, bonfires, shop) live in one `Tuning` value. It is
//! loaded once before a run, either from `Default` or from JSON, and
//! validated up front so nothing inside a tick has to deal with bad config.

use serde::{Deserialize, Serialize};

use crate::sim::equipment::{EquipmentItem, Rarity, default_catalog};
use crate::sim::spawn::{EnemyEntry, EnemyKind, EnemyTable, KindStats, RoundScaling, TierSchedule};
use crate::sim::stats::BaseStats;

/// Reasons a tuning file is rejected
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("enemy roster has no entry for {0:?}")]
    MissingEnemy(EnemyKind),

    #[error("enemy roster lists {0:?} more than once")]
    DuplicateEnemy(EnemyKind),

    #[error("tier schedule has no tables")]
    EmptySchedule,

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Round pacing and population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTuning {
    pub duration_secs: f32,
    /// Money paid when a round starts, before scaling
    pub base_reward: u32,
    /// Linear reward growth per round
    pub reward_scaling: f32,
    pub starting_enemies: u32,
    pub enemies_per_round: u32,
    /// Upper bound on the per-round population target
    pub population_cap: u32,
    /// Hard ceiling on simultaneously active enemies
    pub max_active_enemies: u32,
    pub base_spawn_delay_ticks: f32,
    pub spawn_delay_decay: f32,
    pub min_spawn_delay_ticks: f32,
}

impl Default for RoundTuning {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            base_reward: 50,
            reward_scaling: 0.2,
            starting_enemies: 5,
            enemies_per_round: 2,
            population_cap: 40,
            max_active_enemies: 60,
            base_spawn_delay_ticks: 60.0,
            spawn_delay_decay: 0.9,
            min_spawn_delay_ticks: 12.0,
        }
    }
}

/// Bonfire placement and healing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonfireTuning {
    pub count: u32,
    pub min_distance: f32,
    /// Keep-out band along the play area border
    pub margin: f32,
    pub max_attempts: u32,
    pub heal_amount: f32,
    pub heal_radius: f32,
    pub cooldown_ticks: u32,
}

impl Default for BonfireTuning {
    fn default() -> Self {
        Self {
            count: 5,
            min_distance: 150.0,
            margin: 50.0,
            max_attempts: 100,
            heal_amount: 75.0,
            heal_radius: 48.0,
            cooldown_ticks: 180,
        }
    }
}

/// Percent odds per rarity when rolling a shop slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 50,
            rare: 30,
            epic: 15,
            legendary: 5,
        }
    }
}

impl RarityWeights {
    pub fn get(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn total(&self) -> u32 {
        Rarity::ALL.iter().map(|r| self.get(*r)).sum()
    }
}

/// Between-round shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopTuning {
    pub time_limit_secs: f32,
    pub offer_count: usize,
    pub refresh_cost: u32,
    /// Purchases that end the shopping phase early
    pub purchases_per_round: u32,
    pub rarity_weights: RarityWeights,
}

impl Default for ShopTuning {
    fn default() -> Self {
        Self {
            time_limit_secs: 30.0,
            offer_count: 4,
            refresh_cost: 20,
            purchases_per_round: 3,
            rarity_weights: RarityWeights::default(),
        }
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: BaseStats,
    pub start_money: u32,
    pub round: RoundTuning,
    pub scaling: RoundScaling,
    pub schedule: TierSchedule,
    pub enemies: Vec<EnemyEntry>,
    pub bonfires: BonfireTuning,
    pub shop: ShopTuning,
    pub catalog: Vec<EquipmentItem>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: BaseStats::default(),
            start_money: crate::consts::PLAYER_START_MONEY,
            round: RoundTuning::default(),
            scaling: RoundScaling::default(),
            schedule: TierSchedule::default(),
            enemies: default_roster(),
            bonfires: BonfireTuning::default(),
            shop: ShopTuning::default(),
            catalog: default_catalog(),
        }
    }
}

/// Kill reward per point of enemy value
const KILL_REWARD_UNIT: u32 = 15;

fn default_roster() -> Vec<EnemyEntry> {
    use EnemyKind::*;

    let entry = |kind, health, damage, speed, value: u32| EnemyEntry {
        kind,
        stats: KindStats {
            health,
            damage,
            speed,
            reward: value * KILL_REWARD_UNIT,
        },
    };
    vec![
        entry(Slime, 40.0, 3.0, 2.0, 1),
        entry(Rat, 30.0, 4.0, 3.0, 1),
        entry(Bat, 25.0, 3.0, 4.0, 1),
        entry(Skeleton, 60.0, 5.0, 3.0, 2),
        entry(Zombie, 80.0, 6.0, 2.0, 2),
        entry(Spider, 50.0, 8.0, 3.5, 2),
        entry(Demon, 120.0, 12.0, 2.8, 3),
        entry(Golem, 200.0, 15.0, 1.5, 3),
        entry(Witch, 90.0, 18.0, 2.5, 3),
        entry(Dragon, 300.0, 25.0, 2.2, 5),
        entry(Necromancer, 250.0, 30.0, 2.0, 5),
        entry(Vampire, 280.0, 28.0, 2.5, 5),
        entry(Ghost, 400.0, 20.0, 1.8, 8),
        entry(DemonLord, 500.0, 35.0, 2.0, 10),
        entry(Lich, 450.0, 40.0, 1.5, 10),
    ]
}

fn require(ok: bool, field: &'static str, reason: &'static str) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::Invalid { field, reason })
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing sections use defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.player;
        require(p.attack_speed > 0.0, "player.attack_speed", "must be positive")?;
        require(p.max_health > 0.0, "player.max_health", "must be positive")?;
        require(p.cooldown_scale > 0.0, "player.cooldown_scale", "must be positive")?;

        let r = &self.round;
        require(r.duration_secs > 0.0, "round.duration_secs", "must be positive")?;
        require(r.reward_scaling >= 0.0, "round.reward_scaling", "must be non-negative")?;
        require(r.max_active_enemies > 0, "round.max_active_enemies", "must be positive")?;
        require(
            r.min_spawn_delay_ticks >= 1.0,
            "round.min_spawn_delay_ticks",
            "must be at least one tick",
        )?;
        require(
            r.spawn_delay_decay > 0.0 && r.spawn_delay_decay <= 1.0,
            "round.spawn_delay_decay",
            "must be in (0, 1]",
        )?;

        let k = &self.scaling;
        require(k.health >= 0.0, "scaling.health", "must be non-negative")?;
        require(k.damage >= 0.0, "scaling.damage", "must be non-negative")?;
        require(k.speed >= 0.0, "scaling.speed", "must be non-negative")?;

        if self.schedule.is_empty() {
            return Err(TuningError::EmptySchedule);
        }
        EnemyTable::from_entries(&self.enemies)?;

        let b = &self.bonfires;
        require(b.heal_radius >= 0.0, "bonfires.heal_radius", "must be non-negative")?;
        require(b.heal_amount >= 0.0, "bonfires.heal_amount", "must be non-negative")?;
        require(
            2.0 * b.margin < crate::consts::SCREEN_HEIGHT,
            "bonfires.margin",
            "leaves no room to place bonfires",
        )?;

        let s = &self.shop;
        require(s.time_limit_secs > 0.0, "shop.time_limit_secs", "must be positive")?;
        require(s.rarity_weights.total() > 0, "shop.rarity_weights", "must not all be zero")?;
        for item in &self.catalog {
            if let Some(w) = item.weapon() {
                require(w.cooldown_secs > 0.0, "catalog.cooldown_secs", "must be positive")?;
            }
            for effect in &item.effects {
                require(effect.multiplier > 0.0, "catalog.effects", "multipliers must be positive")?;
            }
        }
        Ok(())
    }
}

//! Base stats with stacking multiplicative modifiers
//!
//! Every stat has a base value and an ordered list of pending multipliers.
//! The effective value is `base * product(multipliers)`. Multiplication is
//! order-independent, but removal is by value and takes out exactly one
//! matching entry, so two identical items stacked and later removed one at a
//! time each undo only their own contribution.

use serde::{Deserialize, Serialize};

/// Player attribute identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Damage,
    AttackSpeed,
    CritChance,
    CritDamage,
    MoveSpeed,
    Defense,
    AttackRange,
    /// Multiplier applied to every attack cooldown (lower is faster)
    CooldownScale,
    MaxHealth,
}

impl StatKind {
    pub const COUNT: usize = 9;

    pub const ALL: [StatKind; Self::COUNT] = [
        StatKind::Damage,
        StatKind::AttackSpeed,
        StatKind::CritChance,
        StatKind::CritDamage,
        StatKind::MoveSpeed,
        StatKind::Defense,
        StatKind::AttackRange,
        StatKind::CooldownScale,
        StatKind::MaxHealth,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Damage => "damage",
            StatKind::AttackSpeed => "attack_speed",
            StatKind::CritChance => "crit_chance",
            StatKind::CritDamage => "crit_damage",
            StatKind::MoveSpeed => "move_speed",
            StatKind::Defense => "defense",
            StatKind::AttackRange => "attack_range",
            StatKind::CooldownScale => "cooldown_scale",
            StatKind::MaxHealth => "max_health",
        }
    }
}

/// Base values for every stat, as loaded from tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub damage: f32,
    pub attack_speed: f32,
    pub crit_chance: f32,
    pub crit_damage: f32,
    pub move_speed: f32,
    pub defense: f32,
    pub attack_range: f32,
    #[serde(default = "one")]
    pub cooldown_scale: f32,
    pub max_health: f32,
}

fn one() -> f32 {
    1.0
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            damage: 20.0,
            attack_speed: 2.5,
            crit_chance: 0.10,
            crit_damage: 2.0,
            move_speed: 6.0,
            defense: 10.0,
            attack_range: 150.0,
            cooldown_scale: 1.0,
            max_health: crate::consts::PLAYER_START_HEALTH,
        }
    }
}

impl BaseStats {
    pub fn get(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::Damage => self.damage,
            StatKind::AttackSpeed => self.attack_speed,
            StatKind::CritChance => self.crit_chance,
            StatKind::CritDamage => self.crit_damage,
            StatKind::MoveSpeed => self.move_speed,
            StatKind::Defense => self.defense,
            StatKind::AttackRange => self.attack_range,
            StatKind::CooldownScale => self.cooldown_scale,
            StatKind::MaxHealth => self.max_health,
        }
    }
}

/// Stat container: base values plus stacked multipliers, indexed by `StatKind`
#[derive(Debug, Clone, PartialEq)]
pub struct StatBlock {
    base: [f32; StatKind::COUNT],
    multipliers: [Vec<f32>; StatKind::COUNT],
}

impl StatBlock {
    /// Build from base values. Negative bases are clamped to zero.
    pub fn new(base: &BaseStats) -> Self {
        let mut values = [0.0; StatKind::COUNT];
        for stat in StatKind::ALL {
            values[stat.index()] = base.get(stat).max(0.0);
        }
        Self {
            base: values,
            multipliers: Default::default(),
        }
    }

    /// Effective value: base times every pending multiplier
    pub fn get(&self, stat: StatKind) -> f32 {
        let i = stat.index();
        self.multipliers[i]
            .iter()
            .fold(self.base[i], |acc, m| acc * m)
    }

    pub fn base(&self, stat: StatKind) -> f32 {
        self.base[stat.index()]
    }

    /// Number of multipliers currently stacked on a stat
    pub fn modifier_count(&self, stat: StatKind) -> usize {
        self.multipliers[stat.index()].len()
    }

    pub fn push_multiplier(&mut self, stat: StatKind, multiplier: f32) {
        self.multipliers[stat.index()].push(multiplier);
    }

    /// Remove one instance of `multiplier` (the most recently pushed match).
    /// Returns false if no matching entry exists.
    pub fn remove_multiplier(&mut self, stat: StatKind, multiplier: f32) -> bool {
        let list = &mut self.multipliers[stat.index()];
        match list.iter().rposition(|m| *m == multiplier) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }
}

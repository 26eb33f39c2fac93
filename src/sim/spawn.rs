//! Spawn director: difficulty tables, weighted selection, scaled enemies
//!
//! Every round resolves a tier-weight table from the schedule, draws a tier
//! in proportion to its weight, then picks a kind of that tier uniformly.
//! The enemy's base stats come from the roster and are scaled linearly by
//! round number. Spawning never fails loudly: a full arena or an empty pool
//! just means nothing appears this attempt.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Enemy;
use crate::consts::{ENEMY_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::tuning::TuningError;

/// Enemy difficulty ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Basic,
    Standard,
    Advanced,
    Elite,
    Boss,
}

impl Tier {
    pub const COUNT: usize = 5;

    pub const ALL: [Tier; Self::COUNT] = [
        Tier::Basic,
        Tier::Standard,
        Tier::Advanced,
        Tier::Elite,
        Tier::Boss,
    ];
}

/// Enemy kinds, three per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Rat,
    Bat,
    Skeleton,
    Zombie,
    Spider,
    Demon,
    Golem,
    Witch,
    Dragon,
    Necromancer,
    Vampire,
    Ghost,
    DemonLord,
    Lich,
}

impl EnemyKind {
    pub const COUNT: usize = 15;

    pub const ALL: [EnemyKind; Self::COUNT] = [
        EnemyKind::Slime,
        EnemyKind::Rat,
        EnemyKind::Bat,
        EnemyKind::Skeleton,
        EnemyKind::Zombie,
        EnemyKind::Spider,
        EnemyKind::Demon,
        EnemyKind::Golem,
        EnemyKind::Witch,
        EnemyKind::Dragon,
        EnemyKind::Necromancer,
        EnemyKind::Vampire,
        EnemyKind::Ghost,
        EnemyKind::DemonLord,
        EnemyKind::Lich,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn tier(self) -> Tier {
        match self {
            EnemyKind::Slime | EnemyKind::Rat | EnemyKind::Bat => Tier::Basic,
            EnemyKind::Skeleton | EnemyKind::Zombie | EnemyKind::Spider => Tier::Standard,
            EnemyKind::Demon | EnemyKind::Golem | EnemyKind::Witch => Tier::Advanced,
            EnemyKind::Dragon | EnemyKind::Necromancer | EnemyKind::Vampire => Tier::Elite,
            EnemyKind::Ghost | EnemyKind::DemonLord | EnemyKind::Lich => Tier::Boss,
        }
    }
}

/// Unscaled stats for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindStats {
    pub health: f32,
    pub damage: f32,
    /// Pixels per tick
    pub speed: f32,
    /// Money paid on kill
    pub reward: u32,
}

/// Roster entry as it appears in tuning files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyEntry {
    pub kind: EnemyKind,
    #[serde(flatten)]
    pub stats: KindStats,
}

/// Kind-indexed stat table, complete by construction
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTable {
    stats: [KindStats; EnemyKind::COUNT],
}

impl EnemyTable {
    /// Build from a roster, requiring exactly one entry per kind
    pub fn from_entries(entries: &[EnemyEntry]) -> Result<Self, TuningError> {
        let mut slots: [Option<KindStats>; EnemyKind::COUNT] = [None; EnemyKind::COUNT];
        for entry in entries {
            let slot = &mut slots[entry.kind.index()];
            if slot.is_some() {
                return Err(TuningError::DuplicateEnemy(entry.kind));
            }
            if !(entry.stats.health > 0.0) || entry.stats.damage < 0.0 || entry.stats.speed < 0.0 {
                return Err(TuningError::Invalid {
                    field: "enemies",
                    reason: "health must be positive, damage and speed non-negative",
                });
            }
            *slot = Some(entry.stats);
        }

        let mut stats = [KindStats {
            health: 0.0,
            damage: 0.0,
            speed: 0.0,
            reward: 0,
        }; EnemyKind::COUNT];
        for kind in EnemyKind::ALL {
            stats[kind.index()] = slots[kind.index()].ok_or(TuningError::MissingEnemy(kind))?;
        }
        Ok(Self { stats })
    }

    #[inline]
    pub fn get(&self, kind: EnemyKind) -> &KindStats {
        &self.stats[kind.index()]
    }
}

/// Spawn weight per tier (0 = never)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub basic: u32,
    pub standard: u32,
    pub advanced: u32,
    pub elite: u32,
    pub boss: u32,
}

impl TierWeights {
    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Basic => self.basic,
            Tier::Standard => self.standard,
            Tier::Advanced => self.advanced,
            Tier::Elite => self.elite,
            Tier::Boss => self.boss,
        }
    }

    pub fn total(&self) -> u32 {
        Tier::ALL.iter().map(|t| self.get(*t)).sum()
    }
}

/// Weights that take effect from `start_round` onward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundBand {
    pub start_round: u32,
    pub weights: TierWeights,
}

/// Weights for exactly one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundWeights {
    pub round: u32,
    pub weights: TierWeights,
}

/// How tier weights are looked up for a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TierSchedule {
    /// The band with the greatest `start_round <= round` applies
    Bands { bands: Vec<RoundBand> },
    /// Exact round lookup, `fallback` once past every listed round
    PerRound {
        rounds: Vec<RoundWeights>,
        fallback: TierWeights,
    },
}

impl TierSchedule {
    /// Weight table for `round`, or None if no table covers it
    pub fn resolve(&self, round: u32) -> Option<&TierWeights> {
        match self {
            TierSchedule::Bands { bands } => bands
                .iter()
                .filter(|b| b.start_round <= round)
                .max_by_key(|b| b.start_round)
                .map(|b| &b.weights),
            TierSchedule::PerRound { rounds, fallback } => {
                match rounds.iter().find(|r| r.round == round) {
                    Some(r) => Some(&r.weights),
                    None if rounds.iter().all(|r| r.round < round) => Some(fallback),
                    None => None,
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TierSchedule::Bands { bands } => bands.is_empty(),
            TierSchedule::PerRound { .. } => false,
        }
    }
}

impl Default for TierSchedule {
    fn default() -> Self {
        let w = |basic, standard, advanced, elite, boss| TierWeights {
            basic,
            standard,
            advanced,
            elite,
            boss,
        };
        let rounds = [
            w(100, 0, 0, 0, 0),
            w(80, 20, 0, 0, 0),
            w(60, 40, 0, 0, 0),
            w(40, 50, 10, 0, 0),
            w(30, 50, 20, 0, 0),
            w(20, 40, 35, 5, 0),
            w(0, 30, 50, 20, 0),
            w(0, 20, 50, 30, 0),
            w(0, 0, 40, 50, 10),
            w(0, 0, 20, 60, 20),
        ];
        TierSchedule::PerRound {
            rounds: rounds
                .iter()
                .enumerate()
                .map(|(i, weights)| RoundWeights {
                    round: i as u32 + 1,
                    weights: *weights,
                })
                .collect(),
            fallback: w(0, 0, 30, 50, 20),
        }
    }
}

/// Per-round linear growth coefficients, shared by every tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundScaling {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
}

impl Default for RoundScaling {
    fn default() -> Self {
        Self {
            health: 0.10,
            damage: 0.10,
            speed: 0.02,
        }
    }
}

impl RoundScaling {
    /// `(health, damage, speed)` multipliers for `round`
    pub fn factors(&self, round: u32) -> (f32, f32, f32) {
        let r = round.saturating_sub(1) as f32;
        (
            1.0 + self.health * r,
            1.0 + self.damage * r,
            1.0 + self.speed * r,
        )
    }
}

/// Why a spawn attempt produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRefusal {
    /// Active population already at the hard ceiling
    PopulationCeiling,
    /// No table covers this round, or its weights sum to zero
    EmptyPool,
}

/// Draw a tier in proportion to its weight. Zero-weight tiers are never chosen.
pub fn pick_tier(weights: &TierWeights, rng: &mut impl Rng) -> Option<Tier> {
    let total = weights.total();
    if total == 0 {
        return None;
    }
    let roll = rng.random_range(0..total);
    let mut cumulative = 0;
    for tier in Tier::ALL {
        let w = weights.get(tier);
        if w == 0 {
            continue;
        }
        cumulative += w;
        if cumulative > roll {
            return Some(tier);
        }
    }
    None
}

/// Uniform pick among the kinds belonging to `tier`
pub fn pick_kind(tier: Tier, rng: &mut impl Rng) -> Option<EnemyKind> {
    let pool: Vec<EnemyKind> = EnemyKind::ALL
        .into_iter()
        .filter(|k| k.tier() == tier)
        .collect();
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.random_range(0..pool.len())])
}

/// Random point just outside one of the four screen edges (enemy center)
pub fn edge_position(size: f32, rng: &mut impl Rng) -> Vec2 {
    let half = size / 2.0;
    match rng.random_range(0..4u8) {
        0 => Vec2::new(rng.random_range(0.0..=SCREEN_WIDTH), -half),
        1 => Vec2::new(SCREEN_WIDTH + half, rng.random_range(0.0..=SCREEN_HEIGHT)),
        2 => Vec2::new(rng.random_range(0.0..=SCREEN_WIDTH), SCREEN_HEIGHT + half),
        _ => Vec2::new(-half, rng.random_range(0.0..=SCREEN_HEIGHT)),
    }
}

/// Everything the director reads to make one spawn decision
pub struct SpawnContext<'a> {
    pub round: u32,
    pub active_count: usize,
    pub max_active: usize,
    pub schedule: &'a TierSchedule,
    pub table: &'a EnemyTable,
    pub scaling: &'a RoundScaling,
}

/// Create one round-scaled enemy at a screen edge
pub fn spawn_enemy(id: u32, ctx: &SpawnContext<'_>, rng: &mut impl Rng) -> Result<Enemy, SpawnRefusal> {
    if ctx.active_count >= ctx.max_active {
        return Err(SpawnRefusal::PopulationCeiling);
    }
    let weights = ctx.schedule.resolve(ctx.round).ok_or(SpawnRefusal::EmptyPool)?;
    let tier = pick_tier(weights, rng).ok_or(SpawnRefusal::EmptyPool)?;
    let kind = pick_kind(tier, rng).ok_or(SpawnRefusal::EmptyPool)?;

    let base = ctx.table.get(kind);
    let (health_k, damage_k, speed_k) = ctx.scaling.factors(ctx.round);
    let pos = edge_position(ENEMY_SIZE, rng);

    Ok(Enemy::new(
        id,
        kind,
        pos,
        KindStats {
            health: base.health * health_k,
            damage: base.damage * damage_k,
            speed: base.speed * speed_k,
            reward: base.reward,
        },
    ))
}

//! Read-only view of a run for HUD and rendering layers

use glam::Vec2;
use serde::Serialize;

use super::equipment::Rarity;
use super::spawn::EnemyKind;
use super::state::{GamePhase, GameState};
use crate::consts::TICKS_PER_SECOND;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub health_fraction: f32,
    pub facing_left: bool,
    /// Names of equipped weapons, in slot order
    pub weapons: Vec<String>,
    pub passives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub health_fraction: f32,
    pub facing_left: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonfireView {
    pub pos: Vec2,
    /// 0.0 = ready, 1.0 = just used
    pub cooldown_fraction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferView {
    pub slot: usize,
    pub name: String,
    pub rarity: Rarity,
    pub cost: u32,
    pub affordable: bool,
}

/// Everything a presentation layer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub round: u32,
    /// Seconds left in the round, or in the shop while shopping
    pub time_remaining: f32,
    pub money: u32,
    pub score: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub bonfires: Vec<BonfireView>,
    pub offers: Vec<OfferView>,
    pub purchases_left: u32,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let time_remaining = match state.phase {
            GamePhase::Shopping => state.shop.timer_ticks as f32 / TICKS_PER_SECOND as f32,
            _ => state.round.time_remaining_secs(),
        };
        let cooldown = state.tuning.bonfires.cooldown_ticks;

        Self {
            phase: state.phase,
            round: state.round.number,
            time_remaining,
            money: player.money,
            score: state.score,
            player: PlayerView {
                pos: player.pos,
                size: player.size,
                health: player.health,
                max_health: player.max_health(),
                health_fraction: player.health_fraction(),
                facing_left: player.facing_left,
                weapons: player
                    .equipment
                    .actives()
                    .iter()
                    .map(|slot| slot.item.name.clone())
                    .collect(),
                passives: player
                    .equipment
                    .passives()
                    .iter()
                    .map(|item| item.name.clone())
                    .collect(),
            },
            enemies: state
                .enemies
                .iter()
                .filter(|e| !e.dead)
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    size: e.size,
                    health_fraction: e.health_fraction(),
                    facing_left: e.facing_left,
                })
                .collect(),
            bonfires: state
                .bonfires
                .iter()
                .map(|b| BonfireView {
                    pos: b.pos(),
                    cooldown_fraction: b.cooldown_fraction(cooldown),
                })
                .collect(),
            offers: state
                .shop
                .offers()
                .iter()
                .enumerate()
                .map(|(slot, item)| OfferView {
                    slot,
                    name: item.name.clone(),
                    rarity: item.rarity,
                    cost: item.cost,
                    affordable: player.money >= item.cost,
                })
                .collect(),
            purchases_left: state
                .tuning
                .shop
                .purchases_per_round
                .saturating_sub(state.shop.purchases_this_round),
        }
    }
}

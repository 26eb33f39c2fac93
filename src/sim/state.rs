//! Game state and core simulation types
//!
//! Everything a run needs to advance deterministically lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bonfire::{Bonfire, place_bonfires};
use super::collision::Aabb;
use super::equipment::EquipmentLedger;
use super::round::Round;
use super::shop::Shop;
use super::spawn::{EnemyKind, EnemyTable, KindStats};
use super::stats::{StatBlock, StatKind};
use crate::consts::*;
use crate::tuning::{Tuning, TuningError};

/// Top-level phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Waiting for a start signal; pre-run purchases allowed
    Menu,
    /// Round in progress
    Playing,
    /// Between-round shop
    Shopping,
    /// Run ended
    GameOver,
}

/// Notable things that happened during a tick, for HUD/audio/visual layers
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RoundStarted { round: u32, reward: u32 },
    ShopOpened { round: u32, healed: f32 },
    EnemySpawned { id: u32, kind: EnemyKind },
    /// The enemy has already been removed from the active set
    EnemyKilled { id: u32, kind: EnemyKind, pos: Vec2, reward: u32 },
    PlayerHit { damage: f32 },
    Attack { target: u32, damage: f32, critical: bool, weapon: Option<usize> },
    BonfireHealed { bonfire: usize, amount: f32 },
    ItemPurchased { name: String, cost: u32 },
    PurchaseRejected { slot: usize },
    ShopRefreshed { cost: u32 },
    GameOver { round: u32, score: u32 },
}

/// An enemy entity
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Center position
    pub pos: Vec2,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    /// Pixels per tick
    pub speed: f32,
    pub reward: u32,
    pub dead: bool,
    pub facing_left: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, stats: KindStats) -> Self {
        Self {
            id,
            kind,
            pos,
            size: ENEMY_SIZE,
            health: stats.health,
            max_health: stats.health,
            damage: stats.damage,
            speed: stats.speed,
            reward: stats.reward,
            dead: false,
            facing_left: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Step toward `target` and face it
    pub fn chase(&mut self, target: Vec2) {
        if self.dead {
            return;
        }
        let delta = target - self.pos;
        self.facing_left = delta.x < 0.0;
        let dist = delta.length();
        if dist > 0.0 {
            self.pos += delta / dist * self.speed.min(dist);
        }
    }

    /// Apply damage. Returns true only on the tick the enemy dies.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }
}

/// The player aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub size: f32,
    pub health: f32,
    pub money: u32,
    pub stats: StatBlock,
    pub equipment: EquipmentLedger,
    /// Ticks until the basic attack is ready (0 = ready)
    pub attack_cooldown: u32,
    pub facing_left: bool,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let stats = StatBlock::new(&tuning.player);
        Self {
            pos: crate::screen_center(),
            size: PLAYER_SIZE,
            health: stats.get(StatKind::MaxHealth),
            money: tuning.start_money,
            stats,
            equipment: EquipmentLedger::new(),
            attack_cooldown: 0,
            facing_left: false,
        }
    }

    pub fn stat(&self, stat: StatKind) -> f32 {
        self.stats.get(stat)
    }

    pub fn max_health(&self) -> f32 {
        self.stats.get(StatKind::MaxHealth)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 { 0.0 } else { (self.health / max).clamp(0.0, 1.0) }
    }

    /// Restore health up to max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).min(self.max_health());
        self.health - before
    }

    /// Keep health within a max that may have shrunk after unequipping
    pub fn clamp_health(&mut self) {
        self.health = self.health.min(self.max_health());
    }

    /// Move by `dir` scaled by move speed, staying on screen
    pub fn walk(&mut self, dir: Vec2) {
        let dir = dir.normalize_or_zero();
        if dir.x != 0.0 {
            self.facing_left = dir.x < 0.0;
        }
        let next = self.pos + dir * self.stat(StatKind::MoveSpeed);
        self.pos = super::collision::clamp_center(
            next,
            self.size,
            Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        );
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub enemy_table: EnemyTable,
    pub phase: GamePhase,
    pub round: Round,
    pub player: Player,
    /// Active enemies, in spawn order
    pub enemies: Vec<Enemy>,
    pub bonfires: Vec<Bonfire>,
    pub shop: Shop,
    pub score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a run that starts in the menu
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let enemy_table = EnemyTable::from_entries(&tuning.enemies)?;
        let mut rng = Pcg32::seed_from_u64(seed);

        let bonfires = place_bonfires(&tuning.bonfires, &mut rng);
        let mut shop = Shop::new();
        shop.restock(&tuning.catalog, &tuning.shop, &mut rng);
        log::info!(
            "New run (seed {}): {} bonfires, {} shop offers",
            seed,
            bonfires.len(),
            shop.offers().len()
        );

        Ok(Self {
            seed,
            rng,
            player: Player::new(&tuning),
            round: Round::new(&tuning.round),
            enemy_table,
            phase: GamePhase::Menu,
            enemies: Vec::new(),
            bonfires,
            shop,
            score: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
            tuning,
        })
    }

    /// Create a run that skips the menu and is already in round 1
    pub fn new_playing(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        let mut state = Self::new(tuning, seed)?;
        state.enter_playing();
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| !e.dead).count()
    }

    /// Enter `Playing` and start the current round
    pub(crate) fn enter_playing(&mut self) {
        self.phase = GamePhase::Playing;
        self.enemies.clear();
        let reward = self.round.start_new_round(&self.tuning.round);
        self.player.money += reward;
        self.shop.reset_quota();
        log::info!(
            "Round {} started: target {} enemies, spawn every {} ticks, reward {}",
            self.round.number,
            self.round.target_population,
            self.round.spawn_delay_ticks,
            reward
        );
        self.events.push(GameEvent::RoundStarted {
            round: self.round.number,
            reward,
        });
    }

    /// Enter `Shopping`: restock, patch the player up, start the shop clock
    pub(crate) fn enter_shopping(&mut self) {
        self.phase = GamePhase::Shopping;
        self.shop
            .open(&self.tuning.catalog, &self.tuning.shop, &mut self.rng);
        let missing = (self.player.max_health() - self.player.health).max(0.0);
        let healed = self.player.heal(missing * SHOP_HEAL_FRACTION);
        log::info!(
            "Round {} cleared, shop open for {} ticks (healed {:.1})",
            self.round.number,
            self.shop.timer_ticks,
            healed
        );
        self.events.push(GameEvent::ShopOpened {
            round: self.round.number,
            healed,
        });
    }

    pub(crate) fn enter_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        log::info!(
            "Game over in round {} with score {}",
            self.round.number,
            self.score
        );
        self.events.push(GameEvent::GameOver {
            round: self.round.number,
            score: self.score,
        });
    }

    /// Abandon the run and start a fresh one in the menu, continuing the RNG stream
    pub(crate) fn reset_to_menu(&mut self) {
        let seed = self.seed;
        self.enemies.clear();
        self.bonfires = place_bonfires(&self.tuning.bonfires, &mut self.rng);
        self.player = Player::new(&self.tuning);
        self.round = Round::new(&self.tuning.round);
        self.shop = Shop::new();
        self.shop
            .restock(&self.tuning.catalog, &self.tuning.shop, &mut self.rng);
        self.score = 0;
        self.phase = GamePhase::Menu;
        log::info!("Returned to menu (run seed {})", seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_death_is_reported_once() {
        let stats = KindStats {
            health: 10.0,
            damage: 1.0,
            speed: 1.0,
            reward: 15,
        };
        let mut enemy = Enemy::new(1, EnemyKind::Slime, Vec2::ZERO, stats);
        assert!(!enemy.take_damage(4.0));
        assert!(enemy.take_damage(6.0));
        assert!(enemy.dead);
        assert!(!enemy.take_damage(100.0));
        assert_eq!(enemy.health, 0.0);
    }

    #[test]
    fn test_enemy_chase_does_not_overshoot() {
        let stats = KindStats {
            health: 10.0,
            damage: 1.0,
            speed: 5.0,
            reward: 0,
        };
        let mut enemy = Enemy::new(1, EnemyKind::Bat, Vec2::new(10.0, 0.0), stats);
        enemy.chase(Vec2::ZERO);
        assert!(enemy.facing_left);
        assert_eq!(enemy.pos, Vec2::new(5.0, 0.0));
        enemy.chase(Vec2::ZERO);
        enemy.chase(Vec2::ZERO);
        assert_eq!(enemy.pos, Vec2::ZERO);
    }

    #[test]
    fn test_player_heal_capped_and_walk_clamped() {
        let mut player = Player::new(&Tuning::default());
        player.health = 150.0;
        assert_eq!(player.heal(100.0), 50.0);
        assert_eq!(player.health, 200.0);

        for _ in 0..1000 {
            player.walk(Vec2::new(-1.0, -1.0));
        }
        assert_eq!(player.pos, Vec2::splat(PLAYER_SIZE / 2.0));
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&GamePhase::GameOver).unwrap(), "\"game_over\"");
        let phase: GamePhase = serde_json::from_str("\"shopping\"").unwrap();
        assert_eq!(phase, GamePhase::Shopping);
    }

    #[test]
    fn test_new_states() {
        let state = GameState::new(Tuning::default(), 1).unwrap();
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.round.number, 1);
        assert_eq!(state.player.money, PLAYER_START_MONEY);

        let state = GameState::new_playing(Tuning::default(), 1).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.money, PLAYER_START_MONEY + 50);
    }
}

//! Fixed timestep simulation tick
//!
//! Core game loop that advances the encounter deterministically. Each tick
//! first checks for a phase transition; a tick that changes phase does no
//! further work, so the new phase starts clean on the next tick.

use glam::Vec2;

use super::bonfire;
use super::combat;
use super::spawn::{SpawnContext, SpawnRefusal, spawn_enemy};
use super::state::{GameEvent, GamePhase, GameState};

/// Player intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement direction (normalized internally, zero = stand still)
    pub move_dir: Vec2,
    /// Leave the menu and start round 1
    pub start_round: bool,
    /// Buy the shop offer at this slot
    pub purchase: Option<usize>,
    /// Pay to reroll the shop offers
    pub refresh_shop: bool,
    /// Abandon the run
    pub return_to_menu: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.return_to_menu && state.phase != GamePhase::Menu {
        state.reset_to_menu();
        return;
    }

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Menu => {
            if input.start_round {
                state.enter_playing();
                return;
            }
            handle_shop_intents(state, input, false);
        }

        GamePhase::Playing => {
            if state.round.is_over() {
                state.enter_shopping();
                return;
            }
            playing_step(state, input);
        }

        GamePhase::Shopping => {
            if state.shop.is_closed(&state.tuning.shop) {
                state.round.advance();
                state.enter_playing();
                return;
            }
            handle_shop_intents(state, input, true);
            state.shop.tick_timer();
        }

        GamePhase::GameOver => {}
    }
}

fn playing_step(state: &mut GameState, input: &TickInput) {
    state.round.tick_timer();
    bonfire::advance_cooldowns(&mut state.bonfires);

    state.player.walk(input.move_dir);
    let target = state.player.pos;
    for enemy in &mut state.enemies {
        enemy.chase(target);
    }

    if combat::resolve_contact_damage(&mut state.player, &state.enemies, &mut state.events) {
        state.enter_game_over();
        return;
    }

    let tally = combat::resolve_auto_attacks(
        &mut state.player,
        &mut state.enemies,
        &mut state.rng,
        &mut state.events,
    );
    state.score += tally.kills;

    for (index, amount) in
        bonfire::apply_healing(&mut state.bonfires, &mut state.player, &state.tuning.bonfires)
    {
        state.events.push(GameEvent::BonfireHealed {
            bonfire: index,
            amount,
        });
    }

    state.enemies.retain(|e| !e.dead);

    top_up_enemies(state);
}

/// Spawn one enemy if the spawn clock is due and the arena is under target
fn top_up_enemies(state: &mut GameState) {
    if !state.round.spawn_due() {
        return;
    }
    if state.living_enemies() >= state.round.target_population as usize {
        return;
    }

    let id = state.next_entity_id();
    let ctx = SpawnContext {
        round: state.round.number,
        active_count: state.enemies.len(),
        max_active: state.tuning.round.max_active_enemies as usize,
        schedule: &state.tuning.schedule,
        table: &state.enemy_table,
        scaling: &state.tuning.scaling,
    };
    match spawn_enemy(id, &ctx, &mut state.rng) {
        Ok(enemy) => {
            state.events.push(GameEvent::EnemySpawned {
                id: enemy.id,
                kind: enemy.kind,
            });
            state.enemies.push(enemy);
        }
        Err(SpawnRefusal::PopulationCeiling) => {
            log::debug!("Spawn skipped: {} enemies at ceiling", state.enemies.len());
        }
        Err(SpawnRefusal::EmptyPool) => {
            log::debug!("Spawn skipped: no spawn table for round {}", state.round.number);
        }
    }
    state.round.reset_spawn_timer();
}

fn handle_shop_intents(state: &mut GameState, input: &TickInput, enforce_quota: bool) {
    if input.refresh_shop {
        match state.shop.refresh(
            &mut state.player,
            &state.tuning.catalog,
            &state.tuning.shop,
            &mut state.rng,
        ) {
            Ok(cost) => state.events.push(GameEvent::ShopRefreshed { cost }),
            Err(err) => log::debug!("Shop refresh rejected: {:?}", err),
        }
    }

    if let Some(slot) = input.purchase {
        match state
            .shop
            .purchase(slot, &mut state.player, &state.tuning.shop, enforce_quota)
        {
            Ok(item) => {
                log::info!("Bought {} for {}", item.name, item.cost);
                state.events.push(GameEvent::ItemPurchased {
                    name: item.name,
                    cost: item.cost,
                });
            }
            Err(err) => {
                log::debug!("Purchase of slot {} rejected: {:?}", slot, err);
                state.events.push(GameEvent::PurchaseRejected { slot });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::bonfire::Bonfire;
    use crate::sim::spawn::{EnemyKind, KindStats};
    use crate::sim::state::Enemy;
    use crate::sim::stats::StatKind;
    use crate::tuning::Tuning;

    fn start() -> TickInput {
        TickInput {
            start_round: true,
            ..Default::default()
        }
    }

    /// Tuning with no bonfires so healing never muddies health checks
    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.bonfires.count = 0;
        tuning
    }

    #[test]
    fn test_menu_to_playing() {
        let mut state = GameState::new(quiet_tuning(), 12345).unwrap();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Menu);

        tick(&mut state, &start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.round.number, 1);
        assert_eq!(state.round.timer_ticks, state.round.duration_ticks);
        assert_eq!(state.player.money, PLAYER_START_MONEY + 50);
    }

    #[test]
    fn test_round_end_opens_shop_with_heal() {
        let mut state = GameState::new_playing(quiet_tuning(), 7).unwrap();
        state.enemies.clear();
        state.player.health = 100.0;
        state.round.timer_ticks = 1;
        // Keep the arena empty so nothing else touches health
        state.round.target_population = 0;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.round.timer_ticks, 0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Shopping);
        assert_eq!(state.shop.timer_ticks, 30 * TICKS_PER_SECOND);
        // 30% of the missing 100
        assert!((state.player.health - 130.0).abs() < 1e-4);
        assert_eq!(state.shop.offers().len(), state.tuning.shop.offer_count);
    }

    #[test]
    fn test_shop_timeout_starts_next_round() {
        let mut state = GameState::new_playing(quiet_tuning(), 7).unwrap();
        state.round.timer_ticks = 0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Shopping);

        let money = state.player.money;
        let limit = state.shop.timer_ticks;
        for _ in 0..limit {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.phase, GamePhase::Shopping);
        }
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.round.number, 2);
        assert!(state.enemies.is_empty());
        assert_eq!(state.round.timer_ticks, state.round.duration_ticks);
        // Round 2 reward: 50 * 1.2
        assert_eq!(state.player.money, money + 60);
    }

    #[test]
    fn test_shopping_freezes_the_arena() {
        let mut state = GameState::new_playing(quiet_tuning(), 11).unwrap();
        state.round.target_population = 0;
        let id = state.next_entity_id();
        let pos = state.player.pos + Vec2::new(300.0, 0.0);
        state.enemies.push(Enemy::new(
            id,
            EnemyKind::Zombie,
            pos,
            KindStats {
                health: 80.0,
                damage: 6.0,
                speed: 2.0,
                reward: 30,
            },
        ));
        let mut bonfire = Bonfire::new(state.player.pos);
        bonfire.cooldown_ticks = 50;
        state.bonfires.push(bonfire);
        state.player.health = 100.0;
        state.round.timer_ticks = 0;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Shopping);

        let enemies = state.enemies.clone();
        let player_pos = state.player.pos;
        let health = state.player.health;
        let shop_timer = state.shop.timer_ticks;
        let walk = TickInput {
            move_dir: Vec2::X,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &walk);
        }

        assert_eq!(state.phase, GamePhase::Shopping);
        assert_eq!(state.enemies, enemies);
        assert_eq!(state.bonfires[0].cooldown_ticks, 50);
        assert_eq!(state.player.pos, player_pos);
        assert_eq!(state.player.health, health);
        assert_eq!(state.shop.timer_ticks, shop_timer - 10);
    }

    #[test]
    fn test_bonfire_heals_once_per_cooldown() {
        let mut state = GameState::new_playing(quiet_tuning(), 2).unwrap();
        state.round.target_population = 0;
        state.bonfires.push(Bonfire::new(state.player.pos));
        state.player.health = 50.0;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.health, 125.0);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::BonfireHealed { bonfire: 0, amount: 75.0 })
        );

        state.player.health = 50.0;
        for _ in 1..state.tuning.bonfires.cooldown_ticks {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.health, 50.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.health, 125.0);
    }

    #[test]
    fn test_purchase_quota_ends_shopping() {
        let mut tuning = quiet_tuning();
        tuning.shop.purchases_per_round = 1;
        tuning.start_money = 10_000;
        let mut state = GameState::new_playing(tuning, 3).unwrap();
        state.round.timer_ticks = 0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Shopping);

        let buy = TickInput {
            purchase: Some(0),
            ..Default::default()
        };
        tick(&mut state, &buy);
        assert_eq!(state.shop.purchases_this_round, 1);
        assert_eq!(state.phase, GamePhase::Shopping);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.round.number, 2);
        assert_eq!(state.shop.purchases_this_round, 0);
    }

    #[test]
    fn test_contact_death_is_game_over() {
        let mut state = GameState::new_playing(quiet_tuning(), 1).unwrap();
        state.player.health = 1.0;
        let id = state.next_entity_id();
        let pos = state.player.pos;
        state.enemies.push(Enemy::new(
            id,
            EnemyKind::Golem,
            pos,
            KindStats {
                health: 1.0e6,
                damage: 15.0,
                speed: 0.0,
                reward: 0,
            },
        ));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.health, 0.0);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));

        // Irreversible
        let frozen = state.time_ticks;
        tick(&mut state, &start());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.time_ticks, frozen + 1);
    }

    #[test]
    fn test_kills_pay_once_and_are_pruned() {
        let mut state = GameState::new_playing(quiet_tuning(), 1).unwrap();
        state.player.stats.push_multiplier(StatKind::CritChance, 0.0);
        state.round.target_population = 0;
        let money = state.player.money;
        let id = state.next_entity_id();
        let pos = state.player.pos + Vec2::new(100.0, 0.0);
        state.enemies.push(Enemy::new(
            id,
            EnemyKind::Rat,
            pos,
            KindStats {
                health: 5.0,
                damage: 0.0,
                speed: 0.0,
                reward: 15,
            },
        ));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 1);
        assert_eq!(state.player.money, money + 15);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_spawner_tops_up_to_target_without_exceeding_ceiling() {
        let mut tuning = quiet_tuning();
        tuning.round.max_active_enemies = 3;
        tuning.round.min_spawn_delay_ticks = 1.0;
        tuning.round.base_spawn_delay_ticks = 1.0;
        let mut state = GameState::new_playing(tuning, 99).unwrap();
        // Keep the player out of reach
        state.player.stats.push_multiplier(StatKind::AttackRange, 0.0);

        for _ in 0..20 {
            tick(&mut state, &TickInput::default());
            assert!(state.enemies.len() <= 3);
        }
        assert_eq!(state.enemies.len(), 3);
        assert!(state.enemies.iter().all(|e| e.kind.tier() == crate::sim::spawn::Tier::Basic));
    }

    #[test]
    fn test_return_to_menu_resets_run() {
        let mut state = GameState::new_playing(quiet_tuning(), 5).unwrap();
        state.score = 10;
        tick(
            &mut state,
            &TickInput {
                return_to_menu: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.score, 0);
        assert_eq!(state.round.number, 1);
        assert_eq!(state.player.money, PLAYER_START_MONEY);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(Tuning::default(), 99999).unwrap();
        let mut state2 = GameState::new(Tuning::default(), 99999).unwrap();

        let mut inputs = vec![start()];
        for i in 0..600 {
            inputs.push(TickInput {
                move_dir: Vec2::new((i as f32 * 0.05).cos(), (i as f32 * 0.05).sin()),
                ..Default::default()
            });
        }

        for input in &inputs {
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.enemies, state2.enemies);
        assert_eq!(state1.player, state2.player);
        assert_eq!(state1.drain_events(), state2.drain_events());
    }
}

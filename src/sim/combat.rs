//! Combat resolution: cooldowns, damage rolls, mitigation, targeting
//!
//! The player never aims. Each attack (the basic attack and every equipped
//! weapon) fires at the nearest living enemy in range as soon as its own
//! cooldown hits zero. Enemies hurt the player by touching them, every tick
//! they overlap.

use rand::Rng;

use super::state::{Enemy, GameEvent, Player};
use super::stats::StatKind;
use crate::consts::TICKS_PER_SECOND;

/// Outcome of one damage roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub damage: f32,
    pub critical: bool,
}

/// `damage_stat * (crit_damage if roll < crit_chance) * weapon_multiplier`
pub fn roll_damage(player: &Player, weapon_multiplier: f32, rng: &mut impl Rng) -> Hit {
    let roll: f32 = rng.random();
    let critical = roll < player.stat(StatKind::CritChance);
    let crit = if critical {
        player.stat(StatKind::CritDamage)
    } else {
        1.0
    };
    Hit {
        damage: player.stat(StatKind::Damage) * crit * weapon_multiplier,
        critical,
    }
}

/// `max(1, incoming * (1 - defense / 100))`. Defense is not clamped.
pub fn mitigate(incoming: f32, defense: f32) -> f32 {
    (incoming * (1.0 - defense / 100.0)).max(1.0)
}

/// Ticks until the basic attack is ready again after firing
pub fn basic_cooldown_ticks(player: &Player) -> u32 {
    let ticks = TICKS_PER_SECOND as f32 / player.stat(StatKind::AttackSpeed)
        * player.stat(StatKind::CooldownScale);
    cooldown_from(ticks)
}

/// Ticks until a weapon is ready again after firing
pub fn weapon_cooldown_ticks(player: &Player, cooldown_secs: f32) -> u32 {
    let ticks =
        cooldown_secs * TICKS_PER_SECOND as f32 * player.stat(StatKind::CooldownScale);
    cooldown_from(ticks)
}

fn cooldown_from(ticks: f32) -> u32 {
    if ticks.is_finite() {
        ticks.ceil().max(1.0) as u32
    } else {
        u32::MAX
    }
}

/// Index of the nearest living enemy within `range` of `player`.
/// Ties go to the earliest enemy in the slice.
pub fn nearest_target(player: &Player, enemies: &[Enemy], range: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, enemy) in enemies.iter().enumerate() {
        if enemy.dead {
            continue;
        }
        let dist = enemy.pos.distance(player.pos);
        if dist > range {
            continue;
        }
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

/// Apply contact damage from every overlapping living enemy.
/// Returns true if the player died.
pub fn resolve_contact_damage(player: &mut Player, enemies: &[Enemy], events: &mut Vec<GameEvent>) -> bool {
    let bounds = player.bounds();
    let defense = player.stat(StatKind::Defense);
    for enemy in enemies {
        if enemy.dead || !bounds.intersects(&enemy.bounds()) {
            continue;
        }
        let damage = mitigate(enemy.damage, defense);
        player.health = (player.health - damage).max(0.0);
        events.push(GameEvent::PlayerHit { damage });
        if player.is_dead() {
            return true;
        }
    }
    false
}

/// Running totals for kills made during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KillTally {
    pub kills: u32,
    pub money: u32,
}

/// Fire the basic attack and every ready weapon at the nearest target.
/// Attacks without a target in range keep their cooldown at zero.
pub fn resolve_auto_attacks(
    player: &mut Player,
    enemies: &mut [Enemy],
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> KillTally {
    let mut tally = KillTally::default();
    let range = player.stat(StatKind::AttackRange);

    if player.attack_cooldown > 0 {
        player.attack_cooldown -= 1;
    }
    if player.attack_cooldown == 0 {
        if let Some(target) = nearest_target(player, enemies, range) {
            let hit = roll_damage(player, 1.0, rng);
            strike(&mut enemies[target], hit, None, &mut tally, events);
            player.attack_cooldown = basic_cooldown_ticks(player);
        }
    }

    for slot in 0..player.equipment.actives().len() {
        let (ready, weapon) = {
            let ws = &mut player.equipment.actives_mut()[slot];
            if ws.cooldown_ticks > 0 {
                ws.cooldown_ticks -= 1;
            }
            (ws.cooldown_ticks == 0, ws.weapon)
        };
        if !ready {
            continue;
        }
        let Some(target) = nearest_target(player, enemies, range) else {
            continue;
        };
        let hit = roll_damage(player, weapon.damage_multiplier, rng);
        strike(&mut enemies[target], hit, Some(slot), &mut tally, events);
        let cooldown = weapon_cooldown_ticks(player, weapon.cooldown_secs);
        player.equipment.actives_mut()[slot].cooldown_ticks = cooldown;
    }

    player.money += tally.money;
    tally
}

fn strike(enemy: &mut Enemy, hit: Hit, weapon: Option<usize>, tally: &mut KillTally, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::Attack {
        target: enemy.id,
        damage: hit.damage,
        critical: hit.critical,
        weapon,
    });
    if enemy.take_damage(hit.damage) {
        tally.kills += 1;
        tally.money += enemy.reward;
        events.push(GameEvent::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
            pos: enemy.pos,
            reward: enemy.reward,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::equipment::default_catalog;
    use crate::sim::spawn::{EnemyKind, KindStats};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn enemy_at(id: u32, pos: Vec2, health: f32) -> Enemy {
        Enemy::new(
            id,
            EnemyKind::Slime,
            pos,
            KindStats {
                health,
                damage: 5.0,
                speed: 0.0,
                reward: 15,
            },
        )
    }

    #[test]
    fn test_mitigation_bounds() {
        assert_eq!(mitigate(40.0, 0.0), 40.0);
        assert_eq!(mitigate(40.0, 100.0), 1.0);
        assert_eq!(mitigate(40.0, 250.0), 1.0);
        assert_eq!(mitigate(40.0, 50.0), 20.0);
    }

    proptest! {
        #[test]
        fn prop_mitigation_never_below_one(dmg in 0.0f32..10_000.0, defense in 0.0f32..500.0) {
            let out = mitigate(dmg, defense);
            prop_assert!(out >= 1.0);
            prop_assert!(out <= dmg.max(1.0));
        }
    }

    #[test]
    fn test_basic_cooldown_from_attack_speed() {
        let player = Player::new(&Tuning::default());
        // 60 / 2.5
        assert_eq!(basic_cooldown_ticks(&player), 24);
        assert_eq!(weapon_cooldown_ticks(&player, 1.5), 90);
    }

    #[test]
    fn test_cooldown_scale_shortens_weapons() {
        let mut player = Player::new(&Tuning::default());
        let tome = default_catalog()
            .into_iter()
            .find(|i| i.name == "Empty Tome")
            .unwrap();
        player.equipment.equip(tome, &mut player.stats).unwrap();
        assert_eq!(weapon_cooldown_ticks(&player, 2.0), 102);
    }

    #[test]
    fn test_guaranteed_and_impossible_crits() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Player::new(&Tuning::default());
        player.stats.push_multiplier(StatKind::CritChance, 0.0);
        for _ in 0..100 {
            let hit = roll_damage(&player, 1.5, &mut rng);
            assert!(!hit.critical);
            assert_eq!(hit.damage, 30.0);
        }
        player.stats.remove_multiplier(StatKind::CritChance, 0.0);
        player.stats.push_multiplier(StatKind::CritChance, 100.0);
        let hit = roll_damage(&player, 1.0, &mut rng);
        assert!(hit.critical);
        assert_eq!(hit.damage, 40.0);
    }

    #[test]
    fn test_targets_nearest_living_in_range() {
        let player = Player::new(&Tuning::default());
        let p = player.pos;
        let mut enemies = vec![
            enemy_at(1, p + Vec2::new(100.0, 0.0), 10.0),
            enemy_at(2, p + Vec2::new(0.0, 40.0), 10.0),
            enemy_at(3, p + Vec2::new(-40.0, 0.0), 10.0),
            enemy_at(4, p + Vec2::new(10.0, 0.0), 10.0),
            enemy_at(5, p + Vec2::new(1000.0, 0.0), 10.0),
        ];
        enemies[3].dead = true;
        // 2 and 3 tie; first encountered wins
        assert_eq!(nearest_target(&player, &enemies, 150.0), Some(1));
        assert_eq!(nearest_target(&player, &enemies, 30.0), None);
    }

    #[test]
    fn test_attack_kills_once_and_pays() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut player = Player::new(&Tuning::default());
        player.stats.push_multiplier(StatKind::CritChance, 0.0);
        let money = player.money;
        let mut enemies = vec![enemy_at(1, player.pos + Vec2::new(50.0, 0.0), 15.0)];
        let mut events = Vec::new();

        let tally = resolve_auto_attacks(&mut player, &mut enemies, &mut rng, &mut events);
        assert_eq!(tally, KillTally { kills: 1, money: 15 });
        assert_eq!(player.money, money + 15);
        assert_eq!(player.attack_cooldown, 24);

        // Dead targets are never picked again
        player.attack_cooldown = 0;
        let tally = resolve_auto_attacks(&mut player, &mut enemies, &mut rng, &mut events);
        assert_eq!(tally, KillTally::default());
        assert_eq!(player.attack_cooldown, 0);
        assert_eq!(player.money, money + 15);
    }

    #[test]
    fn test_weapons_fire_on_their_own_cooldowns() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut player = Player::new(&Tuning::default());
        let knife = default_catalog()
            .into_iter()
            .find(|i| i.name == "Knife")
            .unwrap();
        player.equipment.equip(knife, &mut player.stats).unwrap();
        let mut enemies = vec![enemy_at(1, player.pos + Vec2::new(50.0, 0.0), 1.0e9)];
        let mut events = Vec::new();

        resolve_auto_attacks(&mut player, &mut enemies, &mut rng, &mut events);
        let weapon_shots = |events: &[GameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::Attack { weapon: Some(0), .. }))
                .count()
        };
        assert_eq!(weapon_shots(&events), 1);
        assert_eq!(player.equipment.actives()[0].cooldown_ticks, 60);

        for _ in 0..59 {
            resolve_auto_attacks(&mut player, &mut enemies, &mut rng, &mut events);
        }
        assert_eq!(weapon_shots(&events), 1);
        resolve_auto_attacks(&mut player, &mut enemies, &mut rng, &mut events);
        assert_eq!(weapon_shots(&events), 2);
    }

    #[test]
    fn test_contact_damage_every_tick_and_death() {
        let mut player = Player::new(&Tuning::default());
        let mut enemies = vec![enemy_at(1, player.pos + Vec2::new(5.0, 5.0), 10.0)];
        enemies[0].damage = 50.0;
        let mut events = Vec::new();

        // defense 10 => 45 per tick
        assert!(!resolve_contact_damage(&mut player, &enemies, &mut events));
        assert_eq!(player.health, 155.0);
        assert!(!resolve_contact_damage(&mut player, &enemies, &mut events));
        assert_eq!(player.health, 110.0);
        for _ in 0..2 {
            resolve_contact_damage(&mut player, &enemies, &mut events);
        }
        assert!(resolve_contact_damage(&mut player, &enemies, &mut events));
        assert_eq!(player.health, 0.0);
    }
}

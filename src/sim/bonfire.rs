//! Bonfires: fixed healing spots with per-bonfire cooldowns

use glam::Vec2;
use rand::Rng;

use super::state::Player;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::tuning::BonfireTuning;

/// A healing spot. Position is fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Bonfire {
    pos: Vec2,
    /// Ticks until this bonfire can heal again (0 = ready)
    pub cooldown_ticks: u32,
}

impl Bonfire {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            cooldown_ticks: 0,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_ticks == 0
    }

    /// 0.0 = ready, 1.0 = just used
    pub fn cooldown_fraction(&self, duration: u32) -> f32 {
        if duration == 0 {
            0.0
        } else {
            (self.cooldown_ticks as f32 / duration as f32).min(1.0)
        }
    }
}

/// Scatter up to `tuning.count` bonfires inside the play area, rejecting
/// candidates closer than `min_distance` to one already placed. Gives up
/// after `max_attempts` draws, so fewer may be returned.
pub fn place_bonfires(tuning: &BonfireTuning, rng: &mut impl Rng) -> Vec<Bonfire> {
    let mut placed: Vec<Bonfire> = Vec::with_capacity(tuning.count as usize);
    let min_sq = tuning.min_distance * tuning.min_distance;
    let lo = Vec2::splat(tuning.margin);
    let hi = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) - lo;

    let mut attempts = 0;
    while placed.len() < tuning.count as usize && attempts < tuning.max_attempts {
        attempts += 1;
        let candidate = Vec2::new(
            rng.random_range(lo.x..=hi.x),
            rng.random_range(lo.y..=hi.y),
        );
        if placed
            .iter()
            .all(|b| b.pos.distance_squared(candidate) >= min_sq)
        {
            placed.push(Bonfire::new(candidate));
        }
    }

    if placed.len() < tuning.count as usize {
        log::warn!(
            "Placed only {} of {} bonfires after {} attempts",
            placed.len(),
            tuning.count,
            attempts
        );
    }
    placed
}

/// Count every bonfire's cooldown down one tick
pub fn advance_cooldowns(bonfires: &mut [Bonfire]) {
    for bonfire in bonfires {
        if bonfire.cooldown_ticks > 0 {
            bonfire.cooldown_ticks -= 1;
        }
    }
}

/// Heal the player from every ready bonfire in range. Each one that fires
/// goes on cooldown. Returns `(bonfire index, amount healed)` per firing.
pub fn apply_healing(
    bonfires: &mut [Bonfire],
    player: &mut Player,
    tuning: &BonfireTuning,
) -> Vec<(usize, f32)> {
    let mut fired = Vec::new();
    for (i, bonfire) in bonfires.iter_mut().enumerate() {
        if !bonfire.is_ready() {
            continue;
        }
        if bonfire.pos.distance(player.pos) <= tuning.heal_radius {
            let healed = player.heal(tuning.heal_amount);
            bonfire.cooldown_ticks = tuning.cooldown_ticks;
            fired.push((i, healed));
        }
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_placement_respects_min_distance() {
        let tuning = BonfireTuning::default();
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let bonfires = place_bonfires(&tuning, &mut rng);
            assert!(!bonfires.is_empty());
            assert!(bonfires.len() <= tuning.count as usize);
            for (i, a) in bonfires.iter().enumerate() {
                assert!(a.pos.x >= tuning.margin && a.pos.x <= SCREEN_WIDTH - tuning.margin);
                for b in &bonfires[i + 1..] {
                    assert!(a.pos.distance(b.pos) >= tuning.min_distance);
                }
            }
        }
    }

    #[test]
    fn test_heal_then_cooldown() {
        let tuning = BonfireTuning::default();
        let mut player = Player::new(&Tuning::default());
        player.health = 50.0;
        let mut bonfires = vec![Bonfire::new(player.pos + Vec2::new(10.0, 0.0))];

        advance_cooldowns(&mut bonfires);
        let fired = apply_healing(&mut bonfires, &mut player, &tuning);
        assert_eq!(fired, vec![(0, 75.0)]);
        assert_eq!(player.health, 125.0);

        // Still standing on it: nothing until the full cooldown has elapsed
        for _ in 1..tuning.cooldown_ticks {
            advance_cooldowns(&mut bonfires);
            assert!(apply_healing(&mut bonfires, &mut player, &tuning).is_empty());
        }
        assert_eq!(player.health, 125.0);
        advance_cooldowns(&mut bonfires);
        assert_eq!(apply_healing(&mut bonfires, &mut player, &tuning).len(), 1);
        assert_eq!(player.health, 200.0);
    }

    #[test]
    fn test_out_of_range_does_nothing() {
        let tuning = BonfireTuning::default();
        let mut player = Player::new(&Tuning::default());
        player.health = 50.0;
        let mut bonfires = vec![Bonfire::new(player.pos + Vec2::new(tuning.heal_radius + 1.0, 0.0))];
        assert!(apply_healing(&mut bonfires, &mut player, &tuning).is_empty());
        assert!(bonfires[0].is_ready());
    }

    #[test]
    fn test_overlapping_bonfires_fire_independently() {
        let tuning = BonfireTuning::default();
        let mut player = Player::new(&Tuning::default());
        player.health = 10.0;
        let mut bonfires = vec![Bonfire::new(player.pos), Bonfire::new(player.pos + Vec2::new(0.0, 5.0))];
        let fired = apply_healing(&mut bonfires, &mut player, &tuning);
        assert_eq!(fired.len(), 2);
        assert_eq!(player.health, 160.0);
    }
}

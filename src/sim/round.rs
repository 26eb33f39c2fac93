//! Round counter, round clock, and per-round pacing

use crate::seconds_to_ticks;
use crate::tuning::RoundTuning;

/// Current round and everything derived from its number
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// 1-based, only ever increases
    pub number: u32,
    /// Ticks left in the current round
    pub timer_ticks: u32,
    pub duration_ticks: u32,
    /// Population the spawner tops up toward
    pub target_population: u32,
    /// Ticks between spawns
    pub spawn_delay_ticks: u32,
    /// Ticks until the next spawn attempt (0 = ready)
    pub spawn_timer: u32,
}

impl Round {
    pub fn new(tuning: &RoundTuning) -> Self {
        let duration_ticks = seconds_to_ticks(tuning.duration_secs);
        Self {
            number: 1,
            timer_ticks: duration_ticks,
            duration_ticks,
            target_population: target_population(tuning, 1),
            spawn_delay_ticks: spawn_delay(tuning, 1),
            spawn_timer: 0,
        }
    }

    /// Reset the clock and recompute pacing for the current round number.
    /// Returns the reward owed to the player.
    pub fn start_new_round(&mut self, tuning: &RoundTuning) -> u32 {
        self.duration_ticks = seconds_to_ticks(tuning.duration_secs);
        self.timer_ticks = self.duration_ticks;
        self.target_population = target_population(tuning, self.number);
        self.spawn_delay_ticks = spawn_delay(tuning, self.number);
        self.spawn_timer = 0;
        round_reward(tuning, self.number)
    }

    pub fn advance(&mut self) {
        self.number += 1;
    }

    /// Count the round clock down one tick
    pub fn tick_timer(&mut self) {
        if self.timer_ticks > 0 {
            self.timer_ticks -= 1;
        }
    }

    pub fn is_over(&self) -> bool {
        self.timer_ticks == 0
    }

    /// Count down the spawn timer; true if a spawn attempt is due
    pub fn spawn_due(&mut self) -> bool {
        if self.spawn_timer > 0 {
            self.spawn_timer -= 1;
        }
        self.spawn_timer == 0
    }

    pub fn reset_spawn_timer(&mut self) {
        self.spawn_timer = self.spawn_delay_ticks;
    }

    pub fn time_remaining_secs(&self) -> f32 {
        self.timer_ticks as f32 / crate::consts::TICKS_PER_SECOND as f32
    }
}

/// `base_reward * (1 + reward_scaling * (round - 1))`, rounded to the nearest unit
pub fn round_reward(tuning: &RoundTuning, round: u32) -> u32 {
    let r = round.saturating_sub(1) as f32;
    (tuning.base_reward as f32 * (1.0 + tuning.reward_scaling * r)).round() as u32
}

/// `min(population_cap, starting + (round - 1) * per_round)`
pub fn target_population(tuning: &RoundTuning, round: u32) -> u32 {
    let grown = tuning
        .starting_enemies
        .saturating_add(round.saturating_sub(1).saturating_mul(tuning.enemies_per_round));
    grown.min(tuning.population_cap)
}

/// `max(min_delay, base_delay * decay^(round - 1))`, in whole ticks
pub fn spawn_delay(tuning: &RoundTuning, round: u32) -> u32 {
    let exp = round.saturating_sub(1).min(i32::MAX as u32) as i32;
    let delay = tuning.base_spawn_delay_ticks * tuning.spawn_delay_decay.powi(exp);
    delay.max(tuning.min_spawn_delay_ticks).round().max(1.0) as u32
}

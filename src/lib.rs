//! Ember Rounds - round-based survival arena core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machine, rounds, spawning, combat, bonfires, shop)
//! - `tuning`: Data-driven game balance, loaded once and validated

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play area dimensions
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Player and enemy bounding box edge length
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const ENEMY_SIZE: f32 = 32.0;

    /// Player starting resources
    pub const PLAYER_START_HEALTH: f32 = 200.0;
    pub const PLAYER_START_MONEY: u32 = 100;

    /// Maximum simultaneously equipped active items (weapons)
    pub const MAX_ACTIVE_ITEMS: usize = 4;

    /// Fraction of missing health restored when the shop opens
    pub const SHOP_HEAL_FRACTION: f32 = 0.3;
}

/// Center of the play area
#[inline]
pub fn screen_center() -> Vec2 {
    Vec2::new(consts::SCREEN_WIDTH / 2.0, consts::SCREEN_HEIGHT / 2.0)
}

/// Convert a duration in seconds to whole ticks (rounded up, at least one)
#[inline]
pub fn seconds_to_ticks(seconds: f32) -> u32 {
    (seconds * consts::TICKS_PER_SECOND as f32).ceil().max(1.0) as u32
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for enemies, placement order for bonfires)
//! - No rendering or platform dependencies

pub mod bonfire;
pub mod collision;
pub mod combat;
pub mod equipment;
pub mod round;
pub mod shop;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod stats;
pub mod tick;

pub use bonfire::Bonfire;
pub use collision::Aabb;
pub use equipment::{EquipError, EquipmentItem, EquipmentLedger, ItemKind, Rarity, StatEffect, WeaponStats};
pub use round::Round;
pub use shop::{PurchaseError, Shop};
pub use snapshot::Snapshot;
pub use spawn::{EnemyKind, SpawnRefusal, Tier, TierSchedule, TierWeights};
pub use state::{Enemy, GameEvent, GamePhase, GameState, Player};
pub use stats::{BaseStats, StatBlock, StatKind};
pub use tick::{TickInput, tick};

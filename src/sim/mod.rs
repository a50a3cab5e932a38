//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No presentation or threading dependencies

pub mod collision;
pub mod difficulty;
pub mod shape;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{pickup_coin, resolve_against, resolve_obstacles};
pub use difficulty::Difficulty;
pub use shape::{Hitbox, Outcode, Shape};
pub use spawn::{ObstacleSpan, RowParams, Spawner};
pub use state::{
    Capabilities, Entity, EntityKind, GameEvent, GameOverReason, GamePhase, GameSession, Player,
};
pub use tick::tick;

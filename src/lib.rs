//! Drift Dodge - A vertically scrolling arcade dodger
//!
//! Core modules:
//! - `sim`: Simulation (entities, difficulty, generation, collisions, tick)
//! - `game_loop`: Fixed-cadence loop thread with restart control
//! - `input`: Input snapshot shared with the event source
//! - `settings`: Data-driven game configuration

pub mod game_loop;
pub mod input;
pub mod settings;
pub mod sim;

pub use game_loop::{FpsCounter, Frame, Game, LoopError, Presenter};
pub use input::{InputSnapshot, Pointer, SharedInput};
pub use settings::{ConfigError, DifficultyTable, GameConfig, ScoringRules};

/// Default game configuration constants
pub mod consts {
    /// Target update/render cadence
    pub const TARGET_FPS: u32 = 60;

    /// Play area dimensions (pixels)
    pub const PANEL_WIDTH: f32 = 800.0;
    pub const PANEL_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 49.0;
    pub const PLAYER_HEIGHT: f32 = 49.0;
    /// Pixels per frame
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const PLAYER_BOOST_SPEED: f32 = 5.0;

    /// Coin hitbox diameter
    pub const COIN_DIAMETER: f32 = 32.0;
    /// Up to this many coins on top of the difficulty minimum
    pub const EXTRA_COINS_MAX: u32 = 3;
    /// Placement candidates per coin before a batch is truncated
    pub const COIN_MAX_ATTEMPTS: u32 = 64;
    /// Upper bounds accepted from config files
    pub const MAX_COINS_PER_ROW: u32 = 256;
    pub const MAX_COIN_ATTEMPTS: u32 = 10_000;

    /// Obstacle rows
    pub const ROW_HEIGHT: f32 = 10.0;
    /// Slot width = 2 * player width + margin
    pub const SLOT_MARGIN: f32 = 2.0;
    /// Added to the difficulty-scaled minimum gap
    pub const GAP_MARGIN: f32 = 2.0;

    /// Difficulty tables (interpolated between min and max)
    pub const MIN_ENTITY_SPEED: f32 = 1.0;
    pub const MAX_ENTITY_SPEED: f32 = 5.0;
    pub const MIN_OBSTACLE_DISTANCE: f32 = 150.0;
    pub const MAX_OBSTACLE_DISTANCE: f32 = 500.0;
    pub const MIN_OBSTACLE_PROBABILITY: f32 = 0.25;
    pub const MAX_OBSTACLE_PROBABILITY: f32 = 0.75;
    /// Minimum coins per row at zero difficulty
    pub const MAX_MIN_COINS: u32 = 4;
    /// Score at which difficulty saturates
    pub const SCORE_LIMIT: i64 = 10_000;

    /// Scoring
    pub const HIT_PENALTY: i64 = 10;
    pub const COIN_REWARD: i64 = 100;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

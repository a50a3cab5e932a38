//! Game state and core simulation types
//!
//! One `GameSession` per play-through. It owns the player and the entity
//! queues; restarting builds a new session instead of resetting this one.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::shape::Hitbox;
use super::spawn::Spawner;
use crate::input::InputSnapshot;
use crate::settings::GameConfig;

bitflags::bitflags! {
    /// What an entity kind takes part in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Descends with the world every frame
        const SCROLLS    = 1 << 0;
        /// Moved by player input
        const STEERABLE  = 1 << 1;
        /// Takes part in collision tests
        const COLLIDABLE = 1 << 2;
        /// Shown by the presenter
        const DRAWABLE   = 1 << 3;
        /// Pushes the player back
        const SOLID      = 1 << 4;
        /// Consumed on contact
        const PICKUP     = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Obstacle,
    Coin,
}

impl EntityKind {
    pub fn capabilities(self) -> Capabilities {
        let base = Capabilities::COLLIDABLE | Capabilities::DRAWABLE;
        match self {
            EntityKind::Player => base | Capabilities::STEERABLE,
            EntityKind::Obstacle => base | Capabilities::SCROLLS | Capabilities::SOLID,
            EntityKind::Coin => base | Capabilities::SCROLLS | Capabilities::PICKUP,
        }
    }
}

/// A positioned hitbox of some kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub hitbox: Hitbox,
    /// Pixels per frame
    pub speed: f32,
}

impl Entity {
    /// Rectangular obstacle span
    pub fn obstacle(pos: Vec2, size: Vec2) -> Self {
        Self {
            kind: EntityKind::Obstacle,
            hitbox: Hitbox::rect(pos, size),
            speed: 0.0,
        }
    }

    /// Circular coin
    pub fn coin(pos: Vec2, diameter: f32) -> Self {
        Self {
            kind: EntityKind::Coin,
            hitbox: Hitbox::ellipse(pos, Vec2::splat(diameter)),
            speed: 0.0,
        }
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.hitbox.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.hitbox.pos.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.hitbox.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.hitbox.size.y
    }

    pub fn collides_with(&self, other: &Entity) -> bool {
        self.hitbox.intersects(&other.hitbox)
    }

    /// Move down by `dy` (only scrolling kinds move)
    pub fn descend(&mut self, dy: f32) {
        if self.capabilities().contains(Capabilities::SCROLLS) {
            self.speed = dy;
            self.hitbox.translate(Vec2::new(0.0, dy));
        }
    }

    /// Fully scrolled past the bottom edge
    pub fn is_past(&self, panel_height: f32) -> bool {
        self.y() > panel_height
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Entity,
    pub base_speed: f32,
    pub boost_speed: f32,
    /// Overlapped an obstacle during the last collision pass
    pub hit: bool,
    panel: Vec2,
}

impl Player {
    /// Player centred in the panel
    pub fn new(config: &GameConfig) -> Self {
        let panel = Vec2::new(config.panel_width, config.panel_height);
        let size = Vec2::new(config.player_width, config.player_height);
        let pos = ((panel - size) * 0.5).max(Vec2::ZERO);

        Self {
            body: Entity {
                kind: EntityKind::Player,
                hitbox: Hitbox::ellipse(pos, size),
                speed: config.player_speed,
            },
            base_speed: config.player_speed,
            boost_speed: config.player_boost_speed,
            hit: false,
            panel,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.hitbox.pos
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.body.hitbox.pos = pos;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.body.speed
    }

    /// Largest top-left position that keeps the player inside the panel
    fn max_pos(&self) -> Vec2 {
        (self.panel - self.body.hitbox.size).max(Vec2::ZERO)
    }

    // Moves never push the player out of the panel, and never pull it back in
    // from the edge it was already past (obstacles may shove it off-panel).
    fn shift_x(&mut self, dx: f32) {
        let pos = &mut self.body.hitbox.pos;
        let max_x = (self.panel.x - self.body.hitbox.size.x).max(0.0);
        if dx < 0.0 && pos.x > 0.0 {
            pos.x = (pos.x + dx).max(0.0);
        } else if dx > 0.0 && pos.x < max_x {
            pos.x = (pos.x + dx).min(max_x);
        }
    }

    fn shift_y(&mut self, dy: f32) {
        let pos = &mut self.body.hitbox.pos;
        let max_y = (self.panel.y - self.body.hitbox.size.y).max(0.0);
        if dy < 0.0 && pos.y > 0.0 {
            pos.y = (pos.y + dy).max(0.0);
        } else if dy > 0.0 && pos.y < max_y {
            pos.y = (pos.y + dy).min(max_y);
        }
    }

    pub fn move_left(&mut self) {
        self.shift_x(-self.speed());
    }

    pub fn move_right(&mut self) {
        self.shift_x(self.speed());
    }

    pub fn move_up(&mut self) {
        self.shift_y(-self.speed());
    }

    pub fn move_down(&mut self) {
        self.shift_y(self.speed());
    }

    /// Move the centre toward `target`, at most `speed` per axis
    pub fn steer_toward(&mut self, target: Vec2) {
        let speed = self.speed();
        let delta = (target - self.body.hitbox.center()).clamp(Vec2::splat(-speed), Vec2::splat(speed));
        self.shift_x(delta.x);
        self.shift_y(delta.y);
    }

    /// Apply one frame of input
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        self.body.speed = if input.boost {
            self.boost_speed
        } else {
            self.base_speed
        };

        if let Some(target) = input.pointer_target() {
            self.steer_toward(target);
            return;
        }

        if input.up {
            self.move_up();
        }
        if input.down {
            self.move_down();
        }
        if input.left {
            self.move_left();
        }
        if input.right {
            self.move_right();
        }
    }

    /// Inside the panel on all four edges
    pub fn is_within_panel(&self) -> bool {
        let pos = self.pos();
        let max = self.max_pos();
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= max.x && pos.y <= max.y
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Score dropped below zero
    ScoreBelowZero,
    /// Player was pushed past the bottom edge
    PushedOffPanel,
    /// Both at once
    Both,
}

/// Things that happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new hit episode started (penalty applied)
    ObstacleHit,
    CoinCollected,
    RowSpawned { obstacles: usize, coins: usize },
    DifficultyChanged { level: f32 },
    GameOver { reason: GameOverReason, score: i64 },
}

/// Complete state of one play-through
#[derive(Debug, Clone)]
pub struct GameSession {
    pub config: GameConfig,
    /// Seed the spawner started from
    pub seed: u64,
    pub phase: GamePhase,
    pub player: Player,
    /// Spawn order: oldest (lowest on screen) at the front
    pub obstacles: VecDeque<Entity>,
    pub coins: VecDeque<Entity>,
    pub difficulty: Difficulty,
    pub score: i64,
    /// Ticks simulated so far
    pub frame: u64,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    pub(crate) spawner: Spawner,
    /// Hit flag from the previous tick (penalty is per episode)
    pub(crate) was_hit: bool,
    /// Y of the most recently spawned row, tracked even when it had no spans
    pub(crate) last_row_y: Option<f32>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let difficulty = Difficulty::from_score(0, &config);
        Self {
            player: Player::new(&config),
            seed,
            phase: GamePhase::Running,
            obstacles: VecDeque::new(),
            coins: VecDeque::new(),
            difficulty,
            score: 0,
            frame: 0,
            events: Vec::new(),
            spawner: Spawner::new(seed),
            was_hit: false,
            last_row_y: None,
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// All drawable entities, player last
    pub fn drawables(&self) -> impl Iterator<Item = &Entity> {
        self.obstacles
            .iter()
            .chain(self.coins.iter())
            .chain(std::iter::once(&self.player.body))
            .filter(|e| e.capabilities().contains(Capabilities::DRAWABLE))
    }
}

//! Difficulty curve
//!
//! A single scalar in [0, 1] derived from the score drives every pacing and
//! generation parameter. Pure and cheap: recomputed whenever the score changes.

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::settings::GameConfig;

/// Derived generation/pacing parameters for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Normalized difficulty in [0, 1]
    pub level: f32,
    /// Descent speed of obstacles and coins (pixels/frame)
    pub entity_speed: f32,
    /// Vertical distance between obstacle rows
    pub obstacle_distance: f32,
    /// Minimum coins spawned with each row
    pub min_coins: u32,
    /// Chance that a row slot is an obstacle
    pub obstacle_probability: f32,
    /// Narrowest gap a row may offer
    pub min_gap_width: f32,
}

impl Difficulty {
    /// Normalize a score into [0, 1]; negative scores count as zero
    pub fn level_for_score(score: i64, config: &GameConfig) -> f32 {
        let limit = config.difficulty.score_limit.max(1);
        score.clamp(0, limit) as f32 / limit as f32
    }

    pub fn from_score(score: i64, config: &GameConfig) -> Self {
        Self::from_level(Self::level_for_score(score, config), config)
    }

    pub fn from_level(level: f32, config: &GameConfig) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let ease = 1.0 - level;
        let table = &config.difficulty;

        Self {
            level,
            entity_speed: lerp(table.min_entity_speed, table.max_entity_speed, level),
            // Harder means rows closer together
            obstacle_distance: lerp(table.max_obstacle_distance, table.min_obstacle_distance, level),
            min_coins: (table.max_min_coins as f32 * ease).round() as u32,
            obstacle_probability: lerp(
                table.min_obstacle_probability,
                table.max_obstacle_probability,
                level,
            ),
            min_gap_width: config.player_width * (1.0 + 2.0 * ease) + config.gap_margin,
        }
    }
}

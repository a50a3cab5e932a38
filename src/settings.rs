//! Game configuration
//!
//! Every tuning constant the simulation reads, injectable at startup.
//! Loaded from JSON; missing fields fall back to the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Difficulty interpolation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub min_entity_speed: f32,
    pub max_entity_speed: f32,
    pub min_obstacle_distance: f32,
    pub max_obstacle_distance: f32,
    pub min_obstacle_probability: f32,
    pub max_obstacle_probability: f32,
    /// Minimum coins per row at zero difficulty (scales down to 0)
    pub max_min_coins: u32,
    /// Score at which difficulty reaches 1.0
    pub score_limit: i64,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            min_entity_speed: MIN_ENTITY_SPEED,
            max_entity_speed: MAX_ENTITY_SPEED,
            min_obstacle_distance: MIN_OBSTACLE_DISTANCE,
            max_obstacle_distance: MAX_OBSTACLE_DISTANCE,
            min_obstacle_probability: MIN_OBSTACLE_PROBABILITY,
            max_obstacle_probability: MAX_OBSTACLE_PROBABILITY,
            max_min_coins: MAX_MIN_COINS,
            score_limit: SCORE_LIMIT,
        }
    }
}

/// Score deltas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Subtracted once per hit episode
    pub hit_penalty: i64,
    /// Added per collected coin
    pub coin_reward: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            hit_penalty: HIT_PENALTY,
            coin_reward: COIN_REWARD,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Loop ===
    pub target_fps: u32,

    // === Play area ===
    pub panel_width: f32,
    pub panel_height: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub player_boost_speed: f32,

    // === Generation ===
    pub coin_diameter: f32,
    pub extra_coins_max: u32,
    pub coin_max_attempts: u32,
    pub row_height: f32,
    pub slot_margin: f32,
    pub gap_margin: f32,
    /// Fixed RNG seed; a fresh seed is drawn per game when absent
    pub seed: Option<u64>,

    pub difficulty: DifficultyTable,
    pub scoring: ScoringRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,

            panel_width: PANEL_WIDTH,
            panel_height: PANEL_HEIGHT,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_speed: PLAYER_SPEED,
            player_boost_speed: PLAYER_BOOST_SPEED,

            coin_diameter: COIN_DIAMETER,
            extra_coins_max: EXTRA_COINS_MAX,
            coin_max_attempts: COIN_MAX_ATTEMPTS,
            row_height: ROW_HEIGHT,
            slot_margin: SLOT_MARGIN,
            gap_margin: GAP_MARGIN,
            seed: None,

            difficulty: DifficultyTable::default(),
            scoring: ScoringRules::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Target frame period
    pub fn frame_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Width of one obstacle row slot (a player always fits through one)
    pub fn slot_width(&self) -> f32 {
        2.0 * self.player_width + self.slot_margin
    }

    /// Check ranges the simulation relies on.
    ///
    /// Zero panel dimensions are allowed (generators degrade to empty output);
    /// negative or non-finite ones are not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(invalid("target_fps", "must be at least 1"));
        }

        let non_negative = [
            ("panel_width", self.panel_width),
            ("panel_height", self.panel_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_speed", self.player_speed),
            ("player_boost_speed", self.player_boost_speed),
            ("coin_diameter", self.coin_diameter),
            ("row_height", self.row_height),
            ("slot_margin", self.slot_margin),
            ("gap_margin", self.gap_margin),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("expected a finite value >= 0, got {value}")));
            }
        }

        let table = &self.difficulty;
        check_range(
            "difficulty.entity_speed",
            table.min_entity_speed,
            table.max_entity_speed,
        )?;
        check_range(
            "difficulty.obstacle_distance",
            table.min_obstacle_distance,
            table.max_obstacle_distance,
        )?;
        check_range(
            "difficulty.obstacle_probability",
            table.min_obstacle_probability,
            table.max_obstacle_probability,
        )?;
        if table.max_obstacle_probability > 1.0 {
            return Err(invalid(
                "difficulty.obstacle_probability",
                "probabilities must lie in [0, 1]",
            ));
        }
        if table.score_limit <= 0 {
            return Err(invalid("difficulty.score_limit", "must be positive"));
        }

        let coins_per_row = table.max_min_coins.saturating_add(self.extra_coins_max);
        if coins_per_row > MAX_COINS_PER_ROW {
            return Err(invalid(
                "extra_coins_max",
                format!(
                    "difficulty.max_min_coins + extra_coins_max = {coins_per_row}, at most {MAX_COINS_PER_ROW}"
                ),
            ));
        }
        if self.coin_max_attempts > MAX_COIN_ATTEMPTS {
            return Err(invalid(
                "coin_max_attempts",
                format!("at most {MAX_COIN_ATTEMPTS}, got {}", self.coin_max_attempts),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        return Err(invalid(field, format!("expected finite values >= 0, got {min}..{max}")));
    }
    if min > max {
        return Err(invalid(field, format!("min {min} exceeds max {max}")));
    }
    Ok(())
}

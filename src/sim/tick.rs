//! Simulation tick
//!
//! One update step: input, collisions and scoring, game-over check,
//! difficulty, scrolling, row spawning, eviction. Timing lives in the loop.

use glam::Vec2;

use super::collision::{pickup_coin, resolve_obstacles};
use super::difficulty::Difficulty;
use super::spawn::RowParams;
use super::state::{Entity, GameEvent, GameOverReason, GamePhase, GameSession};
use crate::input::InputSnapshot;

/// Advance the session by one frame
pub fn tick(session: &mut GameSession, input: &InputSnapshot) {
    if !session.is_running() {
        return;
    }
    session.events.clear();
    session.frame += 1;

    session.player.apply_input(input);

    let score_before = session.score;
    apply_collisions(session);

    if let Some(reason) = game_over_reason(session) {
        session.phase = GamePhase::GameOver;
        session.events.push(GameEvent::GameOver {
            reason,
            score: session.score,
        });
        log::info!(
            "Game over after {} frames: {:?}, score {}",
            session.frame,
            reason,
            session.score
        );
        return;
    }

    if session.score != score_before {
        update_difficulty(session);
    }

    scroll(session);

    let spawn_due = session
        .last_row_y
        .is_none_or(|y| y > session.difficulty.obstacle_distance);
    if spawn_due {
        spawn_row(session);
    }

    evict(session);
}

/// Obstacle push-back, hit penalty (once per hit episode), coin pickup
fn apply_collisions(session: &mut GameSession) {
    let rules = &session.config.scoring;

    let hit = resolve_obstacles(&mut session.player, session.obstacles.iter());
    if hit && !session.was_hit {
        session.score -= rules.hit_penalty;
        session.events.push(GameEvent::ObstacleHit);
    }
    session.was_hit = hit;

    if pickup_coin(&session.player, &mut session.coins).is_some() {
        session.score += rules.coin_reward;
        session.events.push(GameEvent::CoinCollected);
    }
}

fn game_over_reason(session: &GameSession) -> Option<GameOverReason> {
    let broke = session.score < 0;
    let fell = session.player.pos().y > session.config.panel_height;
    match (broke, fell) {
        (true, true) => Some(GameOverReason::Both),
        (true, false) => Some(GameOverReason::ScoreBelowZero),
        (false, true) => Some(GameOverReason::PushedOffPanel),
        (false, false) => None,
    }
}

fn update_difficulty(session: &mut GameSession) {
    let difficulty = Difficulty::from_score(session.score, &session.config);
    if difficulty.level != session.difficulty.level {
        log::debug!(
            "Difficulty {:.3} -> {:.3} (score {})",
            session.difficulty.level,
            difficulty.level,
            session.score
        );
        session.events.push(GameEvent::DifficultyChanged {
            level: difficulty.level,
        });
    }
    session.difficulty = difficulty;
}

/// Move obstacles and coins down by the current entity speed
fn scroll(session: &mut GameSession) {
    let speed = session.difficulty.entity_speed;
    for entity in session.obstacles.iter_mut().chain(session.coins.iter_mut()) {
        entity.descend(speed);
    }
    if let Some(y) = session.last_row_y.as_mut() {
        *y += speed;
    }
}

/// Spawn a row just above the top edge plus the coins in the band above it
fn spawn_row(session: &mut GameSession) {
    let row_height = session.config.row_height;
    let params = RowParams::new(&session.config, &session.difficulty);

    let spans = session.spawner.generate_row(&params);
    session.obstacles.extend(spans.iter().map(|span| {
        Entity::obstacle(
            Vec2::new(span.x, -row_height),
            Vec2::new(span.width, row_height),
        )
    }));

    let coins = session.spawner.generate_coins(
        &session.config,
        session.difficulty.obstacle_distance,
        session.difficulty.min_coins,
    );
    let coin_count = coins.len();
    session.coins.extend(coins);

    session.last_row_y = Some(-row_height);
    session.events.push(GameEvent::RowSpawned {
        obstacles: spans.len(),
        coins: coin_count,
    });
    log::trace!("Row spawned: {} spans, {} coins", spans.len(), coin_count);
}

/// Drop entities that left the bottom edge, oldest first.
///
/// Descent is uniform, so once the oldest entity is still on the panel
/// nothing behind it can have left.
fn evict(session: &mut GameSession) {
    let bottom = session.config.panel_height;
    while session.obstacles.front().is_some_and(|e| e.is_past(bottom)) {
        session.obstacles.pop_front();
    }
    while session.coins.front().is_some_and(|e| e.is_past(bottom)) {
        session.coins.pop_front();
    }
}

//! Collision detection and resolution
//!
//! Obstacles push the player out in 1px steps along the axis picked from the
//! outcode of the player's corners. Small discrete corrections, not a physics
//! solver: it relies on entities moving only a few pixels per frame.

use std::collections::VecDeque;

use glam::Vec2;

use super::shape::{Hitbox, Outcode};
use super::state::{Capabilities, Entity, Player};

/// Resolve the player against the first obstacle it overlaps.
///
/// Resets and then sets `player.hit`. Scanning stops at the first hit, so
/// further overlapping obstacles are left for the next frame.
pub fn resolve_obstacles<'a>(
    player: &mut Player,
    obstacles: impl IntoIterator<Item = &'a Entity>,
) -> bool {
    player.hit = false;
    for obstacle in obstacles {
        if !obstacle.capabilities().contains(Capabilities::SOLID) {
            continue;
        }
        if resolve_against(&mut player.body.hitbox, &obstacle.hitbox) {
            player.hit = true;
            break;
        }
    }
    player.hit
}

/// Push `hitbox` out of `obstacle`. Returns whether they overlapped.
pub fn resolve_against(hitbox: &mut Hitbox, obstacle: &Hitbox) -> bool {
    if !hitbox.intersects(obstacle) {
        return false;
    }

    // Escaping never takes more than the combined extents
    let max_steps = (hitbox.size + obstacle.size).element_sum().ceil() as u32 + 2;
    let mut steps = 0;
    while hitbox.intersects(obstacle) && steps < max_steps {
        hitbox.translate(push_direction(hitbox, obstacle));
        steps += 1;
    }

    if hitbox.intersects(obstacle) {
        log::warn!("Collision resolution did not converge after {steps} steps");
    } else {
        log::trace!("Resolved obstacle overlap in {steps} steps");
    }
    true
}

/// Unit step that moves `hitbox` out of `obstacle`
fn push_direction(hitbox: &Hitbox, obstacle: &Hitbox) -> Vec2 {
    let outcode = obstacle.outcode(hitbox.min()) | obstacle.outcode(hitbox.max());

    // Top and bottom both set means the player spans the obstacle vertically
    if outcode.vertical_only_one() {
        return if outcode.contains(Outcode::TOP) {
            Vec2::NEG_Y
        } else {
            Vec2::Y
        };
    }
    if outcode.contains(Outcode::LEFT) {
        return Vec2::NEG_X;
    }
    if outcode.contains(Outcode::RIGHT) {
        return Vec2::X;
    }
    min_penetration_direction(hitbox, obstacle)
}

/// Direction of the shortest exit when the outcode gives no axis
fn min_penetration_direction(hitbox: &Hitbox, obstacle: &Hitbox) -> Vec2 {
    let exits = [
        (hitbox.max().y - obstacle.min().y, Vec2::NEG_Y),
        (obstacle.max().y - hitbox.min().y, Vec2::Y),
        (hitbox.max().x - obstacle.min().x, Vec2::NEG_X),
        (obstacle.max().x - hitbox.min().x, Vec2::X),
    ];
    exits
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map_or(Vec2::NEG_Y, |(_, dir)| dir)
}

/// Remove and return the first coin (in spawn order) the player touches.
///
/// At most one coin per call; any other overlapping coin stays for the next
/// frame.
pub fn pickup_coin(player: &Player, coins: &mut VecDeque<Entity>) -> Option<Entity> {
    let index = coins.iter().position(|coin| {
        coin.capabilities().contains(Capabilities::PICKUP) && player.body.collides_with(coin)
    })?;
    coins.remove(index)
}

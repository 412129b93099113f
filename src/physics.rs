//! Gravity integration and platform landing.
//!
//! The resolver is landing-only: actors pass through platforms from below
//! and from the side, and only come to rest on a top surface while falling.

use crate::config::PhysicsConfig;
use crate::entities::{Body, Facing, Platform, Player};

/// Axis-aligned box used for overlap tests between actors, bullets and crates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

pub fn body_rect(body: &Body) -> Rect {
    Rect {
        x: body.x,
        y: body.y,
        w: body.width,
        h: body.height,
    }
}

pub fn spans_overlap(ax: f32, aw: f32, bx: f32, bw: f32) -> bool {
    ax < bx + bw && ax + aw > bx
}

pub fn platform_center_x(platform: &Platform) -> f32 {
    platform.x + platform.width / 2.0
}

// ── Integration ──────────────────────────────────────────────────────────────

/// Semi-implicit Euler: velocity first, then position. `dx` is a direct
/// horizontal displacement, there is no horizontal momentum.
pub fn integrate(body: &mut Body, dx: f32, gravity: f32) {
    body.vy += gravity;
    body.y += body.vy;
    body.x += dx;
}

/// Land `body` on a platform if it is falling onto one.
///
/// A platform qualifies when it overlaps the body horizontally, the body's
/// feet are now at or below its top, and before this tick's move the feet
/// were no more than `tolerance` below it.  Among qualifying platforms the
/// topmost one wins, i.e. the first surface the body would have met.
pub fn resolve_landing(
    body: &mut Body,
    prev_bottom: f32,
    platforms: &[Platform],
    tolerance: f32,
) -> Option<usize> {
    body.grounded = false;
    if body.vy < 0.0 {
        return None;
    }

    let bottom = body.y + body.height;
    let (index, platform) = platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| spans_overlap(body.x, body.width, p.x, p.width))
        .filter(|(_, p)| bottom >= p.y && prev_bottom <= p.y + tolerance)
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))?;

    body.y = platform.y - body.height;
    body.vy = 0.0;
    body.grounded = true;
    Some(index)
}

/// Keep the body inside `[0, level_width - width]`.
pub fn clamp_to_level(body: &mut Body, level_width: f32) {
    let max_x = (level_width - body.width).max(0.0);
    body.x = body.x.clamp(0.0, max_x);
}

/// The platform an actor standing in this column would rest on: the highest
/// top surface at or below its feet.
pub fn support_surface(
    platforms: &[Platform],
    x: f32,
    width: f32,
    bottom: f32,
    tolerance: f32,
) -> Option<usize> {
    platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| spans_overlap(x, width, p.x, p.width))
        .filter(|(_, p)| p.y >= bottom - tolerance)
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))
        .map(|(i, _)| i)
}

// ── Player step ──────────────────────────────────────────────────────────────

/// Apply one tick of input and gravity to the player. `direction` is -1, 0 or 1.
pub fn step_player(
    player: &mut Player,
    direction: f32,
    jump: bool,
    platforms: &[Platform],
    level_width: f32,
    cfg: &PhysicsConfig,
) {
    if direction < 0.0 {
        player.facing = Facing::Left;
    } else if direction > 0.0 {
        player.facing = Facing::Right;
    }

    let body = &mut player.body;
    if jump && body.grounded {
        body.vy = cfg.jump_impulse;
        body.grounded = false;
    }

    let prev_bottom = body.y + body.height;
    integrate(body, direction * cfg.player_speed, cfg.gravity);
    player.platform = resolve_landing(body, prev_bottom, platforms, cfg.landing_tolerance);
    clamp_to_level(body, level_width);
}

pub fn fell_out(body: &Body, cfg: &PhysicsConfig) -> bool {
    body.y > cfg.kill_plane_y
}

//! Enemy behaviour.
//!
//! Each tick an enemy goes through three steps: [`transition`] picks the next
//! [`EnemyState`] from a [`Context`] snapshot, [`steer`] moves it according to
//! that state, and [`try_attack`] applies contact damage independently of
//! the movement state.  The predicates feeding `transition` are plain
//! functions over distances so they can be checked in isolation.

use rand::Rng;
use tracing::debug;

use crate::config::AiConfig;
use crate::entities::{Enemy, EnemyState, Facing, Platform, Player};
use crate::physics::{clamp_to_level, platform_center_x, spans_overlap, support_surface};

/// Everything `transition` needs to know about the world, measured this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Context {
    /// Horizontal distance between enemy and player centers.
    pub distance: f32,
    /// Vertical distance between enemy and player feet.
    pub vertical: f32,
    /// How far the enemy has drifted from its patrol anchor.
    pub anchor_offset: f32,
    /// The player's platform, if it differs from the enemy's and a jump can reach it.
    pub jump_target: Option<usize>,
    /// Outcome of this tick's random idle/patrol roll.
    pub patrol_roll: bool,
}

// ── Predicates ───────────────────────────────────────────────────────────────

pub fn should_aggro(distance: f32, cfg: &AiConfig) -> bool {
    distance < cfg.aggro_range
}

pub fn should_disengage(distance: f32, cfg: &AiConfig) -> bool {
    distance > cfg.disengage_range
}

pub fn in_attack_range(distance: f32, vertical: f32, cfg: &AiConfig) -> bool {
    distance <= cfg.attack_range && vertical <= cfg.attack_vertical
}

/// Whether an enemy on `from` can jump onto `to`.  Falling is free, climbing
/// is limited to `jump_max_rise`.
pub fn can_jump_between_platforms(from: &Platform, to: &Platform, cfg: &AiConfig) -> bool {
    can_jump_from(platform_center_x(from), from, to, cfg)
}

/// Reachability with the horizontal gap measured from `origin_x` to the
/// center of `to`.
pub fn can_jump_from(origin_x: f32, from: &Platform, to: &Platform, cfg: &AiConfig) -> bool {
    let dx = (platform_center_x(to) - origin_x).abs();
    let rise = from.y - to.y;
    dx < cfg.jump_max_dx && rise < cfg.jump_max_rise
}

/// Where a jump off `from` starts. Platforms wider than a jump can cover
/// are measured from the enemy's own center instead of their middle.
pub fn jump_origin_x(from: &Platform, enemy_center: f32, cfg: &AiConfig) -> f32 {
    if from.width > cfg.jump_max_dx {
        enemy_center
    } else {
        platform_center_x(from)
    }
}

pub fn jump_target(
    enemy_platform: Option<usize>,
    enemy_center: f32,
    player_platform: Option<usize>,
    platforms: &[Platform],
    cfg: &AiConfig,
) -> Option<usize> {
    let (from, to) = (enemy_platform?, player_platform?);
    if from == to {
        return None;
    }
    let (source, dest) = (platforms.get(from)?, platforms.get(to)?);
    let origin = jump_origin_x(source, enemy_center, cfg);
    can_jump_from(origin, source, dest, cfg).then_some(to)
}

pub fn should_jump(ctx: &Context, cfg: &AiConfig) -> Option<usize> {
    ctx.jump_target
        .filter(|_| ctx.distance <= cfg.jump_trigger_distance)
}

// ── Transition table ─────────────────────────────────────────────────────────

pub fn transition(state: EnemyState, ctx: &Context, cfg: &AiConfig) -> EnemyState {
    match state {
        EnemyState::Idle => {
            if should_aggro(ctx.distance, cfg) {
                EnemyState::Chase
            } else if ctx.patrol_roll || ctx.anchor_offset > cfg.patrol_range {
                EnemyState::Patrol
            } else {
                EnemyState::Idle
            }
        }
        EnemyState::Patrol => {
            if should_aggro(ctx.distance, cfg) {
                EnemyState::Chase
            } else if ctx.patrol_roll && ctx.anchor_offset <= cfg.patrol_range {
                EnemyState::Idle
            } else {
                EnemyState::Patrol
            }
        }
        EnemyState::Chase | EnemyState::Attack => {
            if should_disengage(ctx.distance, cfg) {
                EnemyState::Idle
            } else if let Some(target) = should_jump(ctx, cfg) {
                EnemyState::Jump {
                    ticks_left: cfg.jump_ticks,
                    target,
                }
            } else if in_attack_range(ctx.distance, ctx.vertical, cfg) {
                EnemyState::Attack
            } else {
                EnemyState::Chase
            }
        }
        EnemyState::Jump { ticks_left: 0, .. } => EnemyState::Chase,
        jump @ EnemyState::Jump { .. } => jump,
    }
}

// ── Per-tick update ──────────────────────────────────────────────────────────

fn center_x(x: f32, width: f32) -> f32 {
    x + width / 2.0
}

fn face(enemy: &mut Enemy, dx: f32) {
    if dx < 0.0 {
        enemy.facing = Facing::Left;
    } else if dx > 0.0 {
        enemy.facing = Facing::Right;
    }
}

fn seat_on(enemy: &mut Enemy, platforms: &[Platform], index: usize) {
    if let Some(platform) = platforms.get(index) {
        enemy.body.y = platform.y - enemy.body.height;
        enemy.platform = Some(index);
    }
}

/// Drop the enemy onto the nearest surface in its column.
fn settle(enemy: &mut Enemy, platforms: &[Platform], tolerance: f32) {
    let bottom = enemy.body.y + enemy.body.height;
    match support_surface(platforms, enemy.body.x, enemy.body.width, bottom, tolerance) {
        Some(index) => seat_on(enemy, platforms, index),
        None => enemy.platform = None,
    }
}

/// Move the enemy for one tick according to its (already updated) state.
pub fn steer(
    enemy: &mut Enemy,
    player_center: f32,
    frame: u64,
    platforms: &[Platform],
    level_width: f32,
    tolerance: f32,
    cfg: &AiConfig,
) {
    let own_center = center_x(enemy.body.x, enemy.body.width);
    let dx = player_center - own_center;

    enemy.vx = match enemy.state {
        EnemyState::Idle => 0.0,
        EnemyState::Patrol => {
            let offset = enemy.body.x - enemy.anchor_x;
            if offset.abs() > enemy.patrol_range {
                -offset.signum() * cfg.patrol_speed
            } else {
                let phase =
                    frame as f32 * cfg.patrol_frequency + enemy.anchor_x * cfg.patrol_phase_scale;
                phase.sin() * cfg.patrol_speed
            }
        }
        EnemyState::Chase if dx.abs() > cfg.attack_range => dx.signum() * cfg.chase_speed,
        EnemyState::Chase | EnemyState::Attack => 0.0,
        EnemyState::Jump { target, .. } => {
            let toward = platforms
                .get(target)
                .map(|p| platform_center_x(p) - own_center)
                .unwrap_or(dx);
            let heading = if toward.abs() < f32::EPSILON {
                enemy.facing.sign()
            } else {
                toward.signum()
            };
            heading * cfg.jump_speed
        }
    };

    enemy.body.x += enemy.vx;
    clamp_to_level(&mut enemy.body, level_width);

    if enemy.state == EnemyState::Attack || enemy.vx == 0.0 {
        face(enemy, dx);
    } else {
        face(enemy, enemy.vx);
    }

    match enemy.state {
        EnemyState::Jump { ticks_left, target } => {
            let ticks_left = ticks_left.saturating_sub(1);
            enemy.state = EnemyState::Jump { ticks_left, target };
            if ticks_left == 0 {
                let lands_on_target = platforms
                    .get(target)
                    .is_some_and(|p| spans_overlap(enemy.body.x, enemy.body.width, p.x, p.width));
                if lands_on_target {
                    seat_on(enemy, platforms, target);
                } else {
                    settle(enemy, platforms, tolerance);
                }
            }
        }
        _ => settle(enemy, platforms, tolerance),
    }
}

/// Hit the player if in reach and off cooldown. Returns whether damage was dealt.
pub fn try_attack(enemy: &mut Enemy, player: &mut Player, cfg: &AiConfig) -> bool {
    if !enemy.alive || enemy.attack_cooldown > 0 {
        return false;
    }
    let (distance, vertical) = measure(enemy, player);
    if !in_attack_range(distance, vertical, cfg) {
        return false;
    }
    player.health = player.health.saturating_sub(cfg.attack_damage);
    enemy.attack_cooldown = cfg.attack_cooldown;
    debug!(health = player.health, "player hit");
    true
}

/// Horizontal center distance and vertical feet distance between enemy and player.
fn measure(enemy: &Enemy, player: &Player) -> (f32, f32) {
    let e = &enemy.body;
    let p = &player.body;
    let distance = (center_x(p.x, p.width) - center_x(e.x, e.width)).abs();
    let vertical = ((p.y + p.height) - (e.y + e.height)).abs();
    (distance, vertical)
}

pub fn context(
    enemy: &Enemy,
    player: &Player,
    platforms: &[Platform],
    patrol_roll: bool,
    cfg: &AiConfig,
) -> Context {
    let (distance, vertical) = measure(enemy, player);
    Context {
        distance,
        vertical,
        anchor_offset: (enemy.body.x - enemy.anchor_x).abs(),
        jump_target: jump_target(
            enemy.platform,
            center_x(enemy.body.x, enemy.body.width),
            player.platform,
            platforms,
            cfg,
        ),
        patrol_roll,
    }
}

/// Run every alive enemy for one tick, damaging the player where attacks land.
#[allow(clippy::too_many_arguments)]
pub fn update(
    enemies: &mut [Enemy],
    player: &mut Player,
    platforms: &[Platform],
    level_width: f32,
    frame: u64,
    tolerance: f32,
    cfg: &AiConfig,
    rng: &mut impl Rng,
) {
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        enemy.attack_cooldown = enemy.attack_cooldown.saturating_sub(1);

        let roll = matches!(enemy.state, EnemyState::Idle | EnemyState::Patrol)
            && rng.gen_bool(cfg.patrol_chance);
        let ctx = context(enemy, player, platforms, roll, cfg);
        let next = transition(enemy.state, &ctx, cfg);
        if next != enemy.state {
            debug!(from = ?enemy.state, to = ?next, x = enemy.body.x, "enemy state");
        }
        enemy.state = next;

        let player_center = center_x(player.body.x, player.body.width);
        steer(enemy, player_center, frame, platforms, level_width, tolerance, cfg);
        try_attack(enemy, player, cfg);
    }
}

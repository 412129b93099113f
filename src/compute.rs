//! Simulation driver.
//!
//! [`tick`] takes an immutable reference to the current `World` (plus input,
//! tuning and an RNG handle) and returns a brand-new `World`.  Inside a tick
//! each component receives `&mut` access to exactly the parts of the copy it
//! owns, in a fixed order.  Side effects are limited to the injected RNG and
//! log output.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::ai;
use crate::camera;
use crate::config::{Tuning, TICKS_PER_SECOND};
use crate::entities::{
    Body, Bullet, Crate, Enemy, EnemyState, Facing, Platform, Player, RunStatus, World,
};
use crate::input::{InputEdge, Keys};
use crate::level::LevelDescriptor;
use crate::physics::{self, body_rect, Rect};
use crate::weapon;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Index of the lowest platform under a column: the level's ground there.
fn ground_under(platforms: &[Platform], x: f32, width: f32) -> Option<usize> {
    platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| physics::spans_overlap(x, width, p.x, p.width))
        .max_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))
        .map(|(i, _)| i)
}

pub fn spawn_player(tuning: &Tuning) -> Player {
    let cfg = &tuning.player;
    Player {
        body: Body {
            x: cfg.spawn_x,
            y: cfg.spawn_y,
            vy: 0.0,
            width: cfg.width,
            height: cfg.height,
            grounded: false,
        },
        facing: Facing::Right,
        health: cfg.max_health,
        max_health: cfg.max_health,
        ammo: tuning.weapon.magazine_capacity,
        magazines: tuning.weapon.starting_magazines,
        reloading: false,
        reload_timer: 0,
        fire_cooldown: 0,
        platform: None,
    }
}

pub fn spawn_enemy(x: f32, platforms: &[Platform], tuning: &Tuning) -> Enemy {
    let cfg = &tuning.ai;
    let ground = ground_under(platforms, x, cfg.width);
    let y = ground
        .map(|i| platforms[i].y - cfg.height)
        .unwrap_or(tuning.view.viewport_height - cfg.height);
    Enemy {
        body: Body {
            x,
            y,
            vy: 0.0,
            width: cfg.width,
            height: cfg.height,
            grounded: ground.is_some(),
        },
        vx: 0.0,
        facing: Facing::Left,
        health: cfg.health,
        max_health: cfg.health,
        alive: true,
        state: EnemyState::Idle,
        anchor_x: x,
        patrol_range: cfg.patrol_range,
        attack_cooldown: 0,
        platform: ground,
    }
}

pub fn spawn_crate(x: f32, platforms: &[Platform], tuning: &Tuning) -> Crate {
    let cfg = &tuning.crates;
    let y = ground_under(platforms, x, cfg.width)
        .map(|i| platforms[i].y - cfg.height)
        .unwrap_or(tuning.view.viewport_height - cfg.height);
    Crate {
        x,
        y,
        width: cfg.width,
        height: cfg.height,
        taken: false,
    }
}

/// Instantiate a fresh world from a level template.  Also used to restart.
pub fn load_level(template: &LevelDescriptor, index: usize, tuning: &Tuning) -> World {
    let level = template.clone();
    let enemies = level
        .enemy_spawns
        .iter()
        .map(|&x| spawn_enemy(x, &level.platforms, tuning))
        .collect();
    let crates = level
        .crate_positions
        .iter()
        .map(|&x| spawn_crate(x, &level.platforms, tuning))
        .collect();
    let player = spawn_player(tuning);
    let camera = camera::follow(
        player.body.x,
        tuning.view.follow_offset,
        level.width,
        tuning.view.viewport_width,
    );
    info!(level = %level.name, index, "level loaded");

    World {
        level_index: index,
        level,
        player,
        enemies,
        crates,
        bullets: Vec::new(),
        camera,
        kills: 0,
        status: RunStatus::Playing,
        frame: 0,
    }
}

/// Move on from a completed level.  Health and ammunition carry over; the
/// run is `Won` once there is no further level.
pub fn advance_level(world: &World, levels: &[LevelDescriptor], tuning: &Tuning) -> World {
    let next = world.level_index + 1;
    let Some(template) = levels.get(next) else {
        info!(kills = world.kills, "final level cleared");
        return World {
            status: RunStatus::Won,
            ..world.clone()
        };
    };

    let mut fresh = load_level(template, next, tuning);
    let carried = &world.player;
    fresh.player.health = carried.health;
    fresh.player.ammo = carried.ammo;
    fresh.player.magazines = carried.magazines;
    fresh.kills = world.kills;
    fresh
}

// ── Pickups ──────────────────────────────────────────────────────────────────

/// Take the first untaken crate within reach. Returns whether one was taken.
pub fn pickup_crate(world: &mut World, tuning: &Tuning) -> bool {
    let cfg = &tuning.crates;
    let body = &world.player.body;
    let reach = Rect {
        x: body.x - cfg.reach,
        y: body.y,
        w: body.width + 2.0 * cfg.reach,
        h: body.height,
    };
    let Some(found) = world.crates.iter_mut().find(|c| {
        !c.taken
            && reach.intersects(&Rect {
                x: c.x,
                y: c.y,
                w: c.width,
                h: c.height,
            })
    }) else {
        return false;
    };
    found.taken = true;

    let player = &mut world.player;
    player.magazines = (player.magazines + cfg.magazines).min(tuning.weapon.max_magazines);
    player.health = (player.health + cfg.heal).min(player.max_health);
    debug!(
        magazines = player.magazines,
        health = player.health,
        "crate taken"
    );
    true
}

// ── Per-tick update ──────────────────────────────────────────────────────────

fn reached_exit(world: &World, tuning: &Tuning) -> bool {
    let body = &world.player.body;
    body.x + body.width >= world.level.width - tuning.view.exit_margin
}

/// Advance the simulation by one tick.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(world: &World, input: &InputEdge, tuning: &Tuning, rng: &mut impl Rng) -> World {
    if world.status != RunStatus::Playing {
        return world.clone();
    }
    let mut next = world.clone();
    next.frame += 1;

    // ── 1-2. Player movement and landing ─────────────────────────────────────
    physics::step_player(
        &mut next.player,
        input.direction(),
        input.pressed(Keys::JUMP),
        &next.level.platforms,
        next.level.width,
        &tuning.physics,
    );

    // ── 3. Weapon, reload and crates ─────────────────────────────────────────
    weapon::update(
        &mut next.player,
        &mut next.bullets,
        input.pressed(Keys::FIRE),
        input.just_pressed(Keys::RELOAD),
        &tuning.weapon,
    );
    if input.just_pressed(Keys::INTERACT) {
        pickup_crate(&mut next, tuning);
    }

    // ── 4. Bullets ───────────────────────────────────────────────────────────
    next.kills += weapon::advance_bullets(
        &mut next.bullets,
        &mut next.enemies,
        next.camera,
        tuning.view.viewport_width,
        &tuning.weapon,
    );

    // ── 5. Enemies ───────────────────────────────────────────────────────────
    ai::update(
        &mut next.enemies,
        &mut next.player,
        &next.level.platforms,
        next.level.width,
        next.frame,
        tuning.physics.landing_tolerance,
        &tuning.ai,
        rng,
    );

    // ── 6. Death and exit ────────────────────────────────────────────────────
    if physics::fell_out(&next.player.body, &tuning.physics) {
        next.player.health = 0;
    }
    if next.player.health == 0 {
        next.status = RunStatus::Ended;
        info!(frame = next.frame, kills = next.kills, "player died");
    } else if reached_exit(&next, tuning) {
        next.status = RunStatus::LevelComplete;
        info!(level = %next.level.name, "level complete");
    }

    // ── 7. Camera ────────────────────────────────────────────────────────────
    next.camera = camera::follow(
        next.player.body.x,
        tuning.view.follow_offset,
        next.level.width,
        tuning.view.viewport_width,
    );

    next
}

// ── Fixed-rate stepping ──────────────────────────────────────────────────────

/// Turns elapsed wall-clock time into whole logical ticks so timers keep
/// their meaning regardless of how often frames are drawn.
#[derive(Clone, Debug)]
pub struct FixedStep {
    step: Duration,
    accumulator: Duration,
    max_steps: u32,
}

impl FixedStep {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / ticks_per_second.max(1),
            accumulator: Duration::ZERO,
            max_steps: 5,
        }
    }

    /// Cap on ticks run for one frame; any backlog beyond it is dropped.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Number of ticks to run for a frame that took `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            self.accumulator = Duration::ZERO;
        }
        steps
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND)
    }
}

// ── Rendering boundary ───────────────────────────────────────────────────────

/// Read-only view of one tick's result for the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub level_name: &'a str,
    pub level_width: f32,
    pub platforms: &'a [Platform],
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub crates: &'a [Crate],
    pub camera: f32,
    pub kills: u32,
    pub status: RunStatus,
}

impl<'a> Snapshot<'a> {
    /// Dead enemies are kept in the world but never drawn.
    pub fn alive_enemies(&self) -> impl Iterator<Item = &'a Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn remaining_crates(&self) -> impl Iterator<Item = &'a Crate> {
        self.crates.iter().filter(|c| !c.taken)
    }

    pub fn player_rect(&self) -> Rect {
        body_rect(&self.player.body)
    }
}

pub fn snapshot(world: &World) -> Snapshot<'_> {
    Snapshot {
        level_name: &world.level.name,
        level_width: world.level.width,
        platforms: &world.level.platforms,
        player: &world.player,
        enemies: &world.enemies,
        bullets: &world.bullets,
        crates: &world.crates,
        camera: world.camera,
        kills: world.kills,
        status: world.status,
    }
}

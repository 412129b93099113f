//! All game entity types: plain data, no logic.

use serde::Deserialize;

use crate::level::LevelDescriptor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Playing,
    /// The player reached the exit of the current level.
    LevelComplete,
    /// The last level of the catalogue was completed.
    Won,
    /// Terminal state: the player's health reached zero.
    Ended,
}

// ── Level geometry ────────────────────────────────────────────────────────────

/// Static axis-aligned platform. `y` is the top surface; world y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "w")]
    pub width: f32,
    #[serde(alias = "h")]
    pub height: f32,
}

// ── Actors ────────────────────────────────────────────────────────────────────

/// Position, extent and vertical motion shared by everything that stands on platforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub grounded: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    pub health: u32,
    pub max_health: u32,
    /// Rounds in the magazine, always within `0..=magazine_capacity`.
    pub ammo: u32,
    /// Spare magazines; only a reload moves them into `ammo`.
    pub magazines: u32,
    pub reloading: bool,
    pub reload_timer: u32,
    pub fire_cooldown: u32,
    /// Index of the platform the player last landed on, while grounded.
    pub platform: Option<usize>,
}

/// Movement state of an enemy. Attack damage is applied independently of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyState {
    Idle,
    Patrol,
    Chase,
    /// Dashing toward `target` platform for `ticks_left` more ticks.
    Jump { ticks_left: u32, target: usize },
    /// Holding position inside attack range.
    Attack,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    pub vx: f32,
    pub facing: Facing,
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
    pub state: EnemyState,
    pub anchor_x: f32,
    pub patrol_range: f32,
    pub attack_cooldown: u32,
    pub platform: Option<usize>,
}

// ── Pickups & projectiles ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Crate {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// One-way: set by the single pickup event, never cleared within a level.
    pub taken: bool,
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    /// Signed horizontal speed in world units per tick.
    pub vx: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation state for one run of one level.  Cloneable so the
/// driver can hand back a fresh copy each tick without touching the input.
#[derive(Clone, Debug)]
pub struct World {
    pub level_index: usize,
    pub level: LevelDescriptor,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub crates: Vec<Crate>,
    pub bullets: Vec<Bullet>,
    /// Horizontal scroll offset, a pure projection of the player position.
    pub camera: f32,
    pub kills: u32,
    pub status: RunStatus,
    pub frame: u64,
}

//! Tuning constants, grouped per component and injected into every update.
//!
//! Defaults reproduce the shipped game at 60 ticks per second. A RON file may
//! override any subset of fields:
//!
//! ```ron
//! (
//!     weapon: (fire_rate: 20),
//!     ai: (aggro_range: 300.0),
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Logical simulation rate. Every timer below is counted in ticks of this rate.
pub const TICKS_PER_SECOND: u32 = 60;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub weapon: WeaponConfig,
    pub crates: CrateConfig,
    pub ai: AiConfig,
    pub view: ViewConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to vertical velocity every tick.
    pub gravity: f32,
    /// Horizontal delta per tick while a direction is held.
    pub player_speed: f32,
    /// Vertical velocity set by a jump; negative is up.
    pub jump_impulse: f32,
    /// How far below a platform top an actor's feet may be and still land on it.
    pub landing_tolerance: f32,
    /// Actors whose top edge passes this y have fallen out of the level.
    pub kill_plane_y: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.9,
            player_speed: 4.6,
            jump_impulse: -15.0,
            landing_tolerance: 12.0,
            kill_plane_y: 900.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    pub max_health: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_x: 120.0,
            spawn_y: 360.0,
            width: 28.0,
            height: 54.0,
            max_health: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub magazine_capacity: u32,
    pub starting_magazines: u32,
    pub max_magazines: u32,
    /// Ticks between two shots.
    pub fire_rate: u32,
    pub reload_ticks: u32,
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    /// Muzzle height measured down from the top of the player.
    pub muzzle_y: f32,
    /// Bullets further than this outside the viewport are dropped.
    pub cull_margin: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            magazine_capacity: 15,
            starting_magazines: 7,
            max_magazines: 12,
            fire_rate: 28,
            reload_ticks: 4 * TICKS_PER_SECOND,
            bullet_speed: 12.0,
            bullet_width: 10.0,
            bullet_height: 4.0,
            muzzle_y: 20.0,
            cull_margin: 200.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CrateConfig {
    pub width: f32,
    pub height: f32,
    pub magazines: u32,
    pub heal: u32,
    /// Extra horizontal slack when checking whether the player can reach a crate.
    pub reach: f32,
}

impl Default for CrateConfig {
    fn default() -> Self {
        Self {
            width: 32.0,
            height: 32.0,
            magazines: 2,
            heal: 3,
            reach: 12.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub width: f32,
    pub height: f32,
    pub health: u32,
    /// Horizontal distance under which an idle or patrolling enemy starts chasing.
    pub aggro_range: f32,
    /// Horizontal distance over which a chasing enemy gives up.
    pub disengage_range: f32,
    pub attack_range: f32,
    /// Maximum vertical gap for an attack to connect, so enemies cannot hit through floors.
    pub attack_vertical: f32,
    pub attack_damage: u32,
    pub attack_cooldown: u32,
    /// Per-tick probability of an idle enemy starting to patrol (and back).
    pub patrol_chance: f64,
    pub patrol_range: f32,
    pub patrol_speed: f32,
    /// Angular speed of the patrol sway, in radians per tick.
    pub patrol_frequency: f32,
    /// Sway phase offset per world unit of anchor position, so neighbours sway out of step.
    pub patrol_phase_scale: f32,
    pub chase_speed: f32,
    /// Horizontal distance to the player under which a chasing enemy tries a jump.
    pub jump_trigger_distance: f32,
    /// Maximum distance between platform centers for a jump to be possible.
    pub jump_max_dx: f32,
    /// Maximum height a jump can climb; dropping down is unlimited.
    pub jump_max_rise: f32,
    pub jump_speed: f32,
    pub jump_ticks: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 50.0,
            health: 3,
            aggro_range: 220.0,
            disengage_range: 700.0,
            attack_range: 36.0,
            attack_vertical: 40.0,
            attack_damage: 1,
            attack_cooldown: TICKS_PER_SECOND,
            patrol_chance: 0.005,
            patrol_range: 120.0,
            patrol_speed: 1.2,
            patrol_frequency: 0.03,
            patrol_phase_scale: 0.01,
            chase_speed: 2.2,
            jump_trigger_distance: 140.0,
            jump_max_dx: 260.0,
            jump_max_rise: 170.0,
            jump_speed: 5.0,
            jump_ticks: 36,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Distance from the left edge of the view at which the player is held.
    pub follow_offset: f32,
    /// Reaching within this distance of the level's right edge completes the level.
    pub exit_margin: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            viewport_width: 960.0,
            viewport_height: 540.0,
            follow_offset: 480.0,
            exit_margin: 40.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning file from RON text.
    pub fn from_ron(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = ron::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weapon.magazine_capacity == 0 {
            return Err(ConfigError::invalid("weapon.magazine_capacity", "must be at least 1"));
        }
        if self.weapon.starting_magazines > self.weapon.max_magazines {
            return Err(ConfigError::invalid(
                "weapon.starting_magazines",
                format!("exceeds max_magazines ({})", self.weapon.max_magazines),
            ));
        }
        if self.weapon.reload_ticks == 0 {
            return Err(ConfigError::invalid("weapon.reload_ticks", "must be at least 1"));
        }
        if self.player.max_health == 0 {
            return Err(ConfigError::invalid("player.max_health", "must be at least 1"));
        }
        if self.player.width <= 0.0 || self.player.height <= 0.0 {
            return Err(ConfigError::invalid("player", "dimensions must be positive"));
        }
        if self.ai.health == 0 {
            return Err(ConfigError::invalid("ai.health", "must be at least 1"));
        }
        if self.ai.disengage_range <= self.ai.aggro_range {
            return Err(ConfigError::invalid(
                "ai.disengage_range",
                format!("must exceed aggro_range ({})", self.ai.aggro_range),
            ));
        }
        if !(0.0..=1.0).contains(&self.ai.patrol_chance) {
            return Err(ConfigError::invalid("ai.patrol_chance", "must be a probability"));
        }
        if self.view.viewport_width <= 0.0 || self.view.viewport_height <= 0.0 {
            return Err(ConfigError::invalid("view", "viewport must be positive"));
        }
        if self.physics.landing_tolerance < 0.0 {
            return Err(ConfigError::invalid("physics.landing_tolerance", "must not be negative"));
        }
        Ok(())
    }
}

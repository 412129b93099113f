//! Level templates.  A level is static data: the simulation clones a
//! descriptor at load time and never writes to it afterwards.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::entities::Platform;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    pub width: f32,
    pub platforms: Vec<Platform>,
    pub enemy_spawns: Vec<f32>,
    pub crate_positions: Vec<f32>,
}

const fn plat(x: f32, y: f32, width: f32, height: f32) -> Platform {
    Platform { x, y, width, height }
}

/// The levels shipped with the game, in play order.
pub fn catalogue() -> Vec<LevelDescriptor> {
    vec![
        LevelDescriptor {
            name: "Badlands Outskirts".to_string(),
            width: 4000.0,
            platforms: vec![
                plat(0.0, 480.0, 4000.0, 20.0),
                plat(150.0, 360.0, 140.0, 16.0),
                plat(350.0, 280.0, 160.0, 16.0),
                plat(600.0, 360.0, 200.0, 16.0),
                plat(900.0, 320.0, 140.0, 16.0),
                plat(1200.0, 420.0, 180.0, 16.0),
                plat(1600.0, 300.0, 200.0, 16.0),
                plat(1900.0, 380.0, 160.0, 16.0),
                plat(2300.0, 320.0, 220.0, 16.0),
                plat(2700.0, 360.0, 200.0, 16.0),
                plat(3100.0, 300.0, 250.0, 16.0),
                plat(3500.0, 360.0, 400.0, 16.0),
            ],
            enemy_spawns: vec![800.0, 1400.0, 1800.0, 2200.0, 2600.0, 3000.0, 3400.0],
            crate_positions: vec![500.0, 1700.0, 2800.0, 3600.0],
        },
        LevelDescriptor {
            name: "Industrial Ruins".to_string(),
            width: 4500.0,
            platforms: vec![
                plat(0.0, 480.0, 4500.0, 20.0),
                plat(200.0, 380.0, 160.0, 16.0),
                plat(420.0, 300.0, 140.0, 16.0),
                plat(650.0, 380.0, 220.0, 16.0),
                plat(950.0, 330.0, 160.0, 16.0),
                plat(1180.0, 250.0, 140.0, 16.0),
                plat(1450.0, 360.0, 240.0, 16.0),
                plat(1800.0, 300.0, 180.0, 16.0),
                plat(2100.0, 400.0, 200.0, 16.0),
                plat(2400.0, 320.0, 160.0, 16.0),
                plat(2650.0, 250.0, 180.0, 16.0),
                plat(2950.0, 360.0, 220.0, 16.0),
                plat(3300.0, 300.0, 200.0, 16.0),
                plat(3650.0, 380.0, 260.0, 16.0),
                plat(4000.0, 320.0, 300.0, 16.0),
            ],
            enemy_spawns: vec![
                700.0, 1100.0, 1500.0, 1900.0, 2300.0, 2700.0, 3100.0, 3500.0, 3900.0,
            ],
            crate_positions: vec![450.0, 1500.0, 2650.0, 3700.0],
        },
        LevelDescriptor {
            name: "Scorched Mesa".to_string(),
            width: 5000.0,
            platforms: vec![
                plat(0.0, 480.0, 5000.0, 20.0),
                plat(180.0, 390.0, 150.0, 16.0),
                plat(400.0, 310.0, 150.0, 16.0),
                plat(620.0, 230.0, 140.0, 16.0),
                plat(850.0, 330.0, 200.0, 16.0),
                plat(1150.0, 410.0, 160.0, 16.0),
                plat(1380.0, 320.0, 180.0, 16.0),
                plat(1650.0, 240.0, 160.0, 16.0),
                plat(1900.0, 340.0, 220.0, 16.0),
                plat(2250.0, 280.0, 180.0, 16.0),
                plat(2550.0, 380.0, 240.0, 16.0),
                plat(2900.0, 300.0, 160.0, 16.0),
                plat(3150.0, 220.0, 180.0, 16.0),
                plat(3450.0, 330.0, 220.0, 16.0),
                plat(3800.0, 400.0, 200.0, 16.0),
                plat(4100.0, 310.0, 240.0, 16.0),
                plat(4450.0, 360.0, 400.0, 16.0),
            ],
            enemy_spawns: vec![
                650.0, 1000.0, 1350.0, 1700.0, 2050.0, 2400.0, 2750.0, 3100.0, 3450.0, 3800.0,
                4200.0,
            ],
            crate_positions: vec![420.0, 1400.0, 2560.0, 3460.0, 4460.0],
        },
    ]
}

/// Parse a custom level pack: a RON list of descriptors.
pub fn levels_from_ron(text: &str, origin: &str) -> Result<Vec<LevelDescriptor>, ConfigError> {
    let levels: Vec<LevelDescriptor> = ron::from_str(text).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    if levels.is_empty() {
        return Err(ConfigError::invalid("levels", "pack contains no levels"));
    }
    for level in &levels {
        validate(level)?;
    }
    Ok(levels)
}

pub fn load_levels(path: &Path) -> Result<Vec<LevelDescriptor>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    levels_from_ron(&text, &path.display().to_string())
}

pub fn validate(level: &LevelDescriptor) -> Result<(), ConfigError> {
    if level.width <= 0.0 {
        return Err(ConfigError::invalid(
            "level.width",
            format!("{}: must be positive", level.name),
        ));
    }
    if level.platforms.is_empty() {
        return Err(ConfigError::invalid(
            "level.platforms",
            format!("{}: needs at least one platform", level.name),
        ));
    }
    if let Some(p) = level
        .platforms
        .iter()
        .find(|p| p.width <= 0.0 || p.height <= 0.0)
    {
        return Err(ConfigError::invalid(
            "level.platforms",
            format!("{}: degenerate platform at x={}", level.name, p.x),
        ));
    }
    let inside = |x: &f32| (0.0..=level.width).contains(x);
    if let Some(x) = level
        .enemy_spawns
        .iter()
        .chain(&level.crate_positions)
        .copied()
        .find(|x| !inside(x))
    {
        return Err(ConfigError::invalid(
            "level.spawns",
            format!("{}: x={} lies outside the level", level.name, x),
        ));
    }
    Ok(())
}

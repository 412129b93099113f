use badlands::config::*;
use badlands::error::ConfigError;
use badlands::level::*;

#[test]
fn defaults_reproduce_shipped_game() {
    let t = Tuning::default();
    assert_eq!(t.physics.gravity, 0.9);
    assert_eq!(t.physics.player_speed, 4.6);
    assert_eq!(t.physics.jump_impulse, -15.0);
    assert_eq!(t.weapon.magazine_capacity, 15);
    assert_eq!(t.weapon.starting_magazines, 7);
    assert_eq!(t.weapon.fire_rate, 28);
    assert_eq!(t.weapon.reload_ticks, 240);
    assert_eq!(t.weapon.bullet_speed, 12.0);
    assert_eq!(t.player.max_health, 10);
    assert_eq!(t.ai.health, 3);
    assert_eq!(t.view.viewport_width, 960.0);
    assert!(t.validate().is_ok());
}

#[test]
fn partial_ron_overrides_only_named_fields() {
    let text = "(weapon: (fire_rate: 20), ai: (aggro_range: 300.0))";
    let t = Tuning::from_ron(text, "inline").unwrap();
    assert_eq!(t.weapon.fire_rate, 20);
    assert_eq!(t.weapon.magazine_capacity, 15);
    assert_eq!(t.ai.aggro_range, 300.0);
    assert_eq!(t.ai.disengage_range, 700.0);
    assert_eq!(t.physics.gravity, 0.9);
}

#[test]
fn patrol_waveform_is_tunable() {
    let t = Tuning::from_ron("(ai: (patrol_frequency: 0.05, patrol_phase_scale: 0.0))", "inline").unwrap();
    assert_eq!(t.ai.patrol_frequency, 0.05);
    assert_eq!(t.ai.patrol_phase_scale, 0.0);
    assert_eq!(Tuning::default().ai.patrol_frequency, 0.03);
}

#[test]
fn empty_ron_gives_defaults() {
    let t = Tuning::from_ron("()", "inline").unwrap();
    assert_eq!(t.weapon.reload_ticks, 240);
}

#[test]
fn zero_capacity_is_rejected() {
    let err = Tuning::from_ron("(weapon: (magazine_capacity: 0))", "inline").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid { field: "weapon.magazine_capacity", .. }
    ));
}

#[test]
fn disengage_must_exceed_aggro() {
    let err = Tuning::from_ron("(ai: (aggro_range: 800.0))", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "ai.disengage_range", .. }));
}

#[test]
fn patrol_chance_must_be_probability() {
    let err = Tuning::from_ron("(ai: (patrol_chance: 1.5))", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "ai.patrol_chance", .. }));
}

#[test]
fn malformed_ron_reports_origin() {
    let err = Tuning::from_ron("(weapon: (fire_rate: ", "tuning.ron").unwrap_err();
    match err {
        ConfigError::Parse { ref origin, .. } => assert_eq!(origin, "tuning.ron"),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(err.to_string().starts_with("failed to parse tuning.ron"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Tuning::load(std::path::Path::new("/nonexistent/badlands.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

// ── Levels ────────────────────────────────────────────────────────────────────

#[test]
fn catalogue_levels_are_valid() {
    let levels = catalogue();
    assert_eq!(levels.len(), 3);
    for level in &levels {
        validate(level).unwrap();
        let ground = level.platforms[0];
        assert_eq!(ground.x, 0.0);
        assert_eq!(ground.width, level.width);
    }
    assert_eq!(levels[0].name, "Badlands Outskirts");
    assert_eq!(levels[0].width, 4000.0);
}

#[test]
fn level_pack_parses_with_short_platform_fields() {
    let text = r#"[
        (
            name: "Test Yard",
            width: 1200.0,
            platforms: [
                (x: 0.0, y: 480.0, w: 1200.0, h: 20.0),
                (x: 300.0, y: 360.0, width: 120.0, height: 16.0),
            ],
            enemy_spawns: [600.0],
            crate_positions: [200.0],
        ),
    ]"#;
    let levels = levels_from_ron(text, "pack.ron").unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].platforms[0].width, 1200.0);
    assert_eq!(levels[0].platforms[1].height, 16.0);
}

#[test]
fn empty_level_pack_is_rejected() {
    let err = levels_from_ron("[]", "pack.ron").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "levels", .. }));
}

#[test]
fn spawn_outside_level_is_rejected() {
    let mut level = catalogue().remove(0);
    level.enemy_spawns.push(level.width + 50.0);
    let err = validate(&level).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "level.spawns", .. }));
}

#[test]
fn degenerate_platform_is_rejected() {
    let mut level = catalogue().remove(1);
    level.platforms[3].width = 0.0;
    let err = validate(&level).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "level.platforms", .. }));
}

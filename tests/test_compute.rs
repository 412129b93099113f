use std::time::Duration;

use badlands::compute::*;
use badlands::config::Tuning;
use badlands::entities::*;
use badlands::input::{InputEdge, Keys};
use badlands::level::{catalogue, LevelDescriptor};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> InputEdge {
    InputEdge::default()
}

fn tap(key: Keys) -> InputEdge {
    InputEdge::new(Keys::empty(), key)
}

fn hold(key: Keys) -> InputEdge {
    InputEdge::new(key, key)
}

fn first_level() -> World {
    load_level(&catalogue()[0], 0, &Tuning::default())
}

/// First level with the player standing on the ground at `x`.
fn standing_at(x: f32) -> World {
    let mut w = first_level();
    w.player.body.x = x;
    w.player.body.y = 480.0 - w.player.body.height;
    w.player.body.vy = 0.0;
    w.player.body.grounded = true;
    w.player.platform = Some(0);
    w
}

// ── load_level ────────────────────────────────────────────────────────────────

#[test]
fn load_level_spawns_everything_from_the_template() {
    let w = first_level();
    assert_eq!(w.level_index, 0);
    assert_eq!(w.level.name, "Badlands Outskirts");
    assert_eq!(w.enemies.len(), 7);
    assert_eq!(w.crates.len(), 4);
    assert!(w.bullets.is_empty());
    assert_eq!(w.kills, 0);
    assert_eq!(w.frame, 0);
    assert_eq!(w.camera, 0.0);
    assert_eq!(w.status, RunStatus::Playing);

    assert_eq!((w.player.body.x, w.player.body.y), (120.0, 360.0));
    assert_eq!(w.player.health, 10);
    assert_eq!(w.player.ammo, 15);
    assert_eq!(w.player.magazines, 7);
}

#[test]
fn enemies_and_crates_start_on_the_ground() {
    let w = first_level();
    for e in &w.enemies {
        assert_eq!(e.body.y + e.body.height, 480.0);
        assert_eq!(e.state, EnemyState::Idle);
        assert_eq!(e.health, 3);
        assert!(e.alive);
        assert_eq!(e.anchor_x, e.body.x);
        assert_eq!(e.platform, Some(0));
    }
    for c in &w.crates {
        assert_eq!(c.y + c.height, 480.0);
        assert!(!c.taken);
    }
}

// ── tick basics ───────────────────────────────────────────────────────────────

#[test]
fn tick_leaves_the_input_world_untouched() {
    let w = first_level();
    let next = tick(&w, &hold(Keys::RIGHT | Keys::FIRE), &Tuning::default(), &mut seeded_rng());
    assert_eq!(w.frame, 0);
    assert_eq!(w.player.body.x, 120.0);
    assert_eq!(w.player.ammo, 15);
    assert!(w.bullets.is_empty());

    assert_eq!(next.frame, 1);
    assert!(next.player.body.x > 120.0);
    assert_eq!(next.player.ammo, 14);
    assert_eq!(next.bullets.len(), 1);
}

#[test]
fn player_falls_onto_the_ground_and_rests() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let mut w = first_level();
    for _ in 0..30 {
        w = tick(&w, &idle(), &tuning, &mut rng);
    }
    assert_eq!(w.player.body.y, 426.0);
    assert!(w.player.body.grounded);
    assert_eq!(w.player.platform, Some(0));
}

#[test]
fn reload_starts_on_key_down() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let mut w = standing_at(200.0);
    w.player.ammo = 5;

    w = tick(&w, &tap(Keys::RELOAD), &tuning, &mut rng);
    assert!(w.player.reloading);
    for _ in 0..tuning.weapon.reload_ticks {
        w = tick(&w, &hold(Keys::RELOAD), &tuning, &mut rng);
    }
    assert!(!w.player.reloading);
    assert_eq!(w.player.ammo, 15);
    assert_eq!(w.player.magazines, 6);
}

// ── Crates ────────────────────────────────────────────────────────────────────

#[test]
fn crate_pickup_needs_a_fresh_key_press() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let mut w = standing_at(470.0); // crate 0 sits at x=500
    w.player.magazines = 5;
    w.player.health = 6;

    w = tick(&w, &hold(Keys::INTERACT), &tuning, &mut rng);
    assert!(!w.crates[0].taken);
    assert_eq!(w.player.magazines, 5);

    w = tick(&w, &tap(Keys::INTERACT), &tuning, &mut rng);
    assert!(w.crates[0].taken);
    assert_eq!(w.player.magazines, 7);
    assert_eq!(w.player.health, 9);
}

#[test]
fn crate_rewards_are_capped() {
    let tuning = Tuning::default();
    let mut w = standing_at(470.0);
    w.player.magazines = 11;
    w.player.health = 9;

    assert!(pickup_crate(&mut w, &tuning));
    assert_eq!(w.player.magazines, tuning.weapon.max_magazines);
    assert_eq!(w.player.health, w.player.max_health);

    // the same crate cannot be taken twice
    assert!(!pickup_crate(&mut w, &tuning));
}

#[test]
fn crate_out_of_reach_is_ignored() {
    let tuning = Tuning::default();
    let mut w = standing_at(300.0);
    assert!(!pickup_crate(&mut w, &tuning));
    assert!(w.crates.iter().all(|c| !c.taken));
}

// ── Combat & death ────────────────────────────────────────────────────────────

#[test]
fn killing_an_enemy_counts_once() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let mut w = first_level();
    let mut enemy = spawn_enemy(700.0, &w.level.platforms, &tuning);
    enemy.health = 1;
    w.enemies = vec![enemy];
    w.bullets.push(Bullet {
        x: 680.0,
        y: w.enemies[0].body.y + 10.0,
        vx: 12.0,
    });

    w = tick(&w, &idle(), &tuning, &mut rng);
    assert_eq!(w.kills, 1);
    assert!(!w.enemies[0].alive);
    assert!(w.bullets.is_empty());

    w = tick(&w, &idle(), &tuning, &mut rng);
    assert_eq!(w.kills, 1);
}

#[test]
fn enemy_attack_ends_the_run() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let mut w = standing_at(780.0); // next to the enemy spawned at x=800
    w.player.health = 1;

    w = tick(&w, &idle(), &tuning, &mut rng);
    assert_eq!(w.player.health, 0);
    assert_eq!(w.status, RunStatus::Ended);

    let frozen = tick(&w, &hold(Keys::RIGHT | Keys::FIRE), &tuning, &mut rng);
    assert_eq!(frozen.frame, w.frame);
    assert_eq!(frozen.status, RunStatus::Ended);
    assert_eq!(frozen.player.body, w.player.body);
    assert_eq!(frozen.player.ammo, w.player.ammo);
    assert_eq!(frozen.bullets.len(), w.bullets.len());
}

#[test]
fn falling_out_of_the_level_is_fatal() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let level = LevelDescriptor {
        name: "Gap".to_string(),
        width: 2000.0,
        platforms: vec![Platform { x: 0.0, y: 480.0, width: 300.0, height: 20.0 }],
        enemy_spawns: Vec::new(),
        crate_positions: Vec::new(),
    };
    let mut w = load_level(&level, 0, &tuning);
    w.player.body.x = 600.0;
    w.player.body.y = 426.0;

    for _ in 0..120 {
        if w.status != RunStatus::Playing {
            break;
        }
        w = tick(&w, &idle(), &tuning, &mut rng);
    }
    assert_eq!(w.status, RunStatus::Ended);
    assert_eq!(w.player.health, 0);
}

// ── Level progression ─────────────────────────────────────────────────────────

#[test]
fn reaching_the_right_edge_completes_the_level() {
    let tuning = Tuning::default();
    let mut rng = seeded_rng();
    let mut w = standing_at(3930.0);
    w = tick(&w, &hold(Keys::RIGHT), &tuning, &mut rng);
    assert_eq!(w.status, RunStatus::LevelComplete);

    // no further simulation until the level is advanced
    let again = tick(&w, &hold(Keys::RIGHT), &tuning, &mut rng);
    assert_eq!(again.frame, w.frame);
}

#[test]
fn advancing_carries_health_ammo_and_kills() {
    let tuning = Tuning::default();
    let levels = catalogue();
    let mut w = standing_at(3930.0);
    w.player.health = 4;
    w.player.ammo = 3;
    w.player.magazines = 2;
    w.kills = 5;
    w.status = RunStatus::LevelComplete;

    let next = advance_level(&w, &levels, &tuning);
    assert_eq!(next.level_index, 1);
    assert_eq!(next.level.name, "Industrial Ruins");
    assert_eq!(next.status, RunStatus::Playing);
    assert_eq!(next.player.body.x, 120.0);
    assert_eq!(next.player.health, 4);
    assert_eq!(next.player.ammo, 3);
    assert_eq!(next.player.magazines, 2);
    assert_eq!(next.kills, 5);
    assert_eq!(next.enemies.len(), levels[1].enemy_spawns.len());
}

#[test]
fn clearing_the_last_level_wins_the_run() {
    let tuning = Tuning::default();
    let levels = catalogue();
    let mut w = load_level(&levels[2], 2, &tuning);
    w.status = RunStatus::LevelComplete;
    w.kills = 12;

    let done = advance_level(&w, &levels, &tuning);
    assert_eq!(done.status, RunStatus::Won);
    assert_eq!(done.level_index, 2);
    assert_eq!(done.kills, 12);
}

// ── Invariants under random play ──────────────────────────────────────────────

#[test]
fn random_play_keeps_world_consistent() {
    let tuning = Tuning::default();
    let mut input_rng = StdRng::seed_from_u64(2024);
    let mut sim_rng = seeded_rng();
    let mut w = first_level();
    let mut edge = InputEdge::default();
    let keys = [Keys::LEFT, Keys::RIGHT, Keys::JUMP, Keys::FIRE, Keys::RELOAD, Keys::INTERACT];
    let mut taken_before = 0;

    for _ in 0..3000 {
        if w.status != RunStatus::Playing {
            break;
        }
        let mut held = Keys::empty();
        for key in keys {
            // bias toward running right so the camera gets exercised
            let chance = if key == Keys::RIGHT { 0.6 } else { 0.2 };
            if input_rng.gen_bool(chance) {
                held |= key;
            }
        }
        edge.advance(held);
        let kills_before = w.kills;
        w = tick(&w, &edge, &tuning, &mut sim_rng);

        let max_camera = w.level.width - tuning.view.viewport_width;
        assert!((0.0..=max_camera).contains(&w.camera));

        let p = &w.player;
        assert!(p.body.x >= 0.0 && p.body.x + p.body.width <= w.level.width);
        assert!(p.ammo <= tuning.weapon.magazine_capacity);
        assert!(p.magazines <= tuning.weapon.max_magazines);
        assert!(p.health <= p.max_health);

        for e in &w.enemies {
            assert!(e.body.x >= 0.0 && e.body.x + e.body.width <= w.level.width);
            assert_eq!(e.alive, e.health > 0);
        }

        let dead = w.enemies.iter().filter(|e| !e.alive).count() as u32;
        assert_eq!(w.kills, dead);
        assert!(w.kills >= kills_before);

        let taken = w.crates.iter().filter(|c| c.taken).count();
        assert!(taken >= taken_before);
        taken_before = taken;
    }
}

// ── FixedStep ─────────────────────────────────────────────────────────────────

#[test]
fn fixed_step_converts_elapsed_time_to_ticks() {
    let mut clock = FixedStep::default();
    assert_eq!(clock.advance(Duration::from_millis(50)), 3);
}

#[test]
fn fixed_step_accumulates_short_frames() {
    let mut clock = FixedStep::default();
    assert_eq!(clock.advance(Duration::from_millis(10)), 0);
    assert_eq!(clock.advance(Duration::from_millis(10)), 1);
}

#[test]
fn fixed_step_drops_backlog_after_a_stall() {
    let mut clock = FixedStep::default();
    assert_eq!(clock.advance(Duration::from_secs(1)), 5);
    assert_eq!(clock.advance(Duration::ZERO), 0);

    let mut tight = FixedStep::new(60).with_max_steps(2);
    assert_eq!(tight.advance(Duration::from_millis(100)), 2);
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_hides_dead_enemies_and_taken_crates() {
    let mut w = first_level();
    w.enemies[0].alive = false;
    w.enemies[0].health = 0;
    w.crates[1].taken = true;

    let snap = snapshot(&w);
    assert_eq!(snap.level_name, "Badlands Outskirts");
    assert_eq!(snap.alive_enemies().count(), 6);
    assert_eq!(snap.remaining_crates().count(), 3);
    let rect = snap.player_rect();
    assert_eq!((rect.x, rect.y, rect.w, rect.h), (120.0, 360.0, 28.0, 54.0));
    assert_eq!(snap.status, RunStatus::Playing);
}

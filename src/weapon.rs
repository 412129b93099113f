//! Firing, reloading and bullet flight.
//!
//! Two independent timers live on the player: `fire_cooldown` gates shots,
//! `reload_timer` counts down an in-progress reload.  Both are plain tick
//! counters.

use tracing::debug;

use crate::config::WeaponConfig;
use crate::entities::{Bullet, Enemy, Player};
use crate::physics::{body_rect, Rect};

pub fn can_fire(player: &Player) -> bool {
    player.ammo > 0 && player.fire_cooldown == 0 && !player.reloading
}

/// Fire one round if the gun is ready. Returns whether a bullet was spawned.
pub fn try_fire(player: &mut Player, bullets: &mut Vec<Bullet>, cfg: &WeaponConfig) -> bool {
    if !can_fire(player) {
        return false;
    }

    let body = &player.body;
    let direction = player.facing.sign();
    let x = if direction > 0.0 {
        body.x + body.width
    } else {
        body.x - cfg.bullet_width
    };
    bullets.push(Bullet {
        x,
        y: body.y + cfg.muzzle_y,
        vx: direction * cfg.bullet_speed,
    });

    player.ammo -= 1;
    player.fire_cooldown = cfg.fire_rate;
    true
}

pub fn can_reload(player: &Player, cfg: &WeaponConfig) -> bool {
    !player.reloading && player.magazines > 0 && player.ammo < cfg.magazine_capacity
}

/// Begin a reload. Refused while already reloading, with no spare magazine,
/// or with a full magazine.
pub fn start_reload(player: &mut Player, cfg: &WeaponConfig) -> bool {
    if !can_reload(player, cfg) {
        return false;
    }
    player.reloading = true;
    player.reload_timer = cfg.reload_ticks;
    true
}

/// Advance both weapon timers by one tick, completing a reload when its
/// countdown runs out.
pub fn tick_timers(player: &mut Player, cfg: &WeaponConfig) {
    player.fire_cooldown = player.fire_cooldown.saturating_sub(1);

    if !player.reloading {
        return;
    }
    player.reload_timer = player.reload_timer.saturating_sub(1);
    if player.reload_timer > 0 {
        return;
    }

    if player.magazines > 0 {
        player.magazines -= 1;
        player.ammo = cfg.magazine_capacity;
        debug!(magazines = player.magazines, "reload complete");
    }
    player.reloading = false;
}

/// One tick of the weapon: timers first, then a reload request, then the trigger.
pub fn update(
    player: &mut Player,
    bullets: &mut Vec<Bullet>,
    fire_held: bool,
    reload_pressed: bool,
    cfg: &WeaponConfig,
) {
    tick_timers(player, cfg);
    if reload_pressed {
        start_reload(player, cfg);
    }
    if fire_held {
        try_fire(player, bullets, cfg);
    }
}

// ── Bullets ──────────────────────────────────────────────────────────────────

fn bullet_rect(bullet: &Bullet, cfg: &WeaponConfig) -> Rect {
    Rect {
        x: bullet.x,
        y: bullet.y,
        w: cfg.bullet_width,
        h: cfg.bullet_height,
    }
}

/// Apply one point of damage. Returns `true` only on the hit that kills.
pub fn damage_enemy(enemy: &mut Enemy, amount: u32) -> bool {
    if !enemy.alive {
        return false;
    }
    enemy.health = enemy.health.saturating_sub(amount);
    if enemy.health == 0 {
        enemy.alive = false;
        return true;
    }
    false
}

/// Move every bullet, resolve hits against alive enemies and drop bullets that
/// strayed too far from the view.  Returns the number of enemies killed.
pub fn advance_bullets(
    bullets: &mut Vec<Bullet>,
    enemies: &mut [Enemy],
    camera: f32,
    viewport_width: f32,
    cfg: &WeaponConfig,
) -> u32 {
    let min_x = camera - cfg.cull_margin;
    let max_x = camera + viewport_width + cfg.cull_margin;
    let mut kills = 0;

    bullets.retain_mut(|bullet| {
        bullet.x += bullet.vx;
        if bullet.x < min_x || bullet.x > max_x {
            return false;
        }

        let rect = bullet_rect(bullet, cfg);
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.alive && rect.intersects(&body_rect(&e.body)))
        else {
            return true;
        };

        if damage_enemy(enemy, 1) {
            kills += 1;
            debug!(x = enemy.body.x, "enemy defeated");
        }
        false
    });

    kills
}

//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and a read-only `Snapshot` of the
//! world.  No game logic is performed; this module only projects world
//! coordinates onto terminal cells and emits terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use badlands::compute::Snapshot;
use badlands::config::{Tuning, TICKS_PER_SECOND};
use badlands::entities::{Crate, Enemy, EnemyState, Facing, Platform, RunStatus};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_PLATFORM: Color = Color::DarkYellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_AMMO: Color = Color::Yellow;
const C_HUD_RELOAD: Color = Color::Cyan;
const C_HUD_LEVEL: Color = Color::White;
const C_HUD_KILLS: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Red;
const C_ENEMY_ALERT: Color = Color::Magenta;
const C_BULLET: Color = Color::Yellow;
const C_CRATE: Color = Color::DarkYellow;
const C_HINT: Color = Color::DarkGrey;

/// Terminal row where the play area starts, below the HUD.
const PLAY_TOP: u16 = 1;

// ── World → terminal projection ───────────────────────────────────────────────

struct Projection {
    camera: f32,
    scale_x: f32,
    scale_y: f32,
    cols: u16,
    rows: u16,
}

impl Projection {
    fn new(camera: f32, tuning: &Tuning, width: u16, height: u16) -> Self {
        let rows = height.saturating_sub(3).max(1);
        Self {
            camera,
            scale_x: width as f32 / tuning.view.viewport_width,
            scale_y: rows as f32 / tuning.view.viewport_height,
            cols: width,
            rows,
        }
    }

    fn col(&self, world_x: f32) -> i32 {
        ((world_x - self.camera) * self.scale_x).floor() as i32
    }

    fn row(&self, world_y: f32) -> i32 {
        (world_y * self.scale_y).floor() as i32
    }

    /// Terminal cells covered by a world rectangle, clipped to the play area.
    fn cells(&self, x: f32, y: f32, w: f32, h: f32) -> Option<(u16, u16, u16, u16)> {
        let left = self.col(x).max(0);
        let right = (self.col(x + w).max(self.col(x) + 1)).min(self.cols as i32);
        let top = self.row(y).max(0);
        let bottom = (self.row(y + h).max(self.row(y) + 1)).min(self.rows as i32);
        if left >= right || top >= bottom {
            return None;
        }
        Some((
            left as u16,
            PLAY_TOP + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }
}

fn fill<W: Write>(out: &mut W, cells: (u16, u16, u16, u16), glyph: &str) -> std::io::Result<()> {
    let (x, y, w, h) = cells;
    let line = glyph.repeat(w as usize);
    for row in y..y + h {
        out.queue(cursor::MoveTo(x, row))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    snap: &Snapshot<'_>,
    tuning: &Tuning,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let proj = Projection::new(snap.camera, tuning, width, height);

    for platform in snap.platforms {
        draw_platform(out, &proj, platform)?;
    }
    for crate_ in snap.remaining_crates() {
        draw_crate(out, &proj, crate_)?;
    }
    for enemy in snap.alive_enemies() {
        draw_enemy(out, &proj, enemy)?;
    }
    for bullet in snap.bullets {
        if let Some(cells) = proj.cells(bullet.x, bullet.y, tuning.weapon.bullet_width, 1.0) {
            out.queue(style::SetForegroundColor(C_BULLET))?;
            fill(out, (cells.0, cells.1, cells.2, 1), "-")?;
        }
    }

    draw_player(out, &proj, snap)?;
    draw_hud(out, snap, tuning, width)?;
    draw_controls_hint(out, height)?;

    match snap.status {
        RunStatus::Playing => {}
        RunStatus::LevelComplete => draw_banner(
            out,
            width,
            height,
            "LEVEL  CLEAR",
            Color::Green,
            &format!("Kills: {}", snap.kills),
            "N - Next Level  Q - Quit",
        )?,
        RunStatus::Won => draw_banner(
            out,
            width,
            height,
            "BADLANDS  CLEARED",
            Color::Yellow,
            &format!("Total kills: {}", snap.kills),
            "M - Menu  Q - Quit",
        )?,
        RunStatus::Ended => draw_banner(
            out,
            width,
            height,
            "GAME  OVER",
            Color::Red,
            &format!("Kills: {}", snap.kills),
            "R - Retry  M - Menu  Q - Quit",
        )?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Scenery ───────────────────────────────────────────────────────────────────

fn draw_platform<W: Write>(out: &mut W, proj: &Projection, p: &Platform) -> std::io::Result<()> {
    let Some(cells) = proj.cells(p.x, p.y, p.width, p.height) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLATFORM))?;
    fill(out, (cells.0, cells.1, cells.2, 1), "▀")
}

fn draw_crate<W: Write>(out: &mut W, proj: &Projection, c: &Crate) -> std::io::Result<()> {
    let Some(cells) = proj.cells(c.x, c.y, c.width, c.height) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_CRATE))?;
    fill(out, cells, "▣")
}

// ── Actors ────────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, proj: &Projection, snap: &Snapshot<'_>) -> std::io::Result<()> {
    let r = snap.player_rect();
    let Some((x, y, w, h)) = proj.cells(r.x, r.y, r.w, r.h) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(x, y))?;
    out.queue(Print("o".repeat(w as usize)))?;
    if h > 1 {
        fill(out, (x, y + 1, w, h - 1), "█")?;
    }

    // Gun on the facing side, one row below the head
    let gun_row = y + (h - 1).min(1);
    let (gun_col, glyph) = match snap.player.facing {
        Facing::Right => (x + w, "╾"),
        Facing::Left => (x.saturating_sub(1), "╼"),
    };
    if gun_col < proj.cols {
        out.queue(cursor::MoveTo(gun_col, gun_row))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, proj: &Projection, enemy: &Enemy) -> std::io::Result<()> {
    let b = &enemy.body;
    let Some((x, y, w, h)) = proj.cells(b.x, b.y, b.width, b.height) else {
        return Ok(());
    };
    let color = match enemy.state {
        EnemyState::Idle | EnemyState::Patrol => C_ENEMY,
        EnemyState::Chase | EnemyState::Jump { .. } | EnemyState::Attack => C_ENEMY_ALERT,
    };
    out.queue(style::SetForegroundColor(color))?;
    let eyes = match enemy.facing {
        Facing::Left => "◂",
        Facing::Right => "▸",
    };
    out.queue(cursor::MoveTo(x, y))?;
    out.queue(Print(eyes.repeat(w as usize)))?;
    if h > 1 {
        fill(out, (x, y + 1, w, h - 1), "▓")?;
    }

    // Health pips above the head while damaged
    if enemy.health < enemy.max_health && y > PLAY_TOP {
        out.queue(cursor::MoveTo(x, y - 1))?;
        out.queue(Print("•".repeat(enemy.health as usize)))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    snap: &Snapshot<'_>,
    tuning: &Tuning,
    width: u16,
) -> std::io::Result<()> {
    let p = snap.player;

    // Health, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    let hearts = "♥".repeat(p.health as usize);
    let empty = "·".repeat(p.max_health.saturating_sub(p.health) as usize);
    out.queue(Print(format!("HP {}{}", hearts, empty)))?;

    // Ammo / reload
    out.queue(style::SetForegroundColor(C_HUD_AMMO))?;
    out.queue(Print(format!(
        "  Ammo {:>2}/{:<2} Mags {}",
        p.ammo, tuning.weapon.magazine_capacity, p.magazines
    )))?;
    if p.reloading {
        let seconds = p.reload_timer as f32 / TICKS_PER_SECOND as f32;
        out.queue(style::SetForegroundColor(C_HUD_RELOAD))?;
        out.queue(Print(format!("  RELOADING {:.1}s", seconds)))?;
    }

    // Level, centre
    let level_str = format!("[ {} ]", snap.level_name);
    let lx = (width / 2).saturating_sub(level_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(&level_str))?;

    // Kills and progress, right
    let progress = (p.body.x / snap.level_width * 100.0).clamp(0.0, 100.0);
    let right_str = format!("{:>3.0}%  Kills:{:>3}", progress, snap.kills);
    let rx = width.saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_KILLS))?;
    out.queue(Print(&right_str))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → / A D : Move   ↑ W SPACE : Jump   F J : Fire   R : Reload   E : Crate   Q : Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    title: &str,
    color: Color,
    detail: &str,
    hint: &str,
) -> std::io::Result<()> {
    let inner = title.chars().count().max(18) + 4;
    let pad = inner - title.chars().count();
    let lines = [
        format!("╔{}╗", "═".repeat(inner)),
        format!(
            "║{}{}{}║",
            " ".repeat(pad / 2),
            title,
            " ".repeat(pad - pad / 2)
        ),
        format!("╚{}╝", "═".repeat(inner)),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(3);

    out.queue(style::SetForegroundColor(color))?;
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(Print(line))?;
    }

    let detail_row = start_row + lines.len() as u16;
    out.queue(cursor::MoveTo(
        cx.saturating_sub(detail.chars().count() as u16 / 2),
        detail_row,
    ))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(detail))?;

    out.queue(cursor::MoveTo(
        cx.saturating_sub(hint.chars().count() as u16 / 2),
        detail_row + 1,
    ))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}

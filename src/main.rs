mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use badlands::compute::{advance_level, load_level, snapshot, tick, FixedStep};
use badlands::config::Tuning;
use badlands::entities::{RunStatus, World};
use badlands::input::{InputEdge, Keys};
use badlands::level::{self, LevelDescriptor};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈130 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

#[derive(Parser, Debug)]
#[command(name = "badlands", version, about = "Side-scrolling platform shooter for the terminal")]
struct Cli {
    /// RON file overriding tuning constants.
    #[arg(long, env = "BADLANDS_CONFIG")]
    config: Option<PathBuf>,

    /// RON file with a custom list of levels.
    #[arg(long, env = "BADLANDS_LEVELS")]
    levels: Option<PathBuf>,

    /// Where log output goes; the terminal itself is owned by the game.
    #[arg(long, env = "BADLANDS_LOG")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

/// Map physical keys onto the logical key set the simulation understands.
fn sample_keys(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Keys {
    let bindings: [(Keys, &[KeyCode]); 6] = [
        (Keys::LEFT, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
        (Keys::RIGHT, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
        (
            Keys::JUMP,
            &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')],
        ),
        (
            Keys::FIRE,
            &[KeyCode::Char('f'), KeyCode::Char('F'), KeyCode::Char('j'), KeyCode::Char('J')],
        ),
        (Keys::RELOAD, &[KeyCode::Char('r'), KeyCode::Char('R')]),
        (Keys::INTERACT, &[KeyCode::Char('e'), KeyCode::Char('E')]),
    ];

    bindings
        .iter()
        .filter(|(_, codes)| any_held(key_frame, codes, frame))
        .fold(Keys::empty(), |acc, (key, _)| acc | *key)
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(usize),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    levels: &[LevelDescriptor],
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "▲  B A D L A N D S  ▲";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::DarkYellow))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select starting level:"))?;

    for (i, level) in levels.iter().enumerate().take(9) {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", i + 1)))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(format!("{:<20}", level.name)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(
            " {} enemies, {} crates",
            level.enemy_spawns.len(),
            level.crate_positions.len()
        )))?;
    }

    let footer = cy + levels.len().min(9) as u16 + 1;
    out.queue(cursor::MoveTo(cx.saturating_sub(14), footer))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let event = match rx.recv() {
            Ok(event) => event,
            Err(_) => return Ok(MenuResult::Quit), // input thread gone
        };
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < levels.len() {
                    return Ok(MenuResult::Start(index));
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame the still-fresh keys become the held
/// `Keys` set, and every logical tick shifts it through an `InputEdge` so
/// reload and crate pickup trigger once per press.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence.
fn game_loop<W: Write>(
    out: &mut W,
    mut world: World,
    levels: &[LevelDescriptor],
    tuning: &Tuning,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopExit> {
    let mut rng = thread_rng();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut edge = InputEdge::default();
    let mut stepper = FixedStep::default();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match (code, world.status) {
                        (KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc, _) => {
                            return Ok(LoopExit::Quit);
                        }
                        (KeyCode::Char('c'), _) if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(LoopExit::Quit);
                        }
                        (KeyCode::Char('r') | KeyCode::Char('R'), RunStatus::Ended) => {
                            info!(level = %world.level.name, "retrying level");
                            world = load_level(&levels[world.level_index], world.level_index, tuning);
                            key_frame.clear();
                        }
                        (
                            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter,
                            RunStatus::LevelComplete,
                        ) => {
                            world = advance_level(&world, levels, tuning);
                            key_frame.clear();
                        }
                        (
                            KeyCode::Char('m') | KeyCode::Char('M'),
                            RunStatus::Ended | RunStatus::Won,
                        ) => {
                            return Ok(LoopExit::Menu);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Run however many logical ticks this frame is worth ───────────────
        let now = Instant::now();
        let steps = stepper.advance(now - last);
        last = now;

        let held = sample_keys(&key_frame, frame);
        for _ in 0..steps {
            edge.advance(held);
            world = tick(&world, &edge, tuning, &mut rng);
        }

        let (width, height) = terminal::size()?;
        display::render(out, &snapshot(&world), tuning, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("badlands.log"));
    init_logging(&log_path)?;

    let tuning = match &cli.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let levels = match &cli.levels {
        Some(path) => level::load_levels(path)?,
        None => level::catalogue(),
    };
    info!(levels = levels.len(), "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    if !keyboard_enhanced {
        warn!("terminal does not report key releases; using hold window");
    }

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &levels, &tuning);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("terminal I/O failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    levels: &[LevelDescriptor],
    tuning: &Tuning,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx, levels)? {
            MenuResult::Quit => break,
            MenuResult::Start(index) => {
                let world = load_level(&levels[index], index, tuning);
                match game_loop(out, world, levels, tuning, rx)? {
                    LoopExit::Quit => break,
                    LoopExit::Menu => {}
                }
            }
        }
    }
    Ok(())
}

mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{self, Color, Print};
use crossterm::{cursor, terminal, ExecutableCommand, QueueableCommand};
use rand::thread_rng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use spacewarp::compute::{tick, GameState, FRAMES_PER_SECOND};
use spacewarp::config;
use spacewarp::entities::{Difficulty, GameStatus, InputSnapshot};
use spacewarp::start_level;
use spacewarp::tilemap::GridTilemap;

use display::Overlay;

const FRAME: Duration = Duration::from_millis(1000 / FRAMES_PER_SECOND);

/// Frames a key stays down after its last press or repeat event.  Terminals
/// without release events only report auto-repeat, which arrives well inside
/// this window while the key is physically held.
const HOLD_WINDOW: u64 = 4;

/// Pixels per frame the ship climbs on the win screen.
const LAUNCH_SPEED: i32 = 1;

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const JUMP_KEYS: [KeyCode; 4] = [
    KeyCode::Up,
    KeyCode::Char(' '),
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];
const RESTART_KEYS: [KeyCode; 2] = [KeyCode::Char('r'), KeyCode::Char('R')];

// ── Input ─────────────────────────────────────────────────────────────────────

/// Frame of the last press or repeat per key, so several keys can be down
/// at once.
#[derive(Debug, Default)]
struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
}

impl HeldKeys {
    fn press(&mut self, code: KeyCode, frame: u64) {
        self.last_seen.insert(code, frame);
    }

    fn release(&mut self, code: KeyCode) {
        self.last_seen.remove(&code);
    }

    fn any_held(&self, codes: &[KeyCode], frame: u64) -> bool {
        codes.iter().any(|code| {
            self.last_seen
                .get(code)
                .is_some_and(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        })
    }

    fn snapshot(&self, frame: u64) -> InputSnapshot {
        InputSnapshot {
            left: self.any_held(&LEFT_KEYS, frame),
            right: self.any_held(&RIGHT_KEYS, frame),
            jump: self.any_held(&JUMP_KEYS, frame),
            restart: self.any_held(&RESTART_KEYS, frame),
        }
    }
}

fn init_tracing() -> io::Result<()> {
    let file = File::create(config::log_file_path())?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuChoice {
    Play(Difficulty),
    Exit,
}

const DIFFICULTY_COLORS: [Color; 4] = [Color::Green, Color::Yellow, Color::Red, Color::Magenta];

fn draw_menu<W: Write>(out: &mut W) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let left = (width / 2).saturating_sub(10);
    let mid = height / 2;

    let title = "★  SPACE  WARP  ★";
    let title_col = (width / 2).saturating_sub(title.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(title_col, mid.saturating_sub(6)))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(left, mid.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Pick a level:"))?;

    let entries = Difficulty::ALL.iter().zip(DIFFICULTY_COLORS);
    for (n, (difficulty, color)) in (1u16..).zip(entries) {
        out.queue(cursor::MoveTo(left, mid.saturating_sub(2) + n))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{n}] ")))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(difficulty.label()))?;
    }

    out.queue(cursor::MoveTo(left, mid + 5))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Collect keys, hold buttons, reach the ship.  Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> io::Result<MenuChoice> {
    draw_menu(out)?;

    // A closed channel means the input thread is gone; nothing more can be
    // chosen.
    while let Ok(event) = rx.recv() {
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                return Ok(MenuChoice::Play(Difficulty::ALL[index]));
            }
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => return Ok(MenuChoice::Exit),
            _ => {}
        }
    }
    Ok(MenuChoice::Exit)
}

// ── Play ──────────────────────────────────────────────────────────────────────

enum LoopExit {
    Menu,
    Quit,
}

/// What a key press does outside of movement, given the current status.
fn command_for(code: KeyCode, modifiers: KeyModifiers, status: GameStatus) -> Option<LoopExit> {
    let won = matches!(status, GameStatus::Won { .. });
    match code {
        KeyCode::Esc => Some(LoopExit::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(LoopExit::Quit),
        KeyCode::Char('q' | 'Q') if won => Some(LoopExit::Quit),
        KeyCode::Char('q' | 'Q') => Some(LoopExit::Menu),
        KeyCode::Enter if won => Some(LoopExit::Menu),
        _ => None,
    }
}

/// Run one level at a fixed frame rate until the player leaves it.
fn play<W: Write>(
    out: &mut W,
    state: &mut GameState<GridTilemap>,
    rx: &mpsc::Receiver<Event>,
) -> io::Result<LoopExit> {
    let mut keys = HeldKeys::default();
    let mut overlay = Overlay::default();
    let mut frame: u64 = 0;

    loop {
        let started = Instant::now();
        frame += 1;

        while let Ok(event) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    if let Some(exit) = command_for(code, modifiers, state.status) {
                        return Ok(exit);
                    }
                    keys.press(code, frame);
                }
                KeyEventKind::Repeat => keys.press(code, frame),
                KeyEventKind::Release => keys.release(code),
            }
        }

        match state.status {
            GameStatus::Playing => {
                tick(state, keys.snapshot(frame));
                if matches!(state.status, GameStatus::Won { .. }) {
                    let (width, height) = terminal::size()?;
                    overlay.stars = display::starfield(&mut thread_rng(), width, height);
                }
            }
            GameStatus::Won { .. } if !overlay.launch_finished(state) => {
                overlay.launch_px += LAUNCH_SPEED;
            }
            GameStatus::Won { .. } => {}
        }

        display::render(out, state, &overlay)?;

        if let Some(rest) = FRAME.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// Raw mode on the alternate screen.  Returns whether key release events
/// were granted.
fn enter_terminal<W: Write>(out: &mut W) -> io::Result<bool> {
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    // Not every terminal speaks the kitty keyboard protocol.
    let enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    Ok(enhanced)
}

fn leave_terminal<W: Write>(out: &mut W, enhanced: bool) {
    if enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Forward terminal events to the frame loop so it never blocks on input.
fn spawn_input_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        while let Ok(event) = event::read() {
            if tx.send(event).is_err() {
                break;
            }
        }
    });
    rx
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    init_tracing()?;
    info!("spacewarp starting");

    let mut out = BufWriter::new(stdout());
    let enhanced = enter_terminal(&mut out)?;
    let rx = spawn_input_reader();

    let result = run(&mut out, &rx);

    leave_terminal(&mut out, enhanced);
    if let Err(err) = &result {
        error!(%err, "exiting with error");
    }
    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> io::Result<()> {
    while let MenuChoice::Play(difficulty) = show_menu(out, rx)? {
        let mut state = start_level(difficulty).map_err(|err| {
            error!(%err, "failed to start level");
            io::Error::new(io::ErrorKind::InvalidData, err)
        })?;
        if let LoopExit::Quit = play(out, &mut state, rx)? {
            break;
        }
    }
    info!("spacewarp exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_stay_held_for_the_window() {
        let mut keys = HeldKeys::default();
        keys.press(KeyCode::Right, 10);
        assert!(keys.snapshot(10).right);
        assert!(keys.snapshot(10 + HOLD_WINDOW).right);
        assert!(!keys.snapshot(11 + HOLD_WINDOW).right);
    }

    #[test]
    fn release_clears_immediately() {
        let mut keys = HeldKeys::default();
        keys.press(KeyCode::Char(' '), 3);
        keys.press(KeyCode::Char('a'), 3);
        keys.release(KeyCode::Char(' '));
        let input = keys.snapshot(3);
        assert!(!input.jump);
        assert!(input.left);
    }

    #[test]
    fn quit_keys_depend_on_status() {
        let won = GameStatus::Won { frames: 1 };
        let none = KeyModifiers::NONE;
        assert!(matches!(
            command_for(KeyCode::Char('q'), none, GameStatus::Playing),
            Some(LoopExit::Menu)
        ));
        assert!(matches!(
            command_for(KeyCode::Char('q'), none, won),
            Some(LoopExit::Quit)
        ));
        assert!(command_for(KeyCode::Enter, none, GameStatus::Playing).is_none());
        assert!(matches!(
            command_for(KeyCode::Char('c'), KeyModifiers::CONTROL, GameStatus::Playing),
            Some(LoopExit::Quit)
        ));
    }
}

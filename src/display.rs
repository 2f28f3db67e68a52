/// Rendering layer: all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.  One tile is two terminal columns wide.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use rand::Rng;

use spacewarp::compute::{elapsed_seconds, GameState};
use spacewarp::entities::{Difficulty, Facing, GameStatus, TILE_SIZE};
use spacewarp::gates::{Button, Door};
use spacewarp::room::{ROOM_PIXELS, ROOM_TILES};
use spacewarp::tilemap::{GridTilemap, Tilemap};
use spacewarp::tiles::{
    classify, GateColor, TileCode, TileKind, SHIP_BOTTOM_LEFT, SHIP_TOP_LEFT, SHIP_TOP_RIGHT,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_WALL: Color = Color::Grey;
const C_FIRE: Color = Color::Red;
const C_SHIP: Color = Color::White;
const C_PLAYER: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;
const C_STAR: Color = Color::DarkYellow;

/// Screen row of tile row 0.
const TOP: u16 = 2;
/// Screen column of tile column 0.
const LEFT: u16 = 1;

fn gate_color(color: GateColor) -> Color {
    match color {
        GateColor::Red => Color::Red,
        GateColor::Green => Color::Green,
        GateColor::Blue => Color::Blue,
    }
}

fn screen_at(col: i32, row: i32) -> Option<(u16, u16)> {
    if !(0..ROOM_TILES).contains(&col) || !(0..ROOM_TILES).contains(&row) {
        return None;
    }
    Some((LEFT + 2 * col as u16, TOP + row as u16))
}

/// Win-screen extras that live outside the simulation.
#[derive(Debug, Default)]
pub struct Overlay {
    /// Pixels the launched ship has risen so far.
    pub launch_px: i32,
    pub stars: Vec<(u16, u16)>,
}

impl Overlay {
    /// True once the ship has left the top of the screen.
    pub fn launch_finished(&self, state: &GameState<GridTilemap>) -> bool {
        match state.launched_ship {
            Some(anchor) => anchor.row * TILE_SIZE + 3 * TILE_SIZE - self.launch_px <= 0,
            None => true,
        }
    }
}

/// Scatter stars over a `width` × `height` area, roughly one cell in
/// twenty-four.
pub fn starfield(rng: &mut impl Rng, width: u16, height: u16) -> Vec<(u16, u16)> {
    let mut stars = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if rng.gen_ratio(1, 24) {
                stars.push((x, y));
            }
        }
    }
    stars
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState<GridTilemap>,
    overlay: &Overlay,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    if matches!(state.status, GameStatus::Won { .. }) && overlay.launch_finished(state) {
        draw_win_screen(out, state, overlay)?;
    } else {
        draw_border(out)?;
        draw_hud(out, state)?;
        draw_room(out, state)?;
        match state.status {
            GameStatus::Playing => draw_player(out, state)?,
            GameStatus::Won { .. } => draw_launch(out, state, overlay)?,
        }
        draw_controls_hint(out)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, TOP + ROOM_TILES as u16 + 2))?;
    out.flush()?;
    Ok(())
}

// ── Frame ─────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W) -> std::io::Result<()> {
    let inner = 2 * ROOM_TILES as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, TOP - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(inner))))?;
    out.queue(cursor::MoveTo(0, TOP + ROOM_TILES as u16))?;
    out.queue(Print(format!("└{}┘", "─".repeat(inner))))?;
    for row in 0..ROOM_TILES as u16 {
        out.queue(cursor::MoveTo(0, TOP + row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(LEFT + inner as u16, TOP + row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState<GridTilemap>) -> std::io::Result<()> {
    let hud = format!(
        "Room {}/{}   {}   Time: {}s",
        state.rooms.active_index() + 1,
        state.rooms.room_count(),
        difficulty_label(state.difficulty),
        elapsed_seconds(state.frame),
    );
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(hud))?;
    Ok(())
}

fn difficulty_label(difficulty: Difficulty) -> String {
    format!("[ {} ]", difficulty.label().to_uppercase())
}

// ── Tiles ─────────────────────────────────────────────────────────────────────

fn draw_room<W: Write>(out: &mut W, state: &GameState<GridTilemap>) -> std::io::Result<()> {
    let first_col = state.rooms.active_index() as i32 * ROOM_TILES;
    let room = state.rooms.active();

    for row in 0..ROOM_TILES {
        for col in 0..ROOM_TILES {
            let code = state.map.tile_at(first_col + col, row);
            if let Some((glyph, color)) = tile_glyph(code, room.buttons.as_slice()) {
                if let Some((sx, sy)) = screen_at(col, row) {
                    out.queue(cursor::MoveTo(sx, sy))?;
                    out.queue(style::SetForegroundColor(color))?;
                    out.queue(Print(glyph))?;
                }
            }
        }
    }

    for door in &room.doors {
        draw_door(out, door, first_col)?;
    }
    Ok(())
}

fn tile_glyph(code: TileCode, buttons: &[Button]) -> Option<(&'static str, Color)> {
    let drawn = match classify(code)? {
        TileKind::Wall => ("██", C_WALL),
        TileKind::Fire => ("^^", C_FIRE),
        TileKind::Key(color) => ("o-", gate_color(color)),
        TileKind::Button(color) => {
            let depth = buttons
                .iter()
                .find(|b| b.color == color)
                .map_or(0, |b| b.depression);
            let glyph = match depth {
                0 => "▄▄",
                1 => "▃▃",
                2 => "▂▂",
                _ => "▁▁",
            };
            (glyph, gate_color(color))
        }
        TileKind::ShipPart => match code {
            SHIP_TOP_LEFT => ("/▔", C_SHIP),
            SHIP_TOP_RIGHT => ("▔\\", C_SHIP),
            SHIP_BOTTOM_LEFT => ("[_", C_SHIP),
            _ => ("_]", C_SHIP),
        },
        // Doors are drawn from their animation state; markers are invisible.
        TileKind::DoorTop(_) | TileKind::DoorBottom(_) | TileKind::Spawn | TileKind::EndMarker => {
            return None
        }
    };
    Some(drawn)
}

fn draw_door<W: Write>(out: &mut W, door: &Door, first_col: i32) -> std::io::Result<()> {
    let full = 2 * TILE_SIZE;
    let glyph = match door.visible_height() {
        0 => return Ok(()),
        h if h >= full => "██",
        h if h >= full / 2 => "▓▓",
        _ => "░░",
    };
    out.queue(style::SetForegroundColor(gate_color(door.color)))?;
    for loc in &door.locations {
        for row in [loc.row, loc.row + 1] {
            if let Some((sx, sy)) = screen_at(loc.col - first_col, row) {
                out.queue(cursor::MoveTo(sx, sy))?;
                out.queue(Print(glyph))?;
            }
        }
    }
    Ok(())
}

// ── Player & ship ─────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GameState<GridTilemap>) -> std::io::Result<()> {
    let p = &state.player;
    let room_x = p.x - state.rooms.active_index() as i32 * ROOM_PIXELS;
    let col = (room_x + TILE_SIZE / 2).div_euclid(TILE_SIZE);
    let row = (p.y + TILE_SIZE / 2).div_euclid(TILE_SIZE);

    let sprite = match (p.facing, p.is_jumping(), p.walk_frame) {
        (Facing::Right, true, _) => "ô>",
        (Facing::Left, true, _) => "<ô",
        (Facing::Right, false, false) => "o>",
        (Facing::Right, false, true) => "O>",
        (Facing::Left, false, false) => "<o",
        (Facing::Left, false, true) => "<O",
    };
    if let Some((sx, sy)) = screen_at(col, row) {
        out.queue(cursor::MoveTo(sx, sy))?;
        out.queue(style::SetForegroundColor(C_PLAYER))?;
        out.queue(Print(sprite))?;
    }
    Ok(())
}

fn draw_launch<W: Write>(
    out: &mut W,
    state: &GameState<GridTilemap>,
    overlay: &Overlay,
) -> std::io::Result<()> {
    let Some(anchor) = state.launched_ship else {
        return Ok(());
    };
    let col = anchor.col - state.rooms.active_index() as i32 * ROOM_TILES;
    let rise = overlay.launch_px / TILE_SIZE;
    let rows: [(&str, Color); 3] = [("/▔▔\\", C_SHIP), ("[__]", C_SHIP), (" ** ", C_FIRE)];
    for (i, (glyph, color)) in rows.iter().enumerate() {
        if let Some((sx, sy)) = screen_at(col, anchor.row + i as i32 - rise) {
            out.queue(cursor::MoveTo(sx, sy))?;
            out.queue(style::SetForegroundColor(*color))?;
            out.queue(Print(*glyph))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, TOP + ROOM_TILES as u16 + 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   ↑ / SPACE : Jump   R : Restart   Q : Menu"))?;
    Ok(())
}

// ── Win screen ────────────────────────────────────────────────────────────────

fn draw_win_screen<W: Write>(
    out: &mut W,
    state: &GameState<GridTilemap>,
    overlay: &Overlay,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_STAR))?;
    for &(x, y) in &overlay.stars {
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(Print("·"))?;
    }

    let frames = match state.status {
        GameStatus::Won { frames } => frames,
        GameStatus::Playing => state.frame,
    };
    let time_line = format!("Time: {}s", elapsed_seconds(frames));
    let difficulty_line = difficulty_label(state.difficulty);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Cyan),
        ("║     YOU  WIN     ║", Color::Cyan),
        ("╚══════════════════╝", Color::Cyan),
        (time_line.as_str(), Color::Yellow),
        (difficulty_line.as_str(), Color::White),
        ("ENTER - Menu  Q - Quit", Color::White),
    ];

    let cx = ROOM_TILES as u16 + 1;
    let start_row = TOP + (ROOM_TILES as u16 / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn starfield_is_deterministic_for_a_seed() {
        let a = starfield(&mut StdRng::seed_from_u64(7), 34, 18);
        let b = starfield(&mut StdRng::seed_from_u64(7), 34, 18);
        assert_eq!(a, b);
        assert!(a.iter().all(|&(x, y)| x < 34 && y < 18));
    }

    #[test]
    fn screen_at_rejects_cells_outside_the_room() {
        assert_eq!(screen_at(0, 0), Some((LEFT, TOP)));
        assert_eq!(screen_at(15, 15), Some((LEFT + 30, TOP + 15)));
        assert_eq!(screen_at(-1, 0), None);
        assert_eq!(screen_at(16, 3), None);
    }
}

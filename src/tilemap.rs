/// Tilemap access.
///
/// The engine never owns level geometry directly; it reads and writes cells
/// through the `Tilemap` trait.  `GridTilemap` is the in-memory provider used
/// by the game binary and by tests, and can be built from a glyph grid.

use thiserror::Error;

use crate::tiles::{
    GateColor, TileCode, EMPTY, END_MARKER, FIRE, SHIP_BOTTOM_LEFT, SHIP_BOTTOM_RIGHT,
    SHIP_TOP_LEFT, SHIP_TOP_RIGHT, SPAWN, WALL,
};

/// Read/write cell access by integer tile coordinate.
pub trait Tilemap {
    fn tile_at(&self, col: i32, row: i32) -> TileCode;
    fn set_tile(&mut self, col: i32, row: i32, code: TileCode);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("row {row} is {actual} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
    #[error("tilemap has no rows")]
    Empty,
}

/// Dense row-major grid.  Reads outside the grid yield `EMPTY`; writes
/// outside it are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTilemap {
    width: usize,
    height: usize,
    tiles: Vec<TileCode>,
}

impl GridTilemap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![EMPTY; width * height],
        }
    }

    pub fn from_tiles(
        width: usize,
        height: usize,
        tiles: Vec<TileCode>,
    ) -> Result<Self, TilemapError> {
        let expected = width * height;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Parse a glyph grid, one line per row.  Trailing blank lines are
    /// ignored; every other line must be exactly as wide as the first.
    pub fn parse(text: &str) -> Result<Self, TilemapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let used = rows
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map(|last| last + 1)
            .ok_or(TilemapError::Empty)?;

        let width = rows[0].chars().count();
        let mut tiles = Vec::with_capacity(width * used);
        for (row, line) in rows[..used].iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(TilemapError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let code =
                    code_for_glyph(glyph).ok_or(TilemapError::UnknownGlyph { glyph, col, row })?;
                tiles.push(code);
            }
        }
        Self::from_tiles(width, used, tiles)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        let col = usize::try_from(col).ok()?;
        let row = usize::try_from(row).ok()?;
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(row * self.width + col)
    }
}

impl Tilemap for GridTilemap {
    fn tile_at(&self, col: i32, row: i32) -> TileCode {
        self.index_of(col, row)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(EMPTY)
    }

    fn set_tile(&mut self, col: i32, row: i32, code: TileCode) {
        if let Some(index) = self.index_of(col, row) {
            self.tiles[index] = code;
        }
    }
}

// ── Glyphs ───────────────────────────────────────────────────────────────────

const KEY_GLYPHS: [char; 3] = ['a', 'b', 'c'];
const BUTTON_GLYPHS: [char; 3] = ['x', 'y', 'z'];
const DOOR_TOP_GLYPHS: [char; 3] = ['A', 'B', 'C'];
const DOOR_BOTTOM_GLYPHS: [char; 3] = ['X', 'Y', 'Z'];

fn colored(glyphs: &[char; 3], glyph: char) -> Option<GateColor> {
    glyphs
        .iter()
        .position(|&g| g == glyph)
        .and_then(GateColor::from_index)
}

/// Tile code written for a level-text glyph.
pub fn code_for_glyph(glyph: char) -> Option<TileCode> {
    let code = match glyph {
        '.' | ' ' => EMPTY,
        '#' => WALL,
        '^' => FIRE,
        '@' => SPAWN,
        '$' => END_MARKER,
        '/' => SHIP_TOP_LEFT,
        '\\' => SHIP_TOP_RIGHT,
        '[' => SHIP_BOTTOM_LEFT,
        ']' => SHIP_BOTTOM_RIGHT,
        _ => {
            if let Some(color) = colored(&KEY_GLYPHS, glyph) {
                color.key()
            } else if let Some(color) = colored(&BUTTON_GLYPHS, glyph) {
                color.button()
            } else if let Some(color) = colored(&DOOR_TOP_GLYPHS, glyph) {
                color.door_top()
            } else if let Some(color) = colored(&DOOR_BOTTOM_GLYPHS, glyph) {
                color.door_bottom()
            } else {
                return None;
            }
        }
    };
    Some(code)
}

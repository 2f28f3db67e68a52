/// Tile codes and their semantic categories.
///
/// A tile code is the (column, row) of a sprite in the tile sheet.  The
/// sheet layout is known only here: every other module asks `classify`
/// what a code means instead of comparing codes directly.

/// Number of key / button / door colour channels.
pub const COLORS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCode {
    pub u: u8,
    pub v: u8,
}

impl TileCode {
    pub const fn new(u: u8, v: u8) -> Self {
        Self { u, v }
    }
}

// ── Fixed codes ──────────────────────────────────────────────────────────────

pub const EMPTY: TileCode = TileCode::new(0, 0);
pub const END_MARKER: TileCode = TileCode::new(0, 1);
pub const SPAWN: TileCode = TileCode::new(3, 4);
/// The wall sprite written by text levels.  Any code in the wall ranges
/// behaves identically.
pub const WALL: TileCode = TileCode::new(4, 0);
pub const FIRE: TileCode = TileCode::new(0, 2);

pub const SHIP_TOP_LEFT: TileCode = TileCode::new(0, 4);
pub const SHIP_TOP_RIGHT: TileCode = TileCode::new(1, 4);
pub const SHIP_BOTTOM_LEFT: TileCode = TileCode::new(0, 5);
pub const SHIP_BOTTOM_RIGHT: TileCode = TileCode::new(1, 5);

// ── Colours ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GateColor {
    Red,
    Green,
    Blue,
}

impl GateColor {
    pub const ALL: [GateColor; COLORS] = [GateColor::Red, GateColor::Green, GateColor::Blue];

    pub fn index(self) -> usize {
        match self {
            GateColor::Red => 0,
            GateColor::Green => 1,
            GateColor::Blue => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn offset(self) -> u8 {
        self.index() as u8
    }

    pub fn key(self) -> TileCode {
        TileCode::new(7, 4 + self.offset())
    }

    pub fn button(self) -> TileCode {
        TileCode::new(4 + self.offset(), 6)
    }

    pub fn door_top(self) -> TileCode {
        TileCode::new(4 + self.offset(), 4)
    }

    pub fn door_bottom(self) -> TileCode {
        TileCode::new(4 + self.offset(), 5)
    }
}

// ── Classification ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Wall,
    Fire,
    Key(GateColor),
    Button(GateColor),
    DoorTop(GateColor),
    DoorBottom(GateColor),
    Spawn,
    EndMarker,
    ShipPart,
}

impl TileKind {
    /// Solid for the player: walls and both halves of a closed door.
    pub fn is_collider(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::DoorTop(_) | TileKind::DoorBottom(_))
    }
}

fn color_at(offset: u8) -> GateColor {
    match offset {
        0 => GateColor::Red,
        1 => GateColor::Green,
        _ => GateColor::Blue,
    }
}

/// Map a tile code to its category, or `None` for empty / decorative tiles.
pub fn classify(code: TileCode) -> Option<TileKind> {
    let kind = match (code.u, code.v) {
        (0..=1, 2..=3) => TileKind::Fire,
        (4..=7, 0..=1) | (2..=5, 2..=3) => TileKind::Wall,
        (7, 4..=6) => TileKind::Key(color_at(code.v - 4)),
        (4..=6, 6) => TileKind::Button(color_at(code.u - 4)),
        (4..=6, 4) => TileKind::DoorTop(color_at(code.u - 4)),
        (4..=6, 5) => TileKind::DoorBottom(color_at(code.u - 4)),
        (3, 4) => TileKind::Spawn,
        (0, 1) => TileKind::EndMarker,
        (0..=1, 4..=5) => TileKind::ShipPart,
        _ => return None,
    };
    Some(kind)
}

pub fn is_collider(code: TileCode) -> bool {
    classify(code).map_or(false, TileKind::is_collider)
}

/// Offsets of the four ship tiles from the top-left anchor, in raster order.
pub const SHIP_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// Keys, buttons and doors: the stateful tiles that gate progress.
///
/// Each room holds one of each per colour.  A key unlocks every door of its
/// colour for good; a button holds them open for a while; a door is passable
/// while either applies and writes its tiles back into the grid every tick
/// so collision sees the current state.

use tracing::debug;

use crate::entities::{TilePos, TILE_SIZE};
use crate::tilemap::Tilemap;
use crate::tiles::{GateColor, EMPTY};

/// Depression set by standing squarely on a button; also the number of
/// frames it holds a door open.
pub const FULL_PRESS: u32 = 150;
const PARTIAL_PRESS: u32 = 2;
const LIGHT_PRESS: u32 = 1;

/// Door animation frames between fully open (0) and fully closed.
pub const DOOR_CLOSED_PHASE: u8 = 8;

// ── Key ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    pub color: GateColor,
    pub locations: Vec<TilePos>,
    pub collected: bool,
}

impl Key {
    pub fn new(color: GateColor) -> Self {
        Self {
            color,
            locations: Vec::new(),
            collected: false,
        }
    }

    /// Take the key and unlock every door of the same colour.
    pub fn collect(&mut self, doors: &mut [Door]) {
        if !self.collected {
            debug!(color = ?self.color, "key collected");
        }
        self.collected = true;
        for door in doors.iter_mut().filter(|d| d.color == self.color) {
            door.unlock();
        }
    }

    /// Draw the key icon while it is still available, clear it once taken.
    pub fn apply_tiles(&self, map: &mut impl Tilemap) {
        let code = if self.collected { EMPTY } else { self.color.key() };
        for loc in &self.locations {
            map.set_tile(loc.col, loc.row, code);
        }
    }
}

// ── Button ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub color: GateColor,
    pub locations: Vec<TilePos>,
    /// Remaining held frames, 0..=FULL_PRESS.  Values 1 and 2 double as the
    /// shallow press animation depths.
    pub depression: u32,
}

impl Button {
    pub fn new(color: GateColor) -> Self {
        Self {
            color,
            locations: Vec::new(),
            depression: 0,
        }
    }

    /// Evaluate the player at pixel `(x, y)` against every location of this
    /// button, then hold same-coloured doors open for the resulting depth.
    ///
    /// Locations are checked in order without early exit.  The shallow bands
    /// only apply when the button is not already deeper, so the result is
    /// the deepest band any location reaches.
    pub fn press(&mut self, x: i32, y: i32, doors: &mut [Door]) {
        for loc in &self.locations {
            let (ax, ay) = loc.to_pixels();
            let dx = (x - ax).abs();
            if dx <= 4 && y == ay {
                self.depression = FULL_PRESS;
            } else if dx <= 5 && (ay - 1..=ay).contains(&y) && self.depression <= PARTIAL_PRESS {
                self.depression = PARTIAL_PRESS;
            } else if dx <= 6 && ay - 2 < y && y <= ay && self.depression <= LIGHT_PRESS {
                self.depression = LIGHT_PRESS;
            }
        }

        for door in doors.iter_mut().filter(|d| d.color == self.color) {
            door.hold_open(self.depression);
        }
    }

    /// Natural decay once the player steps off.
    pub fn tick(&mut self) {
        self.depression = self.depression.saturating_sub(1);
    }
}

// ── Door ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Door {
    pub color: GateColor,
    /// Top halves; each has its bottom half one row below.
    pub locations: Vec<TilePos>,
    pub unlocked: bool,
    pub hold_timer: u32,
    pub animation_phase: u8,
}

impl Door {
    pub fn new(color: GateColor) -> Self {
        Self {
            color,
            locations: Vec::new(),
            unlocked: false,
            hold_timer: 0,
            animation_phase: DOOR_CLOSED_PHASE,
        }
    }

    pub fn unlock(&mut self) {
        self.unlocked = true;
    }

    /// Keep the door open for at least `frames` more ticks.  Never shortens
    /// a hold already in progress.
    pub fn hold_open(&mut self, frames: u32) {
        self.hold_timer = self.hold_timer.max(frames);
    }

    pub fn is_passable(&self) -> bool {
        self.unlocked || self.hold_timer > 0
    }

    pub fn state(&self) -> DoorState {
        match (self.is_passable(), self.animation_phase) {
            (true, 0) => DoorState::Open,
            (true, _) => DoorState::Opening,
            (false, DOOR_CLOSED_PHASE) => DoorState::Closed,
            (false, _) => DoorState::Closing,
        }
    }

    pub fn tick(&mut self) {
        self.hold_timer = self.hold_timer.saturating_sub(1);

        if self.is_passable() {
            self.animation_phase = self.animation_phase.saturating_sub(1);
        } else if self.animation_phase < DOOR_CLOSED_PHASE {
            self.animation_phase += 1;
        }
    }

    /// Clear both halves from the grid while passable, restore them otherwise.
    pub fn apply_tiles(&self, map: &mut impl Tilemap) {
        let (top, bottom) = if self.is_passable() {
            (EMPTY, EMPTY)
        } else {
            (self.color.door_top(), self.color.door_bottom())
        };
        for loc in &self.locations {
            map.set_tile(loc.col, loc.row, top);
            map.set_tile(loc.col, loc.row + 1, bottom);
        }
    }

    /// Visible door height in pixels for the current animation frame, out of
    /// two tiles.
    pub fn visible_height(&self) -> i32 {
        i32::from(self.animation_phase) * 2 * TILE_SIZE / i32::from(DOOR_CLOSED_PHASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_state_follows_animation() {
        let mut door = Door::new(GateColor::Red);
        assert_eq!(door.state(), DoorState::Closed);

        door.unlock();
        assert_eq!(door.state(), DoorState::Opening);
        for _ in 0..DOOR_CLOSED_PHASE {
            door.tick();
        }
        assert_eq!(door.state(), DoorState::Open);
        assert_eq!(door.visible_height(), 0);
    }

    #[test]
    fn hold_expiry_closes_one_step_per_tick() {
        let mut door = Door::new(GateColor::Blue);
        door.animation_phase = 0;
        door.hold_open(1);
        door.tick();
        assert_eq!(door.hold_timer, 0);
        assert_eq!(door.animation_phase, 1);
        assert_eq!(door.state(), DoorState::Closing);
        for _ in 0..20 {
            door.tick();
        }
        assert_eq!(door.animation_phase, DOOR_CLOSED_PHASE);
        assert_eq!(door.visible_height(), 2 * TILE_SIZE);
    }
}

/// Per-room gate state, checkpoints and rollback.
///
/// Only the room the camera is on is simulated.  Crossing into another room
/// records a checkpoint and snapshots that room; dying restores the snapshot
/// so the room looks exactly as it did on entry.

use tracing::info;

use crate::entities::TILE_SIZE;
use crate::gates::{Button, Door, Key};
use crate::player::Player;
use crate::tilemap::Tilemap;
use crate::tiles::{GateColor, COLORS};

/// Room width in tiles.
pub const ROOM_TILES: i32 = 16;
/// Room width in pixels, which is also the camera width.
pub const ROOM_PIXELS: i32 = ROOM_TILES * TILE_SIZE;

/// Every gate object of one room, indexed by colour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomState {
    pub keys: [Key; COLORS],
    pub buttons: [Button; COLORS],
    pub doors: [Door; COLORS],
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            keys: GateColor::ALL.map(Key::new),
            buttons: GateColor::ALL.map(Button::new),
            doors: GateColor::ALL.map(Door::new),
        }
    }
}

impl RoomState {
    pub fn key(&self, color: GateColor) -> &Key {
        &self.keys[color.index()]
    }

    pub fn button(&self, color: GateColor) -> &Button {
        &self.buttons[color.index()]
    }

    pub fn door(&self, color: GateColor) -> &Door {
        &self.doors[color.index()]
    }

    pub fn collect_key(&mut self, color: GateColor) {
        self.keys[color.index()].collect(&mut self.doors);
    }

    pub fn press_button(&mut self, color: GateColor, x: i32, y: i32) {
        self.buttons[color.index()].press(x, y, &mut self.doors);
    }

    /// Advance timers and animations one frame and write the result back
    /// into the grid.
    pub fn tick(&mut self, map: &mut impl Tilemap) {
        for door in &mut self.doors {
            door.tick();
            door.apply_tiles(map);
        }
        for button in &mut self.buttons {
            button.tick();
        }
        for key in &self.keys {
            key.apply_tiles(map);
        }
    }

    pub fn snapshot(&self) -> RoomState {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: &RoomState) {
        self.clone_from(snapshot);
    }
}

/// The state of one room captured when it was entered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: usize,
    pub state: RoomState,
}

#[derive(Clone, Debug)]
pub struct RoomManager {
    rooms: Vec<RoomState>,
    active: usize,
    checkpoint: (i32, i32),
    snapshot: RoomSnapshot,
    snapshots_taken: u64,
}

impl RoomManager {
    /// Start in room 0 with `spawn` as the checkpoint.  An empty room list
    /// is treated as a single room with no gate objects.
    pub fn new(mut rooms: Vec<RoomState>, spawn: (i32, i32)) -> Self {
        if rooms.is_empty() {
            rooms.push(RoomState::default());
        }
        let snapshot = RoomSnapshot {
            room: 0,
            state: rooms[0].snapshot(),
        };
        Self {
            rooms,
            active: 0,
            checkpoint: spawn,
            snapshot,
            snapshots_taken: 1,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &RoomState {
        &self.rooms[self.active]
    }

    pub fn active_mut(&mut self) -> &mut RoomState {
        &mut self.rooms[self.active]
    }

    pub fn room(&self, index: usize) -> Option<&RoomState> {
        self.rooms.get(index)
    }

    pub fn checkpoint(&self) -> (i32, i32) {
        self.checkpoint
    }

    pub fn snapshot(&self) -> &RoomSnapshot {
        &self.snapshot
    }

    /// Snapshots taken so far, including the one at level start.
    pub fn snapshots_taken(&self) -> u64 {
        self.snapshots_taken
    }

    /// Room the camera shows for a player whose left edge is at `x`.
    pub fn room_at(x: i32) -> i32 {
        (x + TILE_SIZE / 2).div_euclid(ROOM_PIXELS)
    }

    /// Switch rooms if the player's centre crossed a camera boundary.
    /// Returns `true` when a transition happened.
    ///
    /// The checkpoint is placed so the respawned player is wholly inside the
    /// new room, and the new room is snapshotted before anything else runs
    /// this tick.  Crossings into a column beyond the last room are ignored.
    pub fn follow(&mut self, player: &Player) -> bool {
        let target = Self::room_at(player.x);
        let Ok(target) = usize::try_from(target) else {
            return false;
        };
        if target == self.active || target >= self.rooms.len() {
            return false;
        }

        let moving_left = target < self.active;
        let back_off = if moving_left { TILE_SIZE } else { 0 };
        self.checkpoint = (player.x + TILE_SIZE / 2 - back_off, player.y);
        self.active = target;
        self.snapshot = RoomSnapshot {
            room: target,
            state: self.rooms[target].snapshot(),
        };
        self.snapshots_taken += 1;

        info!(room = target, checkpoint = ?self.checkpoint, "entered room");
        true
    }

    /// Put the snapshotted room back the way it was on entry.
    pub fn rollback(&mut self) {
        let RoomSnapshot { room, state } = &self.snapshot;
        self.rooms[*room].restore(state);
    }
}

/// Level loading: one raster scan over the tilemap that validates the
/// structural rules and sorts gate tiles into their rooms.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{info, warn};

use crate::entities::TilePos;
use crate::room::{RoomState, ROOM_TILES};
use crate::tilemap::Tilemap;
use crate::tiles::{classify, TileKind, EMPTY, END_MARKER, SHIP_OFFSETS, SHIP_TOP_LEFT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelFormatError {
    #[error("missing bottom door at {pos}")]
    MissingBottomDoor { pos: TilePos },
    #[error("missing top door at {pos}")]
    MissingTopDoor { pos: TilePos },
    #[error("top door at {pos} cannot be on the bottom row")]
    TopDoorOnBottomEdge { pos: TilePos },
    #[error("bottom door at {pos} cannot be on the top row")]
    BottomDoorOnTopEdge { pos: TilePos },
    #[error("room {room} already has an end ship; second one at {pos}")]
    DuplicateShip { room: usize, pos: TilePos },
    #[error("incomplete end ship at {pos}")]
    IncompleteShip { pos: TilePos },
    #[error("ship tile at {pos} is not part of any end ship")]
    StrayShipTile { pos: TilePos },
    #[error("second spawn at {pos}; first was at {first}")]
    DuplicateSpawn { first: TilePos, pos: TilePos },
}

/// Everything the game needs from a validated level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedLevel {
    pub room_count: usize,
    pub rooms: Vec<RoomState>,
    /// Pixel position of the spawn tile, or the origin if there is none.
    pub spawn: (i32, i32),
    /// Top-left tile of each end ship, in scan order.
    pub ships: Vec<TilePos>,
}

/// Room geometry used while scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelLoader {
    pub room_width: i32,
    pub room_height: i32,
    pub max_rooms: usize,
}

impl Default for LevelLoader {
    fn default() -> Self {
        Self {
            room_width: ROOM_TILES,
            room_height: ROOM_TILES,
            max_rooms: 16,
        }
    }
}

impl LevelLoader {
    /// Number of rooms, read from the end marker on row 0 at the first
    /// room boundary that has one.  Without a marker the level is assumed
    /// to use every room.
    pub fn count_rooms(&self, map: &impl Tilemap) -> usize {
        for i in 1..self.max_rooms {
            if map.tile_at(self.room_width * i as i32, 0) == END_MARKER {
                return i;
            }
        }
        warn!(rooms = self.max_rooms, "no end marker found; using every room");
        self.max_rooms
    }

    /// Scan the level top to bottom, left to right.
    ///
    /// Clears the spawn marker from `map`.  Fails on the first structural
    /// problem encountered in scan order.
    pub fn load(&self, map: &mut impl Tilemap) -> Result<LoadedLevel, LevelFormatError> {
        let room_count = self.count_rooms(map);
        let mut rooms = vec![RoomState::default(); room_count];
        let mut spawn: Option<TilePos> = None;
        let mut ships: Vec<TilePos> = Vec::new();
        let mut ship_tiles: HashSet<TilePos> = HashSet::new();
        let mut ship_rooms: HashSet<usize> = HashSet::new();

        let width = self.room_width * room_count as i32;
        for row in 0..self.room_height {
            for col in 0..width {
                let pos = TilePos::new(col, row);
                let room = (col / self.room_width) as usize;
                let code = map.tile_at(col, row);
                let Some(kind) = classify(code) else {
                    continue;
                };

                match kind {
                    TileKind::Spawn => {
                        if let Some(first) = spawn {
                            return Err(LevelFormatError::DuplicateSpawn { first, pos });
                        }
                        map.set_tile(col, row, EMPTY);
                        spawn = Some(pos);
                    }
                    TileKind::Key(color) => rooms[room].keys[color.index()].locations.push(pos),
                    TileKind::Button(color) => {
                        rooms[room].buttons[color.index()].locations.push(pos)
                    }
                    TileKind::DoorTop(color) => {
                        if row == self.room_height - 1 {
                            return Err(LevelFormatError::TopDoorOnBottomEdge { pos });
                        }
                        let below = classify(map.tile_at(col, row + 1));
                        if below != Some(TileKind::DoorBottom(color)) {
                            return Err(LevelFormatError::MissingBottomDoor {
                                pos: TilePos::new(col, row + 1),
                            });
                        }
                        rooms[room].doors[color.index()].locations.push(pos);
                    }
                    TileKind::DoorBottom(color) => {
                        if row == 0 {
                            return Err(LevelFormatError::BottomDoorOnTopEdge { pos });
                        }
                        let above = classify(map.tile_at(col, row - 1));
                        if above != Some(TileKind::DoorTop(color)) {
                            return Err(LevelFormatError::MissingTopDoor {
                                pos: TilePos::new(col, row - 1),
                            });
                        }
                    }
                    TileKind::ShipPart if code == SHIP_TOP_LEFT => {
                        if !ship_rooms.insert(room) {
                            return Err(LevelFormatError::DuplicateShip { room, pos });
                        }
                        let footprint =
                            SHIP_OFFSETS.map(|(dc, dr)| TilePos::new(col + dc, row + dr));
                        let complete = footprint.iter().all(|p| {
                            classify(map.tile_at(p.col, p.row)) == Some(TileKind::ShipPart)
                        });
                        if !complete {
                            return Err(LevelFormatError::IncompleteShip { pos });
                        }
                        ship_tiles.extend(footprint);
                        ships.push(pos);
                    }
                    TileKind::ShipPart => {
                        if !ship_tiles.contains(&pos) {
                            return Err(LevelFormatError::StrayShipTile { pos });
                        }
                    }
                    TileKind::Wall | TileKind::Fire | TileKind::EndMarker => {}
                }
            }
        }

        let spawn = spawn.map_or((0, 0), TilePos::to_pixels);
        info!(rooms = room_count, ships = ships.len(), ?spawn, "level loaded");
        Ok(LoadedLevel {
            room_count,
            rooms,
            spawn,
            ships,
        })
    }
}

/// Load with the default 16×16 room geometry.
pub fn load_level(map: &mut impl Tilemap) -> Result<LoadedLevel, LevelFormatError> {
    LevelLoader::default().load(map)
}

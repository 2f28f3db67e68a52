/// The per-frame game step.
///
/// `tick` is the only entry point that advances time.  It owns the ordering
/// between room transitions, the player and the gate objects; each of those
/// knows nothing about the others beyond what is passed in.

use tracing::info;

use crate::entities::{Difficulty, GameStatus, InputSnapshot, TilePos};
use crate::level::{LevelFormatError, LevelLoader};
use crate::player::{Player, StepOutcome};
use crate::room::{RoomManager, ROOM_TILES};
use crate::tilemap::Tilemap;
use crate::tiles::{EMPTY, SHIP_OFFSETS};

/// Logical frames per second.  Elapsed time is reported in these units.
pub const FRAMES_PER_SECOND: u64 = 30;

#[derive(Clone, Debug)]
pub struct GameState<M: Tilemap> {
    pub map: M,
    pub player: Player,
    pub rooms: RoomManager,
    pub ships: Vec<TilePos>,
    pub difficulty: Difficulty,
    pub status: GameStatus,
    pub frame: u64,
    /// Anchor of the ship the player boarded, set on the winning frame.
    pub launched_ship: Option<TilePos>,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Validate `map` with the default room geometry and place the player on
/// its spawn.
pub fn init_state<M: Tilemap>(
    map: M,
    difficulty: Difficulty,
) -> Result<GameState<M>, LevelFormatError> {
    init_state_with(&LevelLoader::default(), map, difficulty)
}

pub fn init_state_with<M: Tilemap>(
    loader: &LevelLoader,
    mut map: M,
    difficulty: Difficulty,
) -> Result<GameState<M>, LevelFormatError> {
    let level = loader.load(&mut map)?;
    info!(difficulty = difficulty.label(), "level started");
    Ok(GameState {
        map,
        player: Player::new(level.spawn),
        rooms: RoomManager::new(level.rooms, level.spawn),
        ships: level.ships,
        difficulty,
        status: GameStatus::Playing,
        frame: 0,
        launched_ship: None,
    })
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the game by one frame.
///
/// Order: room transition and snapshot, player, rollback on death, gate
/// objects of the active room, win check.  Does nothing once the game is won.
pub fn tick<M: Tilemap>(state: &mut GameState<M>, input: InputSnapshot) {
    if state.status != GameStatus::Playing {
        return;
    }
    state.frame += 1;

    state.rooms.follow(&state.player);

    let checkpoint = state.rooms.checkpoint();
    let outcome = state
        .player
        .update(&state.map, input, checkpoint, state.rooms.active_mut());
    if outcome == StepOutcome::Died {
        state.rooms.rollback();
    }

    state.rooms.active_mut().tick(&mut state.map);

    if state.player.won {
        state.status = GameStatus::Won {
            frames: state.frame,
        };
        launch_ship(state);
        info!(
            frames = state.frame,
            seconds = elapsed_seconds(state.frame),
            "level complete"
        );
    }
}

/// Lift the active room's ship out of the grid so the front end can animate
/// it separately.
fn launch_ship<M: Tilemap>(state: &mut GameState<M>) {
    let room = state.rooms.active_index() as i32;
    let Some(&anchor) = state
        .ships
        .iter()
        .find(|ship| ship.col.div_euclid(ROOM_TILES) == room)
    else {
        return;
    };
    for (dc, dr) in SHIP_OFFSETS {
        state.map.set_tile(anchor.col + dc, anchor.row + dr, EMPTY);
    }
    state.launched_ship = Some(anchor);
}

/// Seconds elapsed for `frames` ticks, rounded half up.
pub fn elapsed_seconds(frames: u64) -> u64 {
    (frames + FRAMES_PER_SECOND / 2) / FRAMES_PER_SECOND
}

//! SpaceWarp: a tile-based platformer engine.
//!
//! The crate is the simulation core (tiles, level validation, gate
//! objects, player physics, rooms and the frame step) plus the bits of
//! configuration the terminal front end in `main.rs` needs to start a level.

use thiserror::Error;

pub mod compute;
pub mod config;
pub mod entities;
pub mod gates;
pub mod level;
pub mod player;
pub mod room;
pub mod tilemap;
pub mod tiles;

use compute::GameState;
use config::ConfigError;
use entities::Difficulty;
use level::LevelFormatError;
use tilemap::{GridTilemap, TilemapError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("level for {difficulty} is not a valid tile grid: {source}")]
    Tilemap {
        difficulty: &'static str,
        #[source]
        source: TilemapError,
    },
    #[error("level for {difficulty} is malformed: {source}")]
    Level {
        difficulty: &'static str,
        #[source]
        source: LevelFormatError,
    },
}

/// Read, parse and validate the level for `difficulty`.
pub fn start_level(difficulty: Difficulty) -> Result<GameState<GridTilemap>, StartupError> {
    let text = config::level_text(difficulty)?;
    let map = GridTilemap::parse(&text).map_err(|source| StartupError::Tilemap {
        difficulty: difficulty.label(),
        source,
    })?;
    compute::init_state(map, difficulty).map_err(|source| StartupError::Level {
        difficulty: difficulty.label(),
        source,
    })
}

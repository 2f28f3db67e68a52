/// Runtime configuration: where levels and logs come from.
///
/// Levels ship inside the binary.  Setting `SPACEWARP_LEVEL_DIR` makes the
/// game read `<dir>/<difficulty>.txt` instead, which is how level authors
/// test edits without rebuilding.

use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::entities::Difficulty;

pub const LEVEL_DIR_ENV_VAR: &str = "SPACEWARP_LEVEL_DIR";
pub const LOG_FILE_ENV_VAR: &str = "SPACEWARP_LOG";
const DEFAULT_LOG_FILE: &str = "spacewarp.log";

const EASY_LEVEL: &str = include_str!("../levels/easy.txt");
const NORMAL_LEVEL: &str = include_str!("../levels/normal.txt");
const HARD_LEVEL: &str = include_str!("../levels/hard.txt");
const LUNATIC_LEVEL: &str = include_str!("../levels/lunatic.txt");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read level file {path}: {source}")]
    ReadLevel {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Level text bundled with the binary.
pub fn embedded_level(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => EASY_LEVEL,
        Difficulty::Normal => NORMAL_LEVEL,
        Difficulty::Hard => HARD_LEVEL,
        Difficulty::Lunatic => LUNATIC_LEVEL,
    }
}

/// Level text for `difficulty`, honouring the override directory.
pub fn level_text(difficulty: Difficulty) -> Result<Cow<'static, str>, ConfigError> {
    let Some(dir) = env::var_os(LEVEL_DIR_ENV_VAR) else {
        return Ok(Cow::Borrowed(embedded_level(difficulty)));
    };
    let path = PathBuf::from(dir).join(format!("{}.txt", difficulty.level_name()));
    info!(path = %path.display(), "loading level override");
    fs::read_to_string(&path)
        .map(Cow::Owned)
        .map_err(|source| ConfigError::ReadLevel { path, source })
}

/// Log destination.  The terminal is in raw mode while playing, so logs go
/// to a file rather than stderr.
pub fn log_file_path() -> PathBuf {
    env::var_os(LOG_FILE_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join(DEFAULT_LOG_FILE))
}

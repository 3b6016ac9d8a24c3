use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{MAX_CELL_SIZE, MIN_CELL_SIZE};

/// Setup errors reported by the engine. Fatal to the call, never to the process.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum GameError {
    #[error("cell size {size} is outside {}..={}", MIN_CELL_SIZE, MAX_CELL_SIZE)]
    InvalidCellSize { size: u32 },
    #[error("snake start direction must be a moving direction")]
    InvalidStartDirection,
    #[error("snake needs at least one segment behind the head")]
    InvalidStartSegments,
}

/// Errors raised while loading the JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

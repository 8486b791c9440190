use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading levels and configuration.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to parse tilemap: {0}")]
    MapParse(#[source] serde_json::Error),

    #[error("tilemap has no tile layer named `{0}`")]
    MissingLayer(String),

    #[error("layer `{name}` holds {actual} tiles, expected {expected}")]
    LayerSize {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("tile gid {0} does not belong to any tileset")]
    UnknownGid(u32),

    #[error("unsupported map: {0}")]
    UnsupportedMap(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type GameResult<T> = std::result::Result<T, GameError>;

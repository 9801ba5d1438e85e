use std::path::PathBuf;

use thiserror::Error;

use crate::world::TileId;

/// Failures raised while building the inputs of a frame.
///
/// Rendering itself never fails: once a world, its textures and the config are
/// constructed, every lookup made by the caster is valid.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("texture of {width}x{height} needs {expected} pixels, got {actual}")]
    TextureSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid tile grid: {0}")]
    Grid(String),

    #[error("tile ({x}, {y}) uses texture id {id} but only {available} textures are loaded")]
    MissingTexture {
        id: TileId,
        x: usize,
        y: usize,
        available: usize,
    },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Error types for data file loading.

use thiserror::Error;

/// Errors that can occur when loading stage, archetype or config data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// A layer's grids don't have the same dimensions.
    #[error("Grid mismatch on layer {layer}: floor is {floor_width}x{floor_depth}, monsters is {monster_width}x{monster_depth}")]
    GridMismatch {
        layer: i32,
        floor_width: usize,
        floor_depth: usize,
        monster_width: usize,
        monster_depth: usize,
    },

    /// Invalid palette reference.
    #[error("Unknown palette entry '{character}' at position ({x}, {z})")]
    UnknownPaletteEntry { character: char, x: usize, z: usize },

    /// A stage references an enemy archetype that was never defined.
    #[error("Unknown enemy archetype '{0}'")]
    UnknownArchetype(String),
}

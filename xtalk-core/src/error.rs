//! Error types for xtalk-core.

use thiserror::Error;

/// Result type alias for xtalk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for crosstalk analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Cell coordinate outside the detector grid.
    #[error("cell coordinate ({x}, {y}) outside {side}x{side} grid")]
    InvalidCoordinate { x: u32, y: u32, side: u32 },

    /// File name does not follow the `root_X<n>_Y<n>.<ext>` convention.
    #[error("file name does not encode a cell coordinate: {0}")]
    InvalidFileName(String),

    /// Two point-mode files encode the same cell.
    #[error("more than one input file for cell ({x}, {y})")]
    DuplicateCell { x: u32, y: u32 },

    /// File count cannot form a square grid.
    #[error("cannot form a square grid from {0} input files")]
    DegenerateGrid(usize),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No input files matched.
    #[error("no input files matching '{marker}' in {}", dir.display())]
    EmptyInput { dir: PathBuf, marker: String },

    /// An event line or row could not be decoded.
    #[error("malformed event in {} at record {record}: {message}", path.display())]
    MalformedEvent {
        path: PathBuf,
        record: usize,
        message: String,
    },

    /// Input format not available in this build.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// Summary serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HDF5 error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] xtalk_core::Error),
}

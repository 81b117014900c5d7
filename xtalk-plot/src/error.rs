//! Rendering error types.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rendering error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Drawing backend error, carried as text since backend errors are
    /// generic over the backend.
    #[error("drawing error: {0}")]
    Drawing(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Drawing(err.to_string())
    }
}

//! Error types for figure rendering.

use std::fmt::Display;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FigureError {
    #[error("No orbit produced any drawable data")]
    NothingToDraw,

    #[error("Drawing failed: {0}")]
    Draw(String),

    #[error("Unsupported output format: {0}")]
    Format(String),

    #[error("Failed to load coastline: {0}")]
    Coastline(String),

    #[error(transparent)]
    Reader(#[from] mighti_reader::ReaderError),
}

impl FigureError {
    /// Wrap a backend drawing error, which is generic over the backend and
    /// only needs to survive as text.
    pub fn draw(err: impl Display) -> Self {
        FigureError::Draw(err.to_string())
    }
}

pub type FigureResult<T> = std::result::Result<T, FigureError>;

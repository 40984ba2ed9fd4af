//! Error types for the reader crate.

use thiserror::Error;

use crate::orbits::LonWindow;

/// Errors that can occur while loading or segmenting wind data.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: netcdf::Error,
    },

    #[error("Missing required variable: {0}")]
    MissingVariable(String),

    #[error("Variable {name} has unexpected shape: {detail}")]
    Shape { name: String, detail: String },

    #[error("No altitude level within {tolerance} km of {target} km (nearest is {nearest} km)")]
    LevelOutOfTolerance {
        target: f64,
        nearest: f64,
        tolerance: f64,
    },

    #[error("Dataset contains no valid observations")]
    Empty,

    #[error("No ground-track points inside sector window {window}")]
    NoSectorCrossing { window: LonWindow },

    #[error("Orbit position {position} is out of range: {discovered} orbits discovered")]
    PositionOutOfRange { position: usize, discovered: usize },

    #[error("Only {available} discovered orbits cross the sector window, {requested} requested")]
    NotEnoughCrossings { requested: usize, available: usize },

    #[error("NetCDF read failed: {0}")]
    NetCdf(#[from] netcdf::Error),
}

/// Result type for reader operations.
pub type ReaderResult<T> = std::result::Result<T, ReaderError>;

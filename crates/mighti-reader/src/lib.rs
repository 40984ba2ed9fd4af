//! Reader for ICON MIGHTI L2.2 vector-wind granules.
//!
//! The crate turns one NetCDF granule into a flat, time-ordered wind table
//! at a chosen altitude level, then offers the orbit operations the wind
//! figure is built from: discovering which orbit passes the granule holds,
//! slicing out one orbit's rows, and locating each pass's crossing of a
//! longitude sector.

pub mod error;
pub mod loader;
pub mod orbits;
pub mod product;
pub mod table;

pub use error::{ReaderError, ReaderResult};
pub use loader::{
    load_wind_table, shift_longitude, silence_hdf5_errors, LoadOptions, DEFAULT_ALTITUDE_KM,
};
pub use orbits::{
    discover_orbits, filter_by_orbit, sector_span, LonWindow, OrbitSelection, SectorSpan,
};
pub use product::{Field, ProductMap, Release};
pub use table::{OrbitId, OrbitSubset, WindTable, SUBSET_COLUMNS};

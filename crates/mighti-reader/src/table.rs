//! Flat observation tables produced by the loader and the orbit segmenter.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integer label partitioning the time series into satellite revolutions.
///
/// Uniqueness is only established within the longitude window used for
/// discovery, not globally across the mission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OrbitId(pub i32);

impl fmt::Display for OrbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrbitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OrbitId(s.trim().parse()?))
    }
}

/// One row per observation time at the selected altitude level.
///
/// Columns are parallel vectors; the loader keeps them equal length and the
/// table is never mutated after it is built.
#[derive(Debug, Clone, Default)]
pub struct WindTable {
    pub times: Vec<DateTime<Utc>>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub zonal_wind: Vec<f64>,
    pub meridional_wind: Vec<f64>,
    pub local_solar_time: Vec<f64>,
    pub magnetic_zonal_wind: Vec<f64>,
    pub magnetic_meridional_wind: Vec<f64>,
    pub magnetic_field_aligned_wind: Vec<f64>,
    pub utc_time: Vec<String>,
    pub orbit_number: Vec<OrbitId>,
    /// Altitude (km) of the level the loader selected.
    pub level_km: f64,
}

impl WindTable {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Column order of the fixed projection produced by the orbit filter.
pub const SUBSET_COLUMNS: [&str; 10] = [
    "longitude",
    "latitude",
    "meridional_wind",
    "zonal_wind",
    "local_solar_time",
    "magnetic_zonal_wind",
    "magnetic_meridional_wind",
    "magnetic_field_aligned_wind",
    "utc_time",
    "orbit_number",
];

/// Rows of one orbit, re-indexed to whole-second times and restricted to
/// the fixed column list ([`SUBSET_COLUMNS`]).
///
/// Every subset is an independent copy; it never aliases the wind table.
#[derive(Debug, Clone)]
pub struct OrbitSubset {
    /// The identifier the filter was asked for, also when no rows match.
    pub orbit: OrbitId,
    pub times: Vec<DateTime<Utc>>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub meridional_wind: Vec<f64>,
    pub zonal_wind: Vec<f64>,
    pub local_solar_time: Vec<f64>,
    pub magnetic_zonal_wind: Vec<f64>,
    pub magnetic_meridional_wind: Vec<f64>,
    pub magnetic_field_aligned_wind: Vec<f64>,
    pub utc_time: Vec<String>,
    pub orbit_number: Vec<OrbitId>,
}

impl OrbitSubset {
    /// A subset with the right column structure and no rows.
    pub fn empty(orbit: OrbitId) -> Self {
        Self {
            orbit,
            times: Vec::new(),
            longitude: Vec::new(),
            latitude: Vec::new(),
            meridional_wind: Vec::new(),
            zonal_wind: Vec::new(),
            local_solar_time: Vec::new(),
            magnetic_zonal_wind: Vec::new(),
            magnetic_meridional_wind: Vec::new(),
            magnetic_field_aligned_wind: Vec::new(),
            utc_time: Vec::new(),
            orbit_number: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_id_parses_and_displays() {
        let id: OrbitId = " 5233 ".parse().expect("parse");
        assert_eq!(id, OrbitId(5233));
        assert_eq!(id.to_string(), "5233");
        assert!("orbit".parse::<OrbitId>().is_err());
    }

    #[test]
    fn empty_subset_has_fixed_columns_and_no_rows() {
        let subset = OrbitSubset::empty(OrbitId(9));
        assert!(subset.is_empty());
        assert_eq!(subset.orbit, OrbitId(9));
        assert_eq!(SUBSET_COLUMNS.len(), 10);
        assert_eq!(SUBSET_COLUMNS[0], "longitude");
        assert_eq!(SUBSET_COLUMNS[9], "orbit_number");
    }
}

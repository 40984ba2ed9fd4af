//! Generators for synthetic wind tables.
//!
//! The generators build predictable, verifiable tables so tests can assert
//! exact values instead of eyeballing plots.

use chrono::{DateTime, Duration, TimeZone, Utc};
use mighti_reader::{OrbitId, WindTable, DEFAULT_ALTITUDE_KM};

/// Start-of-day timestamp shared by the synthetic tables.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 7, 25, 0, 0, 0).unwrap()
}

/// Builds a single-orbit table whose row `i` follows fixed laws:
///
/// - `longitude` is taken from `lons` as given (already signed degrees)
/// - `latitude` is `-10 + 5 * i`
/// - `zonal_wind` is `orbit * 100 + i`, `meridional_wind` its negation
/// - magnetic zonal/meridional winds are half their geographic twins,
///   the field-aligned wind is `0.5 * i`
/// - `local_solar_time` is `12 + 0.01 * i` hours
/// - `times` advance by `step_secs` from `start`
///
/// # Example
///
/// ```
/// use test_utils::generators::{base_time, track_table};
///
/// let table = track_table(7, &[-65.0, -45.0], base_time(), 60);
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.zonal_wind[1], 701.0);
/// assert_eq!(table.meridional_wind[1], -701.0);
/// ```
pub fn track_table(orbit: i32, lons: &[f64], start: DateTime<Utc>, step_secs: i64) -> WindTable {
    let mut table = WindTable {
        level_km: DEFAULT_ALTITUDE_KM,
        ..WindTable::default()
    };
    append_track(&mut table, orbit, lons, start, step_secs);
    table
}

/// Appends one orbit's track to an existing table, same laws as
/// [`track_table`].
pub fn append_track(
    table: &mut WindTable,
    orbit: i32,
    lons: &[f64],
    start: DateTime<Utc>,
    step_secs: i64,
) {
    for (i, &lon) in lons.iter().enumerate() {
        let time = start + Duration::seconds(step_secs * i as i64);
        let zonal = (orbit * 100 + i as i32) as f64;
        table.times.push(time);
        table.longitude.push(lon);
        table.latitude.push(-10.0 + 5.0 * i as f64);
        table.zonal_wind.push(zonal);
        table.meridional_wind.push(-zonal);
        table.local_solar_time.push(12.0 + 0.01 * i as f64);
        table.magnetic_zonal_wind.push(zonal / 2.0);
        table.magnetic_meridional_wind.push(-zonal / 2.0);
        table.magnetic_field_aligned_wind.push(0.5 * i as f64);
        table
            .utc_time
            .push(time.format("%Y-%m-%d %H:%M:%S%.3f").to_string());
        table.orbit_number.push(OrbitId(orbit));
    }
}

/// Builds a table holding `count` consecutive orbits, numbered from 5230.
///
/// Every orbit flies the same five-point track through the south-Atlantic
/// longitudes `[-65, -55, -45, -35, -25]`, one observation per minute, and
/// successive orbits start 97 minutes apart. With six or more orbits the
/// discovery positions 3, 4 and 5 are orbits 5233, 5234 and 5235.
pub fn multi_orbit_table(count: usize) -> WindTable {
    let lons = [-65.0, -55.0, -45.0, -35.0, -25.0];
    let mut table = WindTable {
        level_km: DEFAULT_ALTITUDE_KM,
        ..WindTable::default()
    };
    for n in 0..count {
        let orbit = 5230 + n as i32;
        let start = base_time() + Duration::minutes(97 * n as i64);
        append_track(&mut table, orbit, &lons, start, 60);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_rows_follow_the_documented_laws() {
        let table = track_table(7, &[-65.0, -55.0, -45.0], base_time(), 60);
        assert_eq!(table.len(), 3);
        assert_eq!(table.longitude, vec![-65.0, -55.0, -45.0]);
        assert_eq!(table.latitude, vec![-10.0, -5.0, 0.0]);
        assert_eq!(table.zonal_wind[2], 702.0);
        assert_eq!(table.meridional_wind[2], -702.0);
        assert_eq!(table.magnetic_zonal_wind[2], 351.0);
        assert_eq!(table.magnetic_field_aligned_wind[2], 1.0);
        assert_eq!(table.times[2], base_time() + Duration::seconds(120));
        assert_eq!(table.orbit_number[2], OrbitId(7));
        assert_eq!(table.utc_time[0], "2022-07-25 00:00:00.000");
        assert_eq!(table.level_km, DEFAULT_ALTITUDE_KM);
    }

    #[test]
    fn multi_orbit_tables_are_chronological() {
        let table = multi_orbit_table(3);
        assert_eq!(table.len(), 15);
        for pair in table.times.windows(2) {
            assert!(pair[0] <= pair[1], "rows must not go backwards in time");
        }
        assert_eq!(table.orbit_number[0], OrbitId(5230));
        assert_eq!(table.orbit_number[14], OrbitId(5232));
        assert_eq!(
            table.times[5],
            base_time() + Duration::minutes(97),
            "second orbit starts one orbital period later"
        );
    }
}

//! Orbit discovery, per-orbit filtering, and sector crossings.
//!
//! An orbit "counts" when at least one of its observations falls inside the
//! discovery longitude window; discovery order is chronological because the
//! table rows are. The narrower sector window bounds the stretch of each
//! pass that the figure highlights.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReaderError, ReaderResult};
use crate::table::{OrbitId, OrbitSubset, WindTable};

/// Open longitude interval in degrees; both endpoints are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonWindow {
    pub start: f64,
    pub end: f64,
}

impl LonWindow {
    /// Window that decides which orbits the granule contains.
    pub const DISCOVERY: LonWindow = LonWindow {
        start: -60.0,
        end: -30.0,
    };

    /// Narrower window bounding the highlighted stretch of each pass.
    pub const SECTOR: LonWindow = LonWindow {
        start: -50.0,
        end: -40.0,
    };

    pub fn contains(&self, lon: f64) -> bool {
        lon > self.start && lon < self.end
    }
}

impl fmt::Display for LonWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

impl FromStr for LonWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(',')
            .ok_or_else(|| format!("expected START,END degrees, got {s:?}"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad longitude {part:?}: {e}"))
        };
        Ok(LonWindow {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

/// Orbit numbers with at least one observation inside `window`, in order of
/// first appearance.
pub fn discover_orbits(table: &WindTable, window: LonWindow) -> Vec<OrbitId> {
    let mut orbits = Vec::new();
    for (lon, &orbit) in table.longitude.iter().zip(&table.orbit_number) {
        if window.contains(*lon) && !orbits.contains(&orbit) {
            orbits.push(orbit);
        }
    }
    debug!(count = orbits.len(), ?window, "Discovered orbits in window");
    orbits
}

/// Rows belonging to one orbit, with timestamps truncated to whole seconds.
pub fn filter_by_orbit(table: &WindTable, orbit: OrbitId) -> OrbitSubset {
    let mut subset = OrbitSubset::empty(orbit);
    for i in 0..table.len() {
        if table.orbit_number[i] != orbit {
            continue;
        }
        subset.times.push(table.times[i].trunc_subsecs(0));
        subset.longitude.push(table.longitude[i]);
        subset.latitude.push(table.latitude[i]);
        subset.zonal_wind.push(table.zonal_wind[i]);
        subset.meridional_wind.push(table.meridional_wind[i]);
        subset.local_solar_time.push(table.local_solar_time[i]);
        subset.magnetic_zonal_wind.push(table.magnetic_zonal_wind[i]);
        subset
            .magnetic_meridional_wind
            .push(table.magnetic_meridional_wind[i]);
        subset
            .magnetic_field_aligned_wind
            .push(table.magnetic_field_aligned_wind[i]);
        subset.utc_time.push(table.utc_time[i].clone());
        subset.orbit_number.push(table.orbit_number[i]);
    }
    subset
}

/// First and last timestamps of an orbit's pass through a sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorSpan {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
}

impl SectorSpan {
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.first + (self.last - self.first) / 2
    }
}

/// Timestamps bounding `subset`'s crossing of `window`.
///
/// A single in-window observation is a valid crossing with `first == last`;
/// no in-window observation is a [`ReaderError::NoSectorCrossing`].
pub fn sector_span(subset: &OrbitSubset, window: LonWindow) -> ReaderResult<SectorSpan> {
    let mut crossing = subset
        .times
        .iter()
        .zip(&subset.longitude)
        .filter(|(_, lon)| window.contains(**lon))
        .map(|(time, _)| *time);
    let first = crossing
        .next()
        .ok_or(ReaderError::NoSectorCrossing { window })?;
    let last = crossing.last().unwrap_or(first);
    Ok(SectorSpan { first, last })
}

/// How to pick which discovered orbits end up in the figure.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitSelection {
    /// Exact orbit numbers.
    Ids(Vec<OrbitId>),
    /// Zero-based positions into the discovery order.
    Positions(Vec<usize>),
    /// The `count` orbits whose sector midpoints sit closest to `reference`.
    NearestTo {
        reference: DateTime<Utc>,
        count: usize,
    },
}

impl Default for OrbitSelection {
    fn default() -> Self {
        OrbitSelection::Positions(vec![3, 4, 5])
    }
}

impl OrbitSelection {
    /// Resolve the policy against the discovery order, keeping the result in
    /// discovery order.
    pub fn resolve(
        &self,
        discovered: &[OrbitId],
        table: &WindTable,
        sector: LonWindow,
    ) -> ReaderResult<Vec<OrbitId>> {
        match self {
            OrbitSelection::Ids(ids) => Ok(ids.clone()),
            OrbitSelection::Positions(positions) => positions
                .iter()
                .map(|&position| {
                    discovered.get(position).copied().ok_or_else(|| {
                        ReaderError::PositionOutOfRange {
                            position,
                            discovered: discovered.len(),
                        }
                    })
                })
                .collect(),
            OrbitSelection::NearestTo { reference, count } => {
                let mut candidates = Vec::new();
                for (index, &orbit) in discovered.iter().enumerate() {
                    let subset = filter_by_orbit(table, orbit);
                    let Ok(span) = sector_span(&subset, sector) else {
                        continue;
                    };
                    let offset = (span.midpoint() - *reference).abs();
                    candidates.push((offset, index, orbit));
                }
                if candidates.len() < *count {
                    return Err(ReaderError::NotEnoughCrossings {
                        requested: *count,
                        available: candidates.len(),
                    });
                }
                candidates.sort_by_key(|&(offset, index, _)| (offset, index));
                candidates.truncate(*count);
                candidates.sort_by_key(|&(_, index, _)| index);
                Ok(candidates.into_iter().map(|(_, _, orbit)| orbit).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // Import through the external crate name (see the self dev-dependency in
    // Cargo.toml) so these types unify with the ones test-utils returns.
    use chrono::{TimeZone, Utc};
    use mighti_reader::{
        discover_orbits, filter_by_orbit, sector_span, LonWindow, OrbitId, OrbitSelection,
        ReaderError,
    };
    use test_utils::generators::{base_time, multi_orbit_table, track_table};

    #[test]
    fn open_window_excludes_both_endpoints() {
        let window = LonWindow::DISCOVERY;
        assert!(!window.contains(-60.0));
        assert!(!window.contains(-30.0));
        assert!(window.contains(-59.999));
        assert!(window.contains(-45.0));
        assert!(window.contains(-30.001));
        assert!(!window.contains(-25.0));
    }

    #[test]
    fn window_parses_and_round_trips() {
        let window: LonWindow = "-60,-30".parse().expect("parse");
        assert_eq!(window, LonWindow::DISCOVERY);
        let round: LonWindow = window.to_string().parse().expect("round trip");
        assert_eq!(round, window);
        assert!("not-a-window".parse::<LonWindow>().is_err());
        assert!("-60,east".parse::<LonWindow>().is_err());
    }

    #[test]
    fn track_with_one_in_window_longitude_discovers_the_orbit() {
        let table = track_table(7, &[-65.0, -55.0, -45.0, -35.0, -25.0], base_time(), 60);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        assert_eq!(discovered, vec![OrbitId(7)]);
    }

    #[test]
    fn discovery_reports_orbits_in_first_appearance_order() {
        let table = multi_orbit_table(4);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        assert_eq!(
            discovered,
            vec![OrbitId(5230), OrbitId(5231), OrbitId(5232), OrbitId(5233)]
        );
        // Discovery over its own output order is stable.
        assert_eq!(discover_orbits(&table, LonWindow::DISCOVERY), discovered);
    }

    #[test]
    fn filtering_an_absent_orbit_yields_an_empty_subset() {
        let table = multi_orbit_table(2);
        let subset = filter_by_orbit(&table, OrbitId(9999));
        assert!(subset.is_empty());
        assert_eq!(subset.orbit, OrbitId(9999));
        assert!(subset.utc_time.is_empty());
        assert!(subset.magnetic_field_aligned_wind.is_empty());
    }

    #[test]
    fn filtering_truncates_to_whole_seconds_idempotently() {
        let start = Utc.with_ymd_and_hms(2022, 7, 25, 1, 2, 3).unwrap()
            + chrono::Duration::milliseconds(750);
        let table = track_table(12, &[-45.0, -44.0], start, 60);
        let subset = filter_by_orbit(&table, OrbitId(12));
        assert_eq!(
            subset.times[0],
            Utc.with_ymd_and_hms(2022, 7, 25, 1, 2, 3).unwrap()
        );

        // Truncating the already-truncated rows changes nothing.
        let mut rounded = table.clone();
        rounded.times = subset.times.clone();
        let again = filter_by_orbit(&rounded, OrbitId(12));
        assert_eq!(again.times, subset.times);
    }

    #[test]
    fn single_sector_row_bounds_the_span_on_both_ends() {
        let table = track_table(7, &[-65.0, -55.0, -45.0, -35.0, -25.0], base_time(), 60);
        let subset = filter_by_orbit(&table, OrbitId(7));
        let span = sector_span(&subset, LonWindow::SECTOR).expect("span");
        assert_eq!(span.first, span.last);
        assert_eq!(span.first, base_time() + chrono::Duration::seconds(120));
        assert_eq!(span.midpoint(), span.first);
    }

    #[test]
    fn orbit_without_sector_rows_is_a_named_error() {
        let table = track_table(3, &[-65.0, -55.0, -35.0, -25.0], base_time(), 60);
        let subset = filter_by_orbit(&table, OrbitId(3));
        let err = sector_span(&subset, LonWindow::SECTOR).unwrap_err();
        match err {
            ReaderError::NoSectorCrossing { window } => assert_eq!(window, LonWindow::SECTOR),
            other => panic!("expected NoSectorCrossing, got {other:?}"),
        }
    }

    #[test]
    fn default_selection_takes_positions_three_to_five() {
        let table = multi_orbit_table(6);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        let picked = OrbitSelection::default()
            .resolve(&discovered, &table, LonWindow::SECTOR)
            .expect("resolve");
        assert_eq!(picked, vec![OrbitId(5233), OrbitId(5234), OrbitId(5235)]);
    }

    #[test]
    fn position_past_the_discovery_list_is_reported() {
        let table = multi_orbit_table(2);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        let err = OrbitSelection::Positions(vec![0, 5])
            .resolve(&discovered, &table, LonWindow::SECTOR)
            .unwrap_err();
        assert!(matches!(
            err,
            ReaderError::PositionOutOfRange {
                position: 5,
                discovered: 2
            }
        ));
    }

    #[test]
    fn explicit_ids_pass_through_untouched() {
        let table = multi_orbit_table(2);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        let picked = OrbitSelection::Ids(vec![OrbitId(5231)])
            .resolve(&discovered, &table, LonWindow::SECTOR)
            .expect("resolve");
        assert_eq!(picked, vec![OrbitId(5231)]);
    }

    #[test]
    fn nearest_selection_picks_midpoints_closest_to_the_reference() {
        let table = multi_orbit_table(6);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        // Sector midpoint of the second orbit (5231). Each orbit starts 97
        // minutes after the previous one, so 5231 and its neighbours win.
        let reference = base_time() + chrono::Duration::minutes(97) + chrono::Duration::seconds(120);
        let picked = OrbitSelection::NearestTo {
            reference,
            count: 3,
        }
        .resolve(&discovered, &table, LonWindow::SECTOR)
        .expect("resolve");
        assert_eq!(picked, vec![OrbitId(5230), OrbitId(5231), OrbitId(5232)]);
    }

    #[test]
    fn nearest_selection_needs_enough_crossings() {
        let table = multi_orbit_table(2);
        let discovered = discover_orbits(&table, LonWindow::DISCOVERY);
        let err = OrbitSelection::NearestTo {
            reference: base_time(),
            count: 5,
        }
        .resolve(&discovered, &table, LonWindow::SECTOR)
        .unwrap_err();
        assert!(matches!(
            err,
            ReaderError::NotEnoughCrossings {
                requested: 5,
                available: 2
            }
        ));
    }
}

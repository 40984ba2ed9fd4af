//! NetCDF loading for the MIGHTI vector-wind product.
//!
//! Opens one granule, decodes the millisecond epoch, maps raw variables
//! through the release's field table, shifts longitude into the signed
//! convention, slices the altitude level nearest the target, and flattens
//! everything into a [`WindTable`].

use std::path::Path;
use std::sync::Once;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{ReaderError, ReaderResult};
use crate::product::{Field, ProductMap, Release};
use crate::table::{OrbitId, WindTable};

/// Altitude (km) the red-line vector-wind analysis is run at.
pub const DEFAULT_ALTITUDE_KM: f64 = 253.714098;

/// Loader parameters; defaults match the red-line analysis.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Target altitude in km.
    pub altitude_km: f64,
    /// Maximum accepted |level - target| in km; `None` accepts any nearest level.
    pub tolerance_km: Option<f64>,
    /// Force a specific release table instead of filename detection.
    pub release: Option<Release>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            altitude_km: DEFAULT_ALTITUDE_KM,
            tolerance_km: Some(10.0),
            release: None,
        }
    }
}

/// Convert a 0-360 longitude convention to -180-180 by a pure shift.
pub fn shift_longitude(lon: f64) -> f64 {
    lon - 180.0
}

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics to stderr even when errors
/// are handled gracefully by the Rust code, e.g. when probing for packing
/// attributes a variable does not carry. Safe to call more than once.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and passing null handlers to
        // disable error output is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Load one granule into a flat wind table at the requested altitude.
pub fn load_wind_table(path: &Path, options: &LoadOptions) -> ReaderResult<WindTable> {
    silence_hdf5_errors();

    let map = match options.release {
        Some(release) => ProductMap::for_release(release),
        None => ProductMap::from_filename(path),
    };

    let file = netcdf::open(path).map_err(|source| ReaderError::Open {
        path: path.display().to_string(),
        source,
    })?;

    info!(
        file = %path.display(),
        release = %map.release,
        altitude_km = options.altitude_km,
        "Opened wind product"
    );

    let epoch_var = file
        .variable(map.epoch)
        .ok_or_else(|| ReaderError::MissingVariable(map.epoch.to_string()))?;
    if epoch_var.dimensions().len() != 1 {
        return Err(ReaderError::Shape {
            name: map.epoch.to_string(),
            detail: format!(
                "expected a 1-D time coordinate, got {} dimensions",
                epoch_var.dimensions().len()
            ),
        });
    }
    let times = decode_epoch_millis(&epoch_var)?;
    let n_times = times.len();
    if n_times == 0 {
        return Err(ReaderError::Empty);
    }

    let alt_var = file
        .variable(map.altitude)
        .ok_or_else(|| ReaderError::MissingVariable(map.altitude.to_string()))?;
    if alt_var.dimensions().len() != 1 {
        return Err(ReaderError::Shape {
            name: map.altitude.to_string(),
            detail: format!(
                "expected a 1-D altitude coordinate, got {} dimensions",
                alt_var.dimensions().len()
            ),
        });
    }
    let alt_dim = alt_var.dimensions()[0].name();
    let levels: Vec<f64> = alt_var.get_values(..)?;
    let level_index = nearest_level(
        map.altitude,
        &levels,
        options.altitude_km,
        options.tolerance_km,
    )?;
    let level_km = levels[level_index];

    debug!(level_km, index = level_index, "Selected altitude level");

    let field_column = |field: Field| -> ReaderResult<Vec<f64>> {
        let raw = map
            .raw_name(field)
            .ok_or_else(|| ReaderError::MissingVariable(field.name().to_string()))?;
        read_field_f64(&file, raw, &alt_dim, level_index, n_times)
    };

    let longitude = field_column(Field::Longitude)?;
    let latitude = field_column(Field::Latitude)?;
    let zonal_wind = field_column(Field::ZonalWind)?;
    let meridional_wind = field_column(Field::MeridionalWind)?;
    let local_solar_time = field_column(Field::LocalSolarTime)?;
    let magnetic_zonal_wind = field_column(Field::MagneticZonalWind)?;
    let magnetic_meridional_wind = field_column(Field::MagneticMeridionalWind)?;
    let magnetic_field_aligned_wind = field_column(Field::MagneticFieldAlignedWind)?;
    let orbit_raw = field_column(Field::OrbitNumber)?;

    let utc_name = map
        .raw_name(Field::UtcTime)
        .ok_or_else(|| ReaderError::MissingVariable(Field::UtcTime.name().to_string()))?;
    let utc_var = file
        .variable(utc_name)
        .ok_or_else(|| ReaderError::MissingVariable(utc_name.to_string()))?;
    let utc_strings = match read_char_matrix(&utc_var, n_times) {
        Ok(strings) => Some(strings),
        Err(err) => {
            debug!(error = %err, "UTC time strings unavailable, formatting decoded epochs");
            None
        }
    };

    let mut table = WindTable {
        level_km,
        ..WindTable::default()
    };
    let mut dropped_time = 0usize;
    let mut dropped_orbit = 0usize;
    for i in 0..n_times {
        let Some(time) = times[i] else {
            dropped_time += 1;
            continue;
        };
        if !orbit_raw[i].is_finite() {
            dropped_orbit += 1;
            continue;
        }
        table.times.push(time);
        table.longitude.push(shift_longitude(longitude[i]));
        table.latitude.push(latitude[i]);
        table.zonal_wind.push(zonal_wind[i]);
        table.meridional_wind.push(meridional_wind[i]);
        table.local_solar_time.push(local_solar_time[i]);
        table.magnetic_zonal_wind.push(magnetic_zonal_wind[i]);
        table
            .magnetic_meridional_wind
            .push(magnetic_meridional_wind[i]);
        table
            .magnetic_field_aligned_wind
            .push(magnetic_field_aligned_wind[i]);
        table.utc_time.push(match &utc_strings {
            Some(strings) => strings[i].clone(),
            None => time.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        });
        table.orbit_number.push(OrbitId(orbit_raw[i].round() as i32));
    }

    if table.is_empty() {
        return Err(ReaderError::Empty);
    }
    if dropped_time > 0 || dropped_orbit > 0 {
        warn!(
            dropped_time,
            dropped_orbit, "Dropped rows with missing epoch or orbit number"
        );
    }
    info!(rows = table.len(), level_km = table.level_km, "Flattened wind table");
    Ok(table)
}

/// Decode a millisecond-epoch variable; fill values and out-of-range
/// milliseconds become `None`.
fn decode_epoch_millis(var: &netcdf::Variable) -> ReaderResult<Vec<Option<DateTime<Utc>>>> {
    let raw: Vec<f64> = var.get_values(..)?;
    let fill = attr_f64(var, "_FillValue");
    Ok(raw
        .into_iter()
        .map(|ms| {
            if ms.is_nan() || fill.is_some_and(|f| ms == f) {
                None
            } else {
                DateTime::from_timestamp_millis(ms as i64)
            }
        })
        .collect())
}

/// Index of the finite level nearest `target`, validated against the
/// tolerance when one is set.
fn nearest_level(
    name: &str,
    levels: &[f64],
    target: f64,
    tolerance: Option<f64>,
) -> ReaderResult<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &level) in levels.iter().enumerate() {
        if !level.is_finite() {
            continue;
        }
        let dist = (level - target).abs();
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((index, dist));
        }
    }
    let (index, dist) = best.ok_or_else(|| ReaderError::Shape {
        name: name.to_string(),
        detail: "no finite altitude levels".to_string(),
    })?;
    if let Some(tolerance) = tolerance {
        if dist > tolerance {
            return Err(ReaderError::LevelOutOfTolerance {
                target,
                nearest: levels[index],
                tolerance,
            });
        }
    }
    Ok(index)
}

/// Read one mapped variable as a per-observation column.
///
/// 1-D variables are taken whole; 2-D variables are sliced at the selected
/// altitude level, wherever the altitude dimension sits.
fn read_field_f64(
    file: &netcdf::File,
    raw: &str,
    alt_dim: &str,
    level_index: usize,
    n_times: usize,
) -> ReaderResult<Vec<f64>> {
    let var = file
        .variable(raw)
        .ok_or_else(|| ReaderError::MissingVariable(raw.to_string()))?;
    let dims = var.dimensions();
    let values: Vec<f64> = match dims.len() {
        1 => var.get_values(..)?,
        2 => {
            let alt_pos = dims
                .iter()
                .position(|d| d.name() == alt_dim)
                .ok_or_else(|| ReaderError::Shape {
                    name: raw.to_string(),
                    detail: format!("2-D variable without the {alt_dim} dimension"),
                })?;
            if alt_pos == 0 {
                var.get_values((level_index..level_index + 1, ..))?
            } else {
                var.get_values((.., level_index..level_index + 1))?
            }
        }
        n => {
            return Err(ReaderError::Shape {
                name: raw.to_string(),
                detail: format!("expected 1 or 2 dimensions, got {n}"),
            })
        }
    };
    if values.len() != n_times {
        return Err(ReaderError::Shape {
            name: raw.to_string(),
            detail: format!("{} values for {} observation times", values.len(), n_times),
        });
    }
    Ok(apply_packing(&var, values))
}

/// Map fill values to NaN and apply scale/offset packing attributes.
fn apply_packing(var: &netcdf::Variable, values: Vec<f64>) -> Vec<f64> {
    let fill = attr_f64(var, "_FillValue");
    let scale = attr_f64(var, "scale_factor").unwrap_or(1.0);
    let offset = attr_f64(var, "add_offset").unwrap_or(0.0);
    values
        .into_iter()
        .map(|v| {
            if v.is_nan() || fill.is_some_and(|f| v == f) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect()
}

/// Decode a 2-D character array into trimmed per-row strings.
///
/// The matrix is read as raw bytes: the typed getters only convert between
/// numeric types and refuse the NC_CHAR storage the product files use.
/// Anything but one-byte element storage is rejected before the read.
fn read_char_matrix(var: &netcdf::Variable, n_times: usize) -> ReaderResult<Vec<String>> {
    let dims = var.dimensions();
    if dims.len() != 2 || dims[0].len() != n_times {
        return Err(ReaderError::Shape {
            name: var.name(),
            detail: format!(
                "expected ({n_times}, string-length) character matrix, got {} dimensions",
                dims.len()
            ),
        });
    }
    let elem = var.vartype();
    if elem.size() != 1 {
        return Err(ReaderError::Shape {
            name: var.name(),
            detail: format!("expected one-byte characters, got {elem:?}"),
        });
    }
    let width = dims[1].len().max(1);
    let bytes = var.get_raw_values(..)?;
    Ok(bytes
        .chunks(width)
        .map(|chunk| {
            let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
            String::from_utf8_lossy(&chunk[..end]).trim().to_string()
        })
        .collect())
}

/// Check for an attribute without triggering HDF5 error output.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

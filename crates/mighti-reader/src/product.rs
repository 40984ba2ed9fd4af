//! Declarative mapping from raw product variable names to canonical fields.
//!
//! ICON data products version their variable naming by release. Each release
//! gets its own mapping table, so a renamed variable in a future release is a
//! table edit rather than a change to string-matching logic.

use std::fmt;
use std::path::Path;

use tracing::warn;

/// Canonical observation fields carried by the wind table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Longitude,
    Latitude,
    ZonalWind,
    MeridionalWind,
    LocalSolarTime,
    MagneticZonalWind,
    MagneticMeridionalWind,
    MagneticFieldAlignedWind,
    UtcTime,
    OrbitNumber,
}

impl Field {
    /// Canonical lowercase column name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Longitude => "longitude",
            Field::Latitude => "latitude",
            Field::ZonalWind => "zonal_wind",
            Field::MeridionalWind => "meridional_wind",
            Field::LocalSolarTime => "local_solar_time",
            Field::MagneticZonalWind => "magnetic_zonal_wind",
            Field::MagneticMeridionalWind => "magnetic_meridional_wind",
            Field::MagneticFieldAlignedWind => "magnetic_field_aligned_wind",
            Field::UtcTime => "utc_time",
            Field::OrbitNumber => "orbit_number",
        }
    }
}

/// ICON data-product release identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Release {
    V04,
    V05,
}

impl Release {
    /// Newest release this crate knows the naming convention for.
    pub const LATEST: Release = Release::V05;

    /// Parse the `vNN` tag out of a product filename such as
    /// `icon_l2-2_mighti_vector-wind-red_20220725_v05r000.nc`.
    pub fn from_filename(path: &Path) -> Option<Release> {
        let stem = path.file_stem()?.to_str()?;
        let tag = stem.rsplit('_').find(|part| part.starts_with('v'))?;
        let version: u32 = tag.get(1..3)?.parse().ok()?;
        match version {
            4 => Some(Release::V04),
            5 => Some(Release::V05),
            _ => None,
        }
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Release::V04 => write!(f, "v04"),
            Release::V05 => write!(f, "v05"),
        }
    }
}

/// One raw-variable to canonical-field mapping entry.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub raw: &'static str,
    pub field: Field,
}

/// Field-mapping table for one product release.
#[derive(Debug, Clone, Copy)]
pub struct ProductMap {
    pub release: Release,
    /// Millisecond-epoch time variable.
    pub epoch: &'static str,
    /// Altitude coordinate variable, the generic "level" axis.
    pub altitude: &'static str,
    pub fields: &'static [FieldMap],
}

const ICON_L22_FIELDS: &[FieldMap] = &[
    FieldMap {
        raw: "ICON_L22_Longitude",
        field: Field::Longitude,
    },
    FieldMap {
        raw: "ICON_L22_Latitude",
        field: Field::Latitude,
    },
    FieldMap {
        raw: "ICON_L22_Zonal_Wind",
        field: Field::ZonalWind,
    },
    FieldMap {
        raw: "ICON_L22_Meridional_Wind",
        field: Field::MeridionalWind,
    },
    FieldMap {
        raw: "ICON_L22_Local_Solar_Time",
        field: Field::LocalSolarTime,
    },
    FieldMap {
        raw: "ICON_L22_Magnetic_Zonal_Wind",
        field: Field::MagneticZonalWind,
    },
    FieldMap {
        raw: "ICON_L22_Magnetic_Meridional_Wind",
        field: Field::MagneticMeridionalWind,
    },
    FieldMap {
        raw: "ICON_L22_Magnetic_Field_Aligned_Wind",
        field: Field::MagneticFieldAlignedWind,
    },
    FieldMap {
        raw: "ICON_L22_UTC_Time",
        field: Field::UtcTime,
    },
    FieldMap {
        raw: "ICON_L22_Orbit_Number",
        field: Field::OrbitNumber,
    },
];

impl ProductMap {
    /// Mapping table for a specific release.
    ///
    /// v04 and v05 share raw names; the per-release match is the seam a
    /// renamed variable in a future release slots into.
    pub fn for_release(release: Release) -> ProductMap {
        match release {
            Release::V04 | Release::V05 => ProductMap {
                release,
                epoch: "Epoch",
                altitude: "ICON_L22_Altitude",
                fields: ICON_L22_FIELDS,
            },
        }
    }

    /// Detect the release from the filename, falling back to the latest
    /// known table when the name carries no release tag.
    pub fn from_filename(path: &Path) -> ProductMap {
        match Release::from_filename(path) {
            Some(release) => ProductMap::for_release(release),
            None => {
                warn!(
                    file = %path.display(),
                    fallback = %Release::LATEST,
                    "Filename carries no release tag, using latest field table"
                );
                ProductMap::for_release(Release::LATEST)
            }
        }
    }

    /// Raw variable name for a canonical field, when the release maps it.
    pub fn raw_name(&self, field: Field) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn release_parses_from_product_filename() {
        let path = PathBuf::from("ICON/icon_l2-2_mighti_vector-wind-red_20220725_v05r000.nc");
        assert_eq!(Release::from_filename(&path), Some(Release::V05));

        let v04 = PathBuf::from("icon_l2-2_mighti_vector-wind-red_20200101_v04r001.nc");
        assert_eq!(Release::from_filename(&v04), Some(Release::V04));
    }

    #[test]
    fn release_detection_rejects_unknown_names() {
        assert_eq!(Release::from_filename(Path::new("winds.nc")), None);
        assert_eq!(
            Release::from_filename(Path::new("icon_l2-2_mighti_vector-wind-red.nc")),
            None
        );
        assert_eq!(
            Release::from_filename(Path::new("icon_mighti_20220725_v99r000.nc")),
            None
        );
    }

    #[test]
    fn filename_fallback_uses_latest_release() {
        let map = ProductMap::from_filename(Path::new("winds.nc"));
        assert_eq!(map.release, Release::LATEST);
    }

    #[test]
    fn v05_table_maps_every_field() {
        let map = ProductMap::for_release(Release::V05);
        assert_eq!(map.epoch, "Epoch");
        assert_eq!(map.altitude, "ICON_L22_Altitude");
        assert_eq!(map.raw_name(Field::ZonalWind), Some("ICON_L22_Zonal_Wind"));
        assert_eq!(
            map.raw_name(Field::MagneticFieldAlignedWind),
            Some("ICON_L22_Magnetic_Field_Aligned_Wind")
        );
        assert_eq!(map.raw_name(Field::OrbitNumber), Some("ICON_L22_Orbit_Number"));
        assert_eq!(map.fields.len(), 10);
    }

    #[test]
    fn canonical_names_are_lowercase() {
        let map = ProductMap::for_release(Release::V05);
        for entry in map.fields {
            let name = entry.field.name();
            assert_eq!(name, name.to_lowercase());
            assert!(!name.contains("ICON"));
        }
    }
}

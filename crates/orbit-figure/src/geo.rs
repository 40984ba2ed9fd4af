//! Coastline overlay loading.
//!
//! The map panel can draw a coastline from any GeoJSON FeatureCollection,
//! e.g. the Natural Earth `ne_110m_coastline` file. Only the geometry is
//! read; properties are ignored.

use std::path::Path;

use tracing::info;

use crate::error::{FigureError, FigureResult};

/// One drawable line, as `(longitude, latitude)` pairs in degrees.
pub type Polyline = Vec<(f64, f64)>;

/// Read polylines from a GeoJSON file on disk.
pub fn load_coastline(path: &Path) -> FigureResult<Vec<Polyline>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| FigureError::Coastline(format!("{}: {e}", path.display())))?;
    let polylines = parse_polylines(&json)?;
    info!(
        file = %path.display(),
        segments = polylines.len(),
        "Loaded coastline overlay"
    );
    Ok(polylines)
}

/// Extract every line and polygon ring from a GeoJSON FeatureCollection.
pub fn parse_polylines(json: &str) -> FigureResult<Vec<Polyline>> {
    let v: serde_json::Value =
        serde_json::from_str(json).map_err(|e| FigureError::Coastline(e.to_string()))?;
    let features = v["features"]
        .as_array()
        .ok_or_else(|| FigureError::Coastline("no features array".to_string()))?;
    let mut polylines = Vec::new();
    for feature in features {
        let geometry = &feature["geometry"];
        match geometry["type"].as_str() {
            Some("LineString") => push_line(&geometry["coordinates"], &mut polylines),
            Some("MultiLineString") | Some("Polygon") => {
                push_lines(&geometry["coordinates"], &mut polylines)
            }
            Some("MultiPolygon") => {
                if let Some(polygons) = geometry["coordinates"].as_array() {
                    for rings in polygons {
                        push_lines(rings, &mut polylines);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(polylines)
}

fn push_lines(arr: &serde_json::Value, out: &mut Vec<Polyline>) {
    if let Some(lines) = arr.as_array() {
        for line in lines {
            push_line(line, out);
        }
    }
}

fn push_line(arr: &serde_json::Value, out: &mut Vec<Polyline>) {
    let Some(points) = arr.as_array() else {
        return;
    };
    let line: Polyline = points
        .iter()
        .filter_map(|p| {
            let pair = p.as_array()?;
            Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
        })
        .collect();
    // A single point is not drawable
    if line.len() >= 2 {
        out.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_linestrings_and_polygons() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {
                    "type": "LineString",
                    "coordinates": [[-48.0, -2.0], [-47.0, -1.0], [-46.5, 0.5]]
                }},
                {"type": "Feature", "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-60.0, 5.0], [-59.0, 5.0], [-59.0, 6.0], [-60.0, 5.0]]]
                }},
                {"type": "Feature", "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[0.0, 0.0], [1.0, 1.0]], [[2.0, 2.0], [3.0, 3.0]]]
                }},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [8.0, 50.0]}}
            ]
        }"#;
        let lines = parse_polylines(json).expect("valid GeoJSON");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0][0], (-48.0, -2.0), "pairs are (lon, lat)");
        assert_eq!(lines[1].len(), 4);
    }

    #[test]
    fn degenerate_lines_are_dropped() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {
                    "type": "LineString", "coordinates": [[-48.0, -2.0]]
                }}
            ]
        }"#;
        let lines = parse_polylines(json).expect("valid GeoJSON");
        assert!(lines.is_empty());
    }

    #[test]
    fn missing_features_is_an_error() {
        let err = parse_polylines(r#"{"type": "FeatureCollection"}"#).unwrap_err();
        assert!(matches!(err, FigureError::Coastline(_)));
        assert!(parse_polylines("not json").is_err());
    }
}

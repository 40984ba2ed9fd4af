//! End-to-end pipeline: load a granule, pick orbits, write the figure.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use mighti_reader::{
    discover_orbits, load_wind_table, LoadOptions, LonWindow, OrbitId, OrbitSelection, WindTable,
};

use crate::error::{FigureError, FigureResult};
use crate::font::FontSafeBackend;
use crate::panels::render_winds_figure;
use crate::style::FigureStyle;

/// Output pixel size unless the caller asks otherwise.
pub const DEFAULT_SIZE: (u32, u32) = (1000, 900);

/// Everything one figure run needs.
#[derive(Debug)]
pub struct PlotConfig {
    pub input: PathBuf,
    pub load: LoadOptions,
    /// Window that decides which orbits the granule contains.
    pub discovery: LonWindow,
    pub selection: OrbitSelection,
    pub style: FigureStyle,
    pub output: PathBuf,
    pub size: (u32, u32),
}

/// Load, select, render, save. The single entry point the CLI calls.
pub fn plot_winds(config: &PlotConfig) -> FigureResult<()> {
    let table = load_wind_table(&config.input, &config.load)?;
    let discovered = discover_orbits(&table, config.discovery);
    info!(discovered = discovered.len(), "Discovered orbit passes");
    let orbits = config
        .selection
        .resolve(&discovered, &table, config.style.sector)?;
    info!(?orbits, "Selected orbits for the figure");
    save_figure(&config.output, &table, &orbits, &config.style, config.size)
}

/// Render the figure to `path`; the extension picks the backend.
pub fn save_figure(
    path: &Path,
    table: &WindTable,
    orbits: &[OrbitId],
    style: &FigureStyle,
    size: (u32, u32),
) -> FigureResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => {
            let root = FontSafeBackend::new(BitMapBackend::new(path, size)).into_drawing_area();
            render_winds_figure(&root, table, orbits, style)?;
            root.present().map_err(FigureError::draw)?;
        }
        "svg" => {
            let root = FontSafeBackend::new(SVGBackend::new(path, size)).into_drawing_area();
            render_winds_figure(&root, table, orbits, style)?;
            root.present().map_err(FigureError::draw)?;
        }
        other => return Err(FigureError::Format(other.to_string())),
    }
    info!(file = %path.display(), "Wrote figure");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mighti_reader::WindTable;

    #[test]
    fn unknown_extension_is_rejected_before_rendering() {
        let table = WindTable::default();
        let err = save_figure(
            Path::new("figure.txt"),
            &table,
            &[],
            &FigureStyle::default(),
            (100, 100),
        )
        .unwrap_err();
        match err {
            FigureError::Format(ext) => assert_eq!(ext, "txt"),
            other => panic!("expected Format error, got {other:?}"),
        }
    }
}

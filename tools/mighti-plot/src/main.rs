//! Wind figure CLI.
//!
//! Loads one MIGHTI L2.2 vector-wind granule, picks three orbit passes, and
//! writes the map-plus-wind-panels figure to a PNG or SVG file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mighti_reader::{
    LoadOptions, LonWindow, OrbitId, OrbitSelection, DEFAULT_ALTITUDE_KM,
};
use orbit_figure::{load_coastline, plot_winds, FigureStyle, PlotConfig, DEFAULT_SIZE};

#[derive(Parser, Debug)]
#[command(name = "mighti-plot")]
#[command(about = "Plot MIGHTI vector winds for selected orbit passes")]
struct Args {
    /// Input NetCDF granule
    file: PathBuf,

    /// Target altitude in km
    #[arg(long, default_value_t = DEFAULT_ALTITUDE_KM)]
    altitude: f64,

    /// Maximum accepted distance to the nearest altitude level in km; 0 disables the check
    #[arg(long, default_value_t = 10.0)]
    tolerance: f64,

    /// Orbit-discovery longitude window, degrees, as START,END
    #[arg(long, default_value_t = LonWindow::DISCOVERY)]
    window: LonWindow,

    /// Highlighted longitude sector, degrees, as START,END
    #[arg(long, default_value_t = LonWindow::SECTOR)]
    sector: LonWindow,

    /// Zero-based positions into the discovery order
    #[arg(long, value_delimiter = ',', default_values_t = vec![3, 4, 5])]
    positions: Vec<usize>,

    /// Exact orbit numbers to plot instead of positions
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["nearest_to", "positions"])]
    orbits: Option<Vec<i32>>,

    /// Plot the orbits whose sector crossings are nearest this RFC 3339 time
    #[arg(long, value_name = "TIME", conflicts_with = "positions")]
    nearest_to: Option<DateTime<Utc>>,

    /// How many orbits to pick with --nearest-to
    #[arg(long, default_value_t = 3)]
    count: usize,

    /// GeoJSON coastline to draw on the map panel
    #[arg(long)]
    coastline: Option<PathBuf>,

    /// Output image; the extension picks the format (png or svg)
    #[arg(short, long, default_value = "icon_winds_measurements.png")]
    output: PathBuf,

    /// Output width in pixels
    #[arg(long, default_value_t = DEFAULT_SIZE.0)]
    width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = DEFAULT_SIZE.1)]
    height: u32,

    /// Log level or filter directives
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt().with_env_filter(filter).with_target(true).init();

    // Keep HDF5 from spamming stderr before the first file is touched
    mighti_reader::silence_hdf5_errors();

    let selection = if let Some(ids) = args.orbits {
        OrbitSelection::Ids(ids.into_iter().map(OrbitId).collect())
    } else if let Some(reference) = args.nearest_to {
        OrbitSelection::NearestTo {
            reference,
            count: args.count,
        }
    } else {
        OrbitSelection::Positions(args.positions)
    };

    let mut style = FigureStyle {
        sector: args.sector,
        ..FigureStyle::default()
    };
    if let Some(path) = &args.coastline {
        style.coastline = Some(
            load_coastline(path)
                .with_context(|| format!("loading coastline {}", path.display()))?,
        );
    }

    let config = PlotConfig {
        input: args.file,
        load: LoadOptions {
            altitude_km: args.altitude,
            tolerance_km: (args.tolerance > 0.0).then_some(args.tolerance),
            release: None,
        },
        discovery: args.window,
        selection,
        style,
        output: args.output,
        size: (args.width, args.height),
    };

    plot_winds(&config).with_context(|| format!("plotting {}", config.input.display()))?;
    info!(file = %config.output.display(), "Done");
    Ok(())
}

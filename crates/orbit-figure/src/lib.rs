//! Figure rendering for MIGHTI vector-wind orbit passes.
//!
//! Takes a wind table from `mighti-reader` and draws the standard analysis
//! figure: a geographic map of each selected orbit's ground track over two
//! stacked wind panels (zonal, meridional) sharing a time axis, with the
//! longitude sector of interest marked on all three.

pub mod error;
pub mod font;
pub mod geo;
pub mod layout;
pub mod panels;
pub mod pipeline;
pub mod style;

pub use error::{FigureError, FigureResult};
pub use font::FontSafeBackend;
pub use geo::{load_coastline, parse_polylines, Polyline};
pub use layout::split_panels;
pub use panels::{render_winds_figure, WindComponent};
pub use pipeline::{plot_winds, save_figure, PlotConfig, DEFAULT_SIZE};
pub use style::{FigureStyle, LatLimits, LonLimits, ORBIT_COLORS};

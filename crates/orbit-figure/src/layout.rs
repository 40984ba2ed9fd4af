//! Vertical layout: map panel on top, wind panels stacked below it.

use plotters::coord::Shift;
use plotters::prelude::*;

/// Split `root` into the map area and `panels` equal wind-panel areas.
///
/// `map_frac` is the height fraction the map keeps; `gap` is the pixel gap
/// between the map and the panel block.
pub fn split_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panels: usize,
    map_frac: f64,
    gap: i32,
) -> (DrawingArea<DB, Shift>, Vec<DrawingArea<DB, Shift>>) {
    let (_, height) = root.dim_in_pixel();
    let map_height = (height as f64 * map_frac).round() as i32;
    let (map, lower) = root.split_vertically(map_height);
    let lower = lower.margin(gap, 0, 0, 0);
    let panel_areas = lower.split_evenly((panels.max(1), 1));
    (map, panel_areas)
}

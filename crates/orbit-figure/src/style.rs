//! Axis limits, colors, and fonts shared by the figure panels.

use mighti_reader::LonWindow;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use serde::{Deserialize, Serialize};

use crate::geo::Polyline;

/// Latitude extent and tick step of the map panel, degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for LatLimits {
    fn default() -> Self {
        Self {
            min: -20.0,
            max: 40.0,
            step: 10.0,
        }
    }
}

impl LatLimits {
    pub fn tick_count(&self) -> usize {
        tick_count(self.min, self.max, self.step)
    }
}

/// Longitude extent and tick step of the map panel, degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LonLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for LonLimits {
    fn default() -> Self {
        Self {
            min: -180.0,
            max: 180.0,
            step: 30.0,
        }
    }
}

impl LonLimits {
    pub fn tick_count(&self) -> usize {
        tick_count(self.min, self.max, self.step)
    }
}

fn tick_count(min: f64, max: f64, step: f64) -> usize {
    if step <= 0.0 || max <= min {
        return 2;
    }
    ((max - min) / step).round() as usize + 1
}

/// Everything about the figure's look that is not data.
#[derive(Debug, Clone)]
pub struct FigureStyle {
    pub lat: LatLimits,
    pub lon: LonLimits,
    /// Longitude sector highlighted on the map and shaded in the panels.
    pub sector: LonWindow,
    /// Optional coastline overlay for the map panel.
    pub coastline: Option<Vec<Polyline>>,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            lat: LatLimits::default(),
            lon: LonLimits::default(),
            sector: LonWindow::SECTOR,
            coastline: None,
        }
    }
}

/// Scatter and line colors, cycled over the plotted orbits.
pub const ORBIT_COLORS: [RGBColor; 3] = [BLUE, GREEN, MAGENTA];

/// Sector shading in the wind panels.
pub const BAND_GRAY: RGBColor = RGBColor(128, 128, 128);

/// Coastline stroke on the map panel.
pub const COAST_GRAY: RGBColor = RGBColor(90, 90, 90);

pub fn label_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal)
}

pub fn title_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 18.0, FontStyle::Normal)
}

//! The winds figure: one map panel over two stacked wind panels.
//!
//! Each selected orbit contributes a ground-track scatter to the map and a
//! line to both wind panels, all in the orbit's color. The sector window is
//! marked twice: vertical lines on the map, shaded time bands in the panels.

use chrono::{DateTime, Datelike, Duration, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::{info, warn};

use mighti_reader::{filter_by_orbit, sector_span, OrbitId, OrbitSubset, SectorSpan, WindTable};

use crate::error::{FigureError, FigureResult};
use crate::layout::split_panels;
use crate::style::{label_font, title_font, FigureStyle, BAND_GRAY, COAST_GRAY, ORBIT_COLORS};

/// Height fraction of the figure the map panel keeps.
const MAP_FRACTION: f64 = 0.42;
/// Pixel gap between the map and the wind panels.
const PANEL_GAP: i32 = 14;

/// Which wind component a panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindComponent {
    Zonal,
    Meridional,
}

impl WindComponent {
    fn values<'a>(&self, subset: &'a OrbitSubset) -> &'a [f64] {
        match self {
            WindComponent::Zonal => &subset.zonal_wind,
            WindComponent::Meridional => &subset.meridional_wind,
        }
    }
}

/// One orbit ready to draw: its rows, sector crossing, and color.
struct OrbitLayer {
    subset: OrbitSubset,
    span: SectorSpan,
    color: RGBColor,
}

/// How one wind panel is decorated.
struct PanelSpec {
    component: WindComponent,
    title: Option<&'static str>,
    y_desc: &'static str,
    time_labels: bool,
    legend: bool,
}

/// Draw the whole figure onto `root`.
///
/// Orbits that have no rows or never cross the sector are skipped with a
/// warning; the figure fails only when nothing at all is drawable.
pub fn render_winds_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &WindTable,
    orbits: &[OrbitId],
    style: &FigureStyle,
) -> FigureResult<()> {
    root.fill(&WHITE).map_err(FigureError::draw)?;

    let layers = collect_layers(table, orbits, style)?;
    let time_axis = time_range(&layers)?;

    let (map_area, panel_areas) = split_panels(root, 2, MAP_FRACTION, PANEL_GAP);
    let [zonal_area, meridional_area] = panel_areas.as_slice() else {
        return Err(FigureError::Draw(
            "layout did not produce two wind panels".to_string(),
        ));
    };

    draw_map_panel(&map_area, &layers, style)?;
    draw_wind_panel(
        zonal_area,
        &layers,
        &PanelSpec {
            component: WindComponent::Zonal,
            title: Some("Red line Mighti vector wind"),
            y_desc: "Zonal (m/s)",
            time_labels: false,
            legend: false,
        },
        time_axis,
    )?;
    draw_wind_panel(
        meridional_area,
        &layers,
        &PanelSpec {
            component: WindComponent::Meridional,
            title: None,
            y_desc: "Meridional wind (m/s)",
            time_labels: true,
            legend: true,
        },
        time_axis,
    )?;

    info!(orbits = layers.len(), "Rendered winds figure");
    Ok(())
}

/// Resolve each requested orbit into a drawable layer, skipping the ones
/// with nothing to show.
fn collect_layers(
    table: &WindTable,
    orbits: &[OrbitId],
    style: &FigureStyle,
) -> FigureResult<Vec<OrbitLayer>> {
    let mut layers = Vec::new();
    for (index, &orbit) in orbits.iter().enumerate() {
        let subset = filter_by_orbit(table, orbit);
        if subset.is_empty() {
            warn!(orbit = %orbit, "Orbit has no rows, skipping");
            continue;
        }
        let span = match sector_span(&subset, style.sector) {
            Ok(span) => span,
            Err(err) => {
                warn!(orbit = %orbit, error = %err, "Orbit never crosses the sector, skipping");
                continue;
            }
        };
        layers.push(OrbitLayer {
            subset,
            span,
            color: ORBIT_COLORS[index % ORBIT_COLORS.len()],
        });
    }
    if layers.is_empty() {
        return Err(FigureError::NothingToDraw);
    }
    Ok(layers)
}

/// Shared time axis over every drawn orbit, padded so lines do not touch
/// the frame.
fn time_range(layers: &[OrbitLayer]) -> FigureResult<(DateTime<Utc>, DateTime<Utc>)> {
    let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for layer in layers {
        for &t in &layer.subset.times {
            bounds = Some(match bounds {
                None => (t, t),
                Some((start, end)) => (start.min(t), end.max(t)),
            });
        }
    }
    let (start, end) = bounds.ok_or(FigureError::NothingToDraw)?;
    let pad = std::cmp::max((end - start) / 20, Duration::seconds(60));
    Ok((start - pad, end + pad))
}

fn draw_map_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    layers: &[OrbitLayer],
    style: &FigureStyle,
) -> FigureResult<()> {
    let year = layers
        .first()
        .and_then(|layer| layer.subset.times.first())
        .map(|t| t.year().to_string())
        .unwrap_or_default();

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .caption(&year, title_font())
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 28)
        .build_cartesian_2d(style.lon.min..style.lon.max, style.lat.min..style.lat.max)
        .map_err(FigureError::draw)?;

    let degrees = |v: &f64| format!("{v:.0}°");
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(style.lon.tick_count())
        .y_labels(style.lat.tick_count())
        .x_label_formatter(&degrees)
        .y_label_formatter(&degrees)
        .label_style(label_font())
        .draw()
        .map_err(FigureError::draw)?;

    if let Some(coastline) = &style.coastline {
        for line in coastline {
            chart
                .draw_series(LineSeries::new(line.iter().copied(), &COAST_GRAY))
                .map_err(FigureError::draw)?;
        }
    }

    for lon in [style.sector.start, style.sector.end] {
        chart
            .draw_series(LineSeries::new(
                [(lon, style.lat.min), (lon, style.lat.max)],
                BLACK.stroke_width(1),
            ))
            .map_err(FigureError::draw)?;
    }

    for layer in layers {
        let color = layer.color;
        let track = layer
            .subset
            .longitude
            .iter()
            .zip(&layer.subset.latitude)
            .filter(|(lon, lat)| lon.is_finite() && lat.is_finite())
            .map(|(&lon, &lat)| Circle::new((lon, lat), 2, color.filled()));
        chart
            .draw_series(track)
            .map_err(FigureError::draw)?
            .label(format!("Orbit {}", layer.subset.orbit))
            .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .label_font(label_font().color(&BLACK))
        .position(SeriesLabelPosition::UpperMiddle)
        .draw()
        .map_err(FigureError::draw)?;

    Ok(())
}

fn draw_wind_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    layers: &[OrbitLayer],
    spec: &PanelSpec,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
) -> FigureResult<()> {
    let (y_lo, y_hi) = component_range(layers, spec.component);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin_left(8)
        .margin_right(16)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(
            LabelAreaPosition::Bottom,
            if spec.time_labels { 28 } else { 8 },
        );
    if let Some(title) = spec.title {
        builder.caption(title, title_font());
    }
    let mut chart = builder
        .build_cartesian_2d(start..end, y_lo..y_hi)
        .map_err(FigureError::draw)?;

    let hhmm = |t: &DateTime<Utc>| t.format("%H:%M").to_string();
    let whole = |v: &f64| format!("{v:.0}");
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .y_desc(spec.y_desc)
        .y_label_formatter(&whole)
        .label_style(label_font())
        .axis_desc_style(label_font());
    if spec.time_labels {
        mesh.x_labels(6).x_label_formatter(&hhmm);
    } else {
        mesh.x_labels(0);
    }
    mesh.draw().map_err(FigureError::draw)?;

    for layer in layers {
        chart
            .draw_series([Rectangle::new(
                [(layer.span.first, y_lo), (layer.span.last, y_hi)],
                BAND_GRAY.mix(0.2).filled(),
            )])
            .map_err(FigureError::draw)?;
    }

    chart
        .draw_series(DashedLineSeries::new(
            [(start, 0.0), (end, 0.0)],
            4,
            4,
            BLACK.stroke_width(1),
        ))
        .map_err(FigureError::draw)?;

    for layer in layers {
        let color = layer.color;
        let runs = finite_runs(&layer.subset.times, spec.component.values(&layer.subset));
        for (run_index, run) in runs.into_iter().enumerate() {
            let series = chart
                .draw_series(LineSeries::new(run, &color))
                .map_err(FigureError::draw)?;
            if run_index == 0 && spec.legend {
                series
                    .label(layer.subset.orbit.to_string())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], &color)
                    });
            }
        }
    }

    if spec.legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.7))
            .border_style(&BLACK.mix(0.3))
            .label_font(label_font().color(&BLACK))
            .position(SeriesLabelPosition::UpperMiddle)
            .draw()
            .map_err(FigureError::draw)?;
    }

    Ok(())
}

/// Y-axis range for one component over every layer: always brackets zero,
/// padded by a tenth of the span.
fn component_range(layers: &[OrbitLayer], component: WindComponent) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for layer in layers {
        for &v in component.values(&layer.subset) {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let lo = lo.min(0.0);
    let hi = hi.max(0.0);
    let pad = ((hi - lo) * 0.1).max(1.0);
    (lo - pad, hi + pad)
}

/// Split a time series into runs of consecutive finite values so line plots
/// break at gaps instead of bridging them.
fn finite_runs(times: &[DateTime<Utc>], values: &[f64]) -> Vec<Vec<(DateTime<Utc>, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (&t, &v) in times.iter().zip(values) {
        if v.is_finite() {
            current.push((t, v));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mighti_reader::LonWindow;
    use test_utils::generators::multi_orbit_table;

    fn layer_for(orbit: i32) -> OrbitLayer {
        let table = multi_orbit_table(6);
        let subset = filter_by_orbit(&table, OrbitId(orbit));
        let span = sector_span(&subset, LonWindow::SECTOR).expect("crossing");
        OrbitLayer {
            subset,
            span,
            color: ORBIT_COLORS[0],
        }
    }

    #[test]
    fn finite_runs_break_at_gaps() {
        let t0 = Utc.with_ymd_and_hms(2022, 7, 25, 0, 0, 0).unwrap();
        let times: Vec<_> = (0..5).map(|i| t0 + Duration::seconds(i)).collect();
        let values = [1.0, 2.0, f64::NAN, 3.0, 4.0];
        let runs = finite_runs(&times, &values);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 2);
        assert_eq!(runs[1][0], (times[3], 3.0));

        assert!(finite_runs(&times, &[f64::NAN; 5]).is_empty());
    }

    #[test]
    fn component_range_brackets_zero_with_padding() {
        let layers = vec![layer_for(5233)];
        let (lo, hi) = component_range(&layers, WindComponent::Zonal);
        // Zonal values for orbit 5233 run 523300..523304, all positive.
        assert!(lo < 0.0, "range must include the zero line, got lo {lo}");
        assert!(hi > 523304.0);

        let (lo, hi) = component_range(&[], WindComponent::Zonal);
        assert_eq!((lo, hi), (-1.0, 1.0));
    }

    #[test]
    fn time_range_pads_beyond_the_data() {
        let layers = vec![layer_for(5233), layer_for(5234)];
        let (start, end) = time_range(&layers).expect("range");
        let first = layers[0].subset.times[0];
        let last = layers[1].subset.times[layers[1].subset.times.len() - 1];
        assert!(start < first);
        assert!(end > last);
    }

    #[test]
    fn empty_layer_list_has_no_time_range() {
        assert!(matches!(
            time_range(&[]),
            Err(FigureError::NothingToDraw)
        ));
    }
}

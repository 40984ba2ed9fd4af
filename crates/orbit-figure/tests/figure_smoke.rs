//! Rendering smoke tests over in-memory buffers and temp files.

use mighti_reader::OrbitId;
use orbit_figure::{
    render_winds_figure, save_figure, FigureError, FigureStyle, FontSafeBackend,
};
use plotters::prelude::*;
use test_utils::generators::{append_track, base_time, multi_orbit_table};

#[test]
fn renders_three_orbits_into_a_buffer() {
    let table = multi_orbit_table(6);
    let orbits = [OrbitId(5233), OrbitId(5234), OrbitId(5235)];
    let style = FigureStyle::default();

    let mut buf = vec![0u8; 800 * 700 * 3];
    {
        let backend = BitMapBackend::with_buffer(&mut buf, (800, 700));
        let root = FontSafeBackend::new(backend).into_drawing_area();
        render_winds_figure(&root, &table, &orbits, &style).expect("render");
        root.present().expect("present");
    }

    // Every orbit color must land somewhere: scatter on the map, lines in
    // the wind panels.
    for (name, rgb) in [
        ("blue", [0u8, 0, 255]),
        ("green", [0, 255, 0]),
        ("magenta", [255, 0, 255]),
    ] {
        assert!(
            buf.chunks(3).any(|p| p == rgb),
            "no {name} pixels in the rendered figure"
        );
    }
    println!("Rendered {} orbits into an 800x700 buffer", orbits.len());
}

#[test]
fn unknown_orbit_leaves_nothing_to_draw() {
    let table = multi_orbit_table(2);
    let style = FigureStyle::default();

    let mut buf = vec![0u8; 400 * 300 * 3];
    let backend = BitMapBackend::with_buffer(&mut buf, (400, 300));
    let root = FontSafeBackend::new(backend).into_drawing_area();
    let err = render_winds_figure(&root, &table, &[OrbitId(9999)], &style).unwrap_err();
    assert!(matches!(err, FigureError::NothingToDraw));
}

#[test]
fn orbit_missing_the_sector_is_skipped_not_fatal() {
    let mut table = multi_orbit_table(1);
    // A second track far west of the sector window
    append_track(&mut table, 42, &[-120.0, -115.0, -110.0], base_time(), 60);
    let style = FigureStyle::default();

    let mut buf = vec![0u8; 400 * 300 * 3];
    let backend = BitMapBackend::with_buffer(&mut buf, (400, 300));
    let root = FontSafeBackend::new(backend).into_drawing_area();
    render_winds_figure(&root, &table, &[OrbitId(5230), OrbitId(42)], &style)
        .expect("one drawable orbit is enough");
}

#[test]
fn writes_png_and_svg_outputs() {
    let table = multi_orbit_table(6);
    let orbits = [OrbitId(5233), OrbitId(5234), OrbitId(5235)];
    let style = FigureStyle::default();
    let dir = tempfile::tempdir().expect("tempdir");

    let png = dir.path().join("winds.png");
    save_figure(&png, &table, &orbits, &style, (640, 560)).expect("png");
    assert!(std::fs::metadata(&png).expect("png metadata").len() > 0);

    let svg = dir.path().join("winds.svg");
    save_figure(&svg, &table, &orbits, &style, (640, 560)).expect("svg");
    let body = std::fs::read_to_string(&svg).expect("svg body");
    assert!(body.contains("<svg"), "not an SVG document");

    println!("Wrote {} and {}", png.display(), svg.display());
}

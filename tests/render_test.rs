//! End-to-end rendering scenarios through the public API.
//!
//! Run: cargo test --test render_test

#![allow(clippy::unwrap_used)]

use cheshire_viz::glyph::{pack_braille, BRAILLE_BASE, BRAILLE_DOTS};
use cheshire_viz::prelude::*;

fn pie_rows() -> RowSet {
    RowSet::from_records(vec![
        vec![("x", Value::from("A")), ("y", Value::from(10.0))],
        vec![("x", Value::from("B")), ("y", Value::from(20.0))],
        vec![("x", Value::from("A")), ("y", Value::from(5.0))],
    ])
    .unwrap()
}

fn viewport(w: u32, h: u32) -> Viewport {
    Viewport::new(w, h).unwrap()
}

// ============================================================================
// Proportions
// ============================================================================

#[test]
fn pie_aggregates_repeated_labels() {
    let frame = render(
        &pie_rows(),
        &ChartOptions::new(ChartKind::Pie),
        viewport(40, 12),
        &RenderContext::default(),
    )
    .unwrap();

    let labels: Vec<&str> = frame.legend().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["B (57.1%) = 20", "A (42.9%) = 15"]);
    assert_eq!(frame.width(), 40);
    assert_eq!(frame.height(), 12);
    assert!(frame.occupied() > 0);
}

#[test]
fn waffle_cells_sum_to_total() {
    let frame = render(
        &pie_rows(),
        &ChartOptions::new(ChartKind::Waffle),
        viewport(40, 12),
        &RenderContext::default(),
    )
    .unwrap();

    let b = frame.legend()[0].color;
    let a = frame.legend()[1].color;
    let count = |color| frame.cells().iter().filter(|c| c.glyph == '■' && c.fg == color).count();
    // 20/35 and 15/35 of 100 cells by largest remainder
    assert_eq!(count(b), 57);
    assert_eq!(count(a), 43);
}

#[test]
fn negative_pie_value_names_the_row() {
    let rows = RowSet::from_records(vec![
        vec![("x", Value::from("A")), ("y", Value::from(1.0))],
        vec![("x", Value::from("B")), ("y", Value::from(-1.0))],
    ])
    .unwrap();
    let err = render(&rows, &ChartOptions::new(ChartKind::Pie), viewport(20, 10), &RenderContext::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { row: 1, .. }), "{err}");
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn adjacent_points_merge_into_one_cluster() {
    let rows = RowSet::from_records(vec![
        vec![("lat", Value::from(0.0)), ("lon", Value::from(0.0))],
        vec![("lat", Value::from(0.0001)), ("lon", Value::from(0.0001))],
    ])
    .unwrap();
    let frame = render(
        &rows,
        &ChartOptions::map(MapSubtype::Clusters).markers(GlyphMode::Braille),
        viewport(10, 10),
        &RenderContext::default(),
    )
    .unwrap();

    assert_eq!(frame.stats().clusters, 1);
    assert_eq!(frame.cells().iter().filter(|c| c.glyph == '•').count(), 1);
}

#[test]
fn identical_longitudes_still_render() {
    let rows = RowSet::from_records(
        (0..5).map(|i| vec![("lat", Value::from(f64::from(i))), ("lon", Value::from(12.5))]),
    )
    .unwrap();
    for subtype in [MapSubtype::Points, MapSubtype::Density, MapSubtype::Clusters] {
        let frame =
            render(&rows, &ChartOptions::map(subtype), viewport(20, 10), &RenderContext::default())
                .unwrap();
        assert!(frame.occupied() > 0, "{subtype:?} rendered a blank frame");
    }
}

// ============================================================================
// Errors shared by every renderer
// ============================================================================

#[test]
fn empty_row_set_fails_for_every_kind() {
    let empty = RowSet::new(vec!["x".into(), "y".into()], Vec::new()).unwrap();
    let ctx = RenderContext::default();
    for kind in [ChartKind::Map, ChartKind::Pie, ChartKind::Waffle, ChartKind::MatrixHeatmap] {
        let err = render(&empty, &ChartOptions::new(kind), viewport(10, 10), &ctx).unwrap_err();
        assert!(matches!(err, Error::EmptyData { .. }), "{kind}: {err}");
    }
}

#[test]
fn generic_kinds_are_delegated() {
    for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Scatter, ChartKind::Histogram] {
        let err = render(&pie_rows(), &ChartOptions::new(kind), viewport(10, 10), &RenderContext::default())
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }
}

#[test]
fn missing_role_is_reported_by_name() {
    let rows = RowSet::from_records(vec![vec![("x", Value::from("A"))]]).unwrap();
    let err = render(&rows, &ChartOptions::new(ChartKind::Pie), viewport(10, 10), &RenderContext::default())
        .unwrap_err();
    match err {
        Error::Schema { role, .. } => assert_eq!(role, "y"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn zero_viewport_is_rejected() {
    assert!(matches!(Viewport::new(0, 5), Err(Error::InvalidViewport { .. })));
}

// ============================================================================
// Glyph alphabet
// ============================================================================

#[test]
fn braille_table_covers_all_256_patterns() {
    for mask in 0u32..=255 {
        let mut grid = [[false; 2]; 4];
        for (sub_y, bits) in BRAILLE_DOTS.iter().enumerate() {
            for (sub_x, &bit) in bits.iter().enumerate() {
                grid[sub_y][sub_x] = mask & u32::from(bit) != 0;
            }
        }
        let expected = char::from_u32(BRAILLE_BASE + mask).unwrap();
        assert_eq!(pack_braille(grid), expected, "mask {mask:#04x}");
    }
}

#[test]
fn braille_dot_positions() {
    let mut grid = [[false; 2]; 4];
    grid[0][0] = true;
    assert_eq!(pack_braille(grid), '⠁');
    grid = [[false; 2]; 4];
    grid[3][1] = true;
    assert_eq!(pack_braille(grid), '⢀');
    assert_eq!(pack_braille([[true; 2]; 4]), '⣿');
}

// ============================================================================
// Configuration & serialization
// ============================================================================

#[test]
fn configured_context_renders_truecolor() {
    let config = Config::parse("theme: heat\ncolor_space: truecolor\nchart:\n  chart: matrix_heatmap\n").unwrap();
    let ctx = config.context().unwrap().with_terminal(60, 20);
    let rows = RowSet::from_records(vec![
        vec![("x", Value::from("Mon")), ("y", Value::from("am")), ("value", Value::from(3.0))],
        vec![("x", Value::from("Tue")), ("y", Value::from("pm")), ("value", Value::from(7.0))],
    ])
    .unwrap();

    let frame = render_fit(&rows, &config.chart, &ctx).unwrap();
    assert_eq!((frame.width(), frame.height()), (60, 20));
    assert!(frame.cells().iter().any(|c| matches!(c.fg, Some(TermColor::Rgb(_)))));

    let out = AnsiEncoder::new().encode(&frame);
    assert!(out.contains("\x1b[38;2;"));
    assert!(out.contains("\x1b[0m"));
}

#[test]
fn ansi_output_lists_legend() {
    let frame = render(
        &pie_rows(),
        &ChartOptions::new(ChartKind::Pie).title("Sales"),
        viewport(30, 10),
        &RenderContext::default(),
    )
    .unwrap();

    let out = AnsiEncoder::new().encode(&frame);
    let lines: Vec<&str> = out.split('\n').collect();
    assert_eq!(lines[0], "Sales");
    assert_eq!(lines.len(), 1 + 10 + 2);
    assert!(lines[11].ends_with(" B (57.1%) = 20"));
    assert!(lines[11].starts_with("\x1b[38;5;"));

    let plain = AnsiEncoder::plain().title(false).legend(false).encode(&frame);
    assert!(!plain.contains('\x1b'));
    assert_eq!(plain, frame.to_string());
}

#[test]
fn suggestions_render_when_native() {
    let rows = RowSet::from_records((0..30).map(|i| {
        vec![
            ("city", Value::from(["Lisbon", "Porto", "Braga"][i % 3])),
            ("visits", Value::from((i % 7) as f64)),
            ("latitude", Value::from(38.7 + i as f64 * 0.01)),
            ("longitude", Value::from(-9.1 + i as f64 * 0.01)),
        ]
    }))
    .unwrap();

    let ctx = RenderContext::default();
    let suggestions = suggest_rows(&rows, &SuggestionConfig::default());
    assert!(!suggestions.is_empty());
    for s in suggestions.iter().filter(|s| s.kind.is_native()) {
        let frame = render(&rows, &s.options(), viewport(40, 12), &ctx).unwrap();
        assert!(frame.occupied() > 0, "{} rendered blank", s.archetype);
    }
}

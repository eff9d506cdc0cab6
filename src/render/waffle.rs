//! Waffle charts: a grid of unit cells apportioned between slices.

use super::{collect_slices, slice_label, RenderContext};
use crate::color::{distinct_colors, TermColor};
use crate::data::RowSet;
use crate::error::Result;
use crate::frame::{Canvas, Cell, Frame, LegendEntry, RenderStats, Viewport};
use crate::options::ChartOptions;

/// Glyph of one waffle unit.
pub const WAFFLE_CELL: char = '■';

/// Splits `total` units between `values` by largest remainder.
///
/// The result always sums to `total` (for a positive value sum). Equal
/// remainders favour the earlier value.
#[must_use]
pub fn apportion(values: &[f64], total: u32) -> Vec<u32> {
    let sum: f64 = values.iter().sum();
    if values.is_empty() || sum <= 0.0 {
        return vec![0; values.len()];
    }
    let quotas: Vec<f64> = values.iter().map(|v| v / sum * f64::from(total)).collect();
    let mut counts: Vec<u32> = quotas.iter().map(|q| q.floor() as u32).collect();
    let assigned: u32 = counts.iter().sum();

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &i in order.iter().cycle().take(total.saturating_sub(assigned) as usize) {
        counts[i] += 1;
    }
    counts
}

/// Renders a waffle chart.
///
/// Roles are those of a pie chart. Cells per row shrink to fit the viewport
/// width (each cell takes a glyph and a space) and the total shrinks to fit
/// its height.
pub fn render_waffle(
    rows: &RowSet,
    options: &ChartOptions,
    viewport: Viewport,
    ctx: &RenderContext,
) -> Result<Frame> {
    let (slices, skipped) = collect_slices(rows, options)?;
    let total_value: f64 = slices.iter().map(|s| s.value).sum();
    let theme = ctx.theme_for(options)?;

    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
    let colors: Vec<TermColor> = distinct_colors(&labels, theme.palette())
        .into_iter()
        .map(|s| s.in_space(ctx.color_space))
        .collect();

    let per_row = options.waffle.cells_per_row.clamp(1, ((viewport.width() + 1) / 2).max(1));
    let total = options.waffle.total_cells.max(1).min(per_row.saturating_mul(viewport.height()));
    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let counts = apportion(&values, total);
    crate::trace!("waffle", "per_row={per_row} total={total} counts={counts:?}");

    let mut canvas = Canvas::new(viewport);
    let mut index = 0u32;
    for (slice, &n) in counts.iter().enumerate() {
        for _ in 0..n {
            let (x, y) = ((index % per_row) * 2, index / per_row);
            canvas.set(x, y, Cell::new(WAFFLE_CELL, colors.get(slice).copied()));
            index += 1;
        }
    }

    let legend = if options.show_legend {
        slices
            .iter()
            .zip(&colors)
            .filter(|(s, _)| s.value > 0.0)
            .map(|(s, &c)| LegendEntry::new(WAFFLE_CELL, Some(c), slice_label(s, total_value)))
            .collect()
    } else {
        Vec::new()
    };
    let stats = RenderStats { rows: rows.len(), skipped, ..RenderStats::default() };
    Ok(canvas.finish(options.title.clone(), legend, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::options::{ChartKind, WaffleOptions};

    fn rows(pairs: &[(&str, f64)]) -> RowSet {
        RowSet::from_records(pairs.iter().map(|&(x, y)| vec![("x", Value::from(x)), ("y", Value::from(y))])).unwrap()
    }

    #[test]
    fn test_apportion_sums_exactly() {
        assert_eq!(apportion(&[1.0, 1.0, 1.0], 100), vec![34, 33, 33]);
        assert_eq!(apportion(&[15.0, 20.0], 100), vec![43, 57]);
        assert_eq!(apportion(&[2.0, 0.0], 10), vec![10, 0]);
        assert_eq!(apportion(&[], 10), Vec::<u32>::new());
        assert_eq!(apportion(&[0.0], 10), vec![0]);
    }

    #[test]
    fn test_default_grid() {
        let data = rows(&[("A", 30.0), ("B", 70.0)]);
        let opts = ChartOptions::new(ChartKind::Waffle);
        let frame = render_waffle(&data, &opts, Viewport::new(40, 12).unwrap(), &RenderContext::default()).unwrap();
        assert_eq!(frame.occupied(), 100);
        let lines = frame.lines();
        assert_eq!(lines[0].trim_end(), "■ ■ ■ ■ ■ ■ ■ ■ ■ ■");
        assert!(lines[10].trim().is_empty());

        // B (70) comes first
        let b = frame.legend()[0].color;
        assert_eq!(frame.cell(0, 0).unwrap().fg, b);
        assert_eq!(frame.cell(18, 9).unwrap().fg, frame.legend()[1].color);
        assert_eq!(frame.cells().iter().filter(|c| c.fg == b && c.glyph == WAFFLE_CELL).count(), 70);
    }

    #[test]
    fn test_shrinks_to_viewport() {
        let data = rows(&[("A", 1.0)]);
        let opts = ChartOptions::new(ChartKind::Waffle);
        // 7 columns fit 4 cells per row; 3 rows cap the total at 12
        let frame = render_waffle(&data, &opts, Viewport::new(7, 3).unwrap(), &RenderContext::default()).unwrap();
        assert_eq!(frame.occupied(), 12);
        assert_eq!(frame.lines()[0], "■ ■ ■ ■");
    }

    #[test]
    fn test_custom_layout() {
        let data = rows(&[("A", 1.0), ("B", 1.0)]);
        let opts = ChartOptions {
            waffle: WaffleOptions { total_cells: 9, cells_per_row: 3 },
            ..ChartOptions::new(ChartKind::Waffle)
        };
        let frame = render_waffle(&data, &opts, Viewport::new(20, 10).unwrap(), &RenderContext::default()).unwrap();
        assert_eq!(frame.occupied(), 9);
        // rows past the total stay blank
        assert_eq!(frame.lines()[2].trim_end(), "■ ■ ■");
        assert!(frame.lines()[3].trim().is_empty());
    }
}

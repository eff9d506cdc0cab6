//! Matrix heatmaps: a pivot of two categorical fields drawn as a labelled
//! grid.
//!
//! ```text
//!      Mon   Tue
//! ───┬────────────
//! am │█████ █████
//! pm │█████
//! ```

use std::collections::{BTreeMap, BTreeSet};

use super::{format_number, optional_numeric, require, RenderContext};
use crate::data::RowSet;
use crate::error::{Error, Result};
use crate::frame::{Canvas, Cell, Frame, LegendEntry, RenderStats, Viewport};
use crate::glyph::FULL_BLOCK;
use crate::options::ChartOptions;
use crate::theme::Theme;

/// Most columns or rows shown; the rest are dropped by total.
pub const MAX_LABELS: usize = 20;

/// Narrowest cell.
const MIN_CELL_WIDTH: usize = 6;

/// Narrowest cell when values are printed.
const MIN_VALUE_CELL_WIDTH: usize = 8;

/// Theme used when neither the options nor the context pick one.
const DEFAULT_THEME: &str = "green_yellow_red";

/// Summed values per `(x, y)` label pair.
#[derive(Debug, Clone, Default)]
struct Pivot {
    cells: BTreeMap<(String, String), f64>,
    x_totals: BTreeMap<String, f64>,
    y_totals: BTreeMap<String, f64>,
}

impl Pivot {
    fn add(&mut self, x: String, y: String, value: f64) {
        *self.x_totals.entry(x.clone()).or_insert(0.0) += value;
        *self.y_totals.entry(y.clone()).or_insert(0.0) += value;
        *self.cells.entry((x, y)).or_insert(0.0) += value;
    }
}

/// Labels to draw: all of them sorted, or the top [`MAX_LABELS`] by total.
fn top_labels(totals: &BTreeMap<String, f64>) -> Vec<String> {
    if totals.len() <= MAX_LABELS {
        return totals.keys().cloned().collect();
    }
    let mut ranked: Vec<(&String, f64)> = totals.iter().map(|(k, &v)| (k, v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let kept: BTreeSet<&String> = ranked.into_iter().take(MAX_LABELS).map(|(k, _)| k).collect();
    kept.into_iter().cloned().collect()
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn centered(text: &str, width: usize) -> (usize, String) {
    let text = truncate(text, width);
    let len = text.chars().count();
    ((width.saturating_sub(len)) / 2, text)
}

/// Renders a matrix heatmap.
///
/// Roles: `x` (column label), `y` (row label) and `value` (optional, 1 per
/// row when absent). Values of identical pairs are summed.
pub fn render_matrix(
    rows: &RowSet,
    options: &ChartOptions,
    viewport: Viewport,
    ctx: &RenderContext,
) -> Result<Frame> {
    let x = require(rows, options, "x")?;
    let y = require(rows, options, "y")?;
    let value = optional_numeric(rows, options, "value")?;

    let mut pivot = Pivot::default();
    let mut skipped = 0usize;
    for row in rows.rows() {
        let (Some(xl), Some(yl)) = (row.at(x.index).label(), row.at(y.index).label()) else {
            skipped += 1;
            continue;
        };
        let v = match value {
            Some(b) => match row.at(b.index).as_f64() {
                Some(v) => v,
                None => {
                    skipped += 1;
                    continue;
                }
            },
            None => 1.0,
        };
        pivot.add(xl, yl, v);
    }
    if pivot.cells.is_empty() {
        return Err(Error::EmptyData { rows: rows.len(), skipped });
    }

    let theme = match options.theme.as_deref() {
        Some(_) => ctx.theme_for(options)?,
        None if ctx.theme == Theme::default() => {
            Theme::by_name(DEFAULT_THEME).unwrap_or_else(|| ctx.theme.clone())
        }
        None => ctx.theme.clone(),
    };

    let columns = top_labels(&pivot.x_totals);
    let row_labels = top_labels(&pivot.y_totals);
    if columns.len() < pivot.x_totals.len() || row_labels.len() < pivot.y_totals.len() {
        crate::debug!(
            "matrix",
            "showing {}/{} columns and {}/{} rows",
            columns.len(),
            pivot.x_totals.len(),
            row_labels.len(),
            pivot.y_totals.len()
        );
    }

    let shown: Vec<f64> = row_labels
        .iter()
        .flat_map(|r| columns.iter().filter_map(|c| pivot.cells.get(&(c.clone(), r.clone())).copied()))
        .collect();
    let (min, max) = shown
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let normalize = |v: f64| if max > min { (v - min) / (max - min) } else { 0.5 };

    let width = viewport.width() as usize;
    let longest_y = row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let gutter = longest_y.min((width / 3).max(1));
    let longest_x = columns.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let min_cell = if options.show_values { MIN_VALUE_CELL_WIDTH } else { MIN_CELL_WIDTH };
    let cell_width = min_cell.max(longest_x + 1);

    let mut canvas = Canvas::new(viewport);
    let origin = gutter + 2;
    let to_u32 = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);

    for (j, label) in columns.iter().enumerate() {
        let (pad, text) = centered(label, cell_width - 1);
        canvas.text(to_u32(origin + j * cell_width + pad), 0, &text, None);
    }
    let rule = format!(
        "{}┬{}",
        "─".repeat(gutter + 1),
        "─".repeat(columns.len() * cell_width)
    );
    canvas.text(0, 1, &rule, None);

    for (i, label) in row_labels.iter().enumerate() {
        let line = to_u32(i + 2);
        let text = truncate(label, gutter);
        let indent = gutter - text.chars().count();
        canvas.text(to_u32(indent), line, &format!("{text} │"), None);

        for (j, column) in columns.iter().enumerate() {
            let Some(&v) = pivot.cells.get(&(column.clone(), label.clone())) else { continue };
            let fg = Some(theme.intensity(normalize(v), ctx.color_space));
            let body = if options.show_values {
                format_number(v)
            } else {
                FULL_BLOCK.to_string().repeat(cell_width - 1)
            };
            let (pad, text) = centered(&body, cell_width - 1);
            let start = to_u32(origin + j * cell_width + pad);
            for (k, ch) in text.chars().enumerate() {
                canvas.set(start + to_u32(k), line, Cell::new(ch, fg));
            }
        }
    }

    let legend = if options.show_legend {
        let stops: &[f64] = if max > min { &[0.0, 0.5, 1.0] } else { &[0.5] };
        stops
            .iter()
            .map(|&t| {
                let v = if max > min { min + t * (max - min) } else { min };
                LegendEntry::new(FULL_BLOCK, Some(theme.intensity(t, ctx.color_space)), format_number(v))
            })
            .collect()
    } else {
        Vec::new()
    };

    let stats = RenderStats { rows: rows.len(), skipped, bins: shown.len(), ..RenderStats::default() };
    Ok(canvas.finish(options.title.clone(), legend, stats))
}

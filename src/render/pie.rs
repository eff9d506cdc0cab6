//! Pie charts.

use std::f64::consts::TAU;

use super::{collect_slices, slice_label, RenderContext};
use crate::color::{distinct_colors, TermColor};
use crate::data::RowSet;
use crate::error::Result;
use crate::frame::{Canvas, Cell, Frame, LegendEntry, RenderStats, Viewport};
use crate::glyph::{GlyphMode, BRAILLE_DOTS, FULL_BLOCK};
use crate::options::ChartOptions;

/// Circle centred in the viewport. Cells are about twice as tall as wide, so
/// horizontal distances are halved before testing the radius.
struct Disc {
    cx: f64,
    cy: f64,
    radius: f64,
    /// Cumulative slice end angles, clockwise from 12 o'clock.
    ends: Vec<f64>,
}

impl Disc {
    fn new(width: u32, height: u32, fractions: impl IntoIterator<Item = f64>) -> Self {
        let cx = f64::from(width - 1) / 2.0;
        let cy = f64::from(height - 1) / 2.0;
        let radius = cy.min(f64::from(width - 1) / 4.0).max(0.5);
        let mut acc = 0.0;
        let ends = fractions
            .into_iter()
            .map(|f| {
                acc += f;
                acc * TAU
            })
            .collect();
        Self { cx, cy, radius, ends }
    }

    /// Slice index at a point, `None` outside the circle.
    fn slice_at(&self, x: f64, y: f64) -> Option<usize> {
        let dx = (x - self.cx) / 2.0;
        let dy = y - self.cy;
        if dx * dx + dy * dy > self.radius * self.radius {
            return None;
        }
        let mut theta = dx.atan2(0.0 - dy);
        if theta < 0.0 {
            theta += TAU;
        }
        self.ends
            .iter()
            .position(|&end| theta < end)
            .or_else(|| self.ends.len().checked_sub(1))
    }
}

/// Renders a pie chart.
///
/// Roles: `x` (slice label) and `y` (non-negative value). Values are summed
/// per label and slices ordered by descending value, starting at 12 o'clock
/// and running clockwise.
///
/// # Errors
///
/// [`crate::Error::InvalidValue`] for a negative value or a zero total.
pub fn render_pie(
    rows: &RowSet,
    options: &ChartOptions,
    viewport: Viewport,
    ctx: &RenderContext,
) -> Result<Frame> {
    let (slices, skipped) = collect_slices(rows, options)?;
    let total: f64 = slices.iter().map(|s| s.value).sum();
    let theme = ctx.theme_for(options)?;

    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
    let colors: Vec<TermColor> = distinct_colors(&labels, theme.palette())
        .into_iter()
        .map(|s| s.in_space(ctx.color_space))
        .collect();

    let disc = Disc::new(viewport.width(), viewport.height(), slices.iter().map(|s| s.value / total));
    let mut canvas = Canvas::new(viewport);
    let braille = options.markers == Some(GlyphMode::Braille);

    for y in 0..viewport.height() {
        for x in 0..viewport.width() {
            let cell = if braille {
                braille_cell(&disc, x, y, &colors)
            } else {
                disc.slice_at(f64::from(x), f64::from(y)).map(|i| Cell::new(FULL_BLOCK, colors.get(i).copied()))
            };
            if let Some(cell) = cell {
                canvas.set(x, y, cell);
            }
        }
    }

    let legend = if options.show_legend {
        slices
            .iter()
            .zip(&colors)
            .filter(|(s, _)| s.value > 0.0)
            .map(|(s, &c)| LegendEntry::new(FULL_BLOCK, Some(c), slice_label(s, total)))
            .collect()
    } else {
        Vec::new()
    };
    let stats = RenderStats { rows: rows.len(), skipped, ..RenderStats::default() };
    Ok(canvas.finish(options.title.clone(), legend, stats))
}

/// Tests the 8 sub-dots of a cell; colors it by the slice owning most dots.
fn braille_cell(disc: &Disc, x: u32, y: u32, colors: &[TermColor]) -> Option<Cell> {
    let mut mask = 0u8;
    let mut votes = vec![0u32; colors.len()];
    for (sy, row) in BRAILLE_DOTS.iter().enumerate() {
        for (sx, &bit) in row.iter().enumerate() {
            let px = f64::from(x) + (sx as f64 + 0.5) / 2.0 - 0.5;
            let py = f64::from(y) + (sy as f64 + 0.5) / 4.0 - 0.5;
            if let Some(i) = disc.slice_at(px, py) {
                mask |= bit;
                if let Some(v) = votes.get_mut(i) {
                    *v += 1;
                }
            }
        }
    }
    if mask == 0 {
        return None;
    }
    // ties go to the lower slice index
    let best = votes.iter().enumerate().fold(0usize, |best, (i, &v)| if v > votes[best] { i } else { best });
    Some(Cell::new(crate::glyph::braille(mask), colors.get(best).copied()))
}

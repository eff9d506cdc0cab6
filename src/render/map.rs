//! Geographic maps.
//!
//! Rows are projected equirectangularly (longitude → x, latitude → y) onto
//! the viewport's sub-cell grid, binned, and then drawn per subtype:
//! sub-cell dot masks for points, shade glyphs for intensities, or cluster
//! markers for 8-connected groups of sub-cells.

use std::collections::BTreeMap;

use super::{compact_number, optional, optional_numeric, require_numeric, RenderContext};
use crate::aggregate::{BinGrid, IntensityField};
use crate::color::{TermColor, MUTED};
use crate::data::RowSet;
use crate::error::{Error, Result};
use crate::frame::{Canvas, Cell, Frame, LegendEntry, RenderStats, Viewport};
use crate::glyph::{cluster_marker, shade, GlyphMode, FULL_BLOCK};
use crate::options::{ChartOptions, MapSubtype};
use crate::scale::{Projection, ProjectionKind, Sample};
use crate::theme::Theme;

/// Category keys listed in the legend.
const MAX_LEGEND_KEYS: usize = 16;

/// Intensity drawn for occupied cells that normalize to zero.
const MIN_VISIBLE: f64 = 1e-6;

/// Renders a map.
///
/// Roles: `lat`, `lon` (required, numeric), `value` (optional weight) and
/// `color` (optional category key). Rows with a null coordinate or a null
/// bound value are skipped and counted.
pub fn render_map(
    rows: &RowSet,
    options: &ChartOptions,
    viewport: Viewport,
    ctx: &RenderContext,
) -> Result<Frame> {
    let lat = require_numeric(rows, options, "lat")?;
    let lon = require_numeric(rows, options, "lon")?;
    let value = optional_numeric(rows, options, "value")?;
    let color = optional(rows, options, "color")?;

    let mut samples = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows.rows() {
        let (Some(y), Some(x)) = (row.at(lat.index).as_f64(), row.at(lon.index).as_f64()) else {
            skipped += 1;
            continue;
        };
        let weight = match value {
            Some(b) => match row.at(b.index).as_f64() {
                Some(w) => w,
                None => {
                    skipped += 1;
                    continue;
                }
            },
            None => 1.0,
        };
        let key = color.and_then(|b| row.at(b.index).label());
        samples.push(Sample { x, y, weight, key });
    }
    if skipped > 0 {
        crate::debug!("map", "skipped {skipped} of {} rows with null fields", rows.len());
    }

    let viewport = viewport.with_mode(options.glyph_mode());
    let projection = Projection::fit(
        &samples,
        viewport.sub_grid(),
        ProjectionKind::Equirectangular,
        options.framing,
        &ctx.projection,
    )
    .ok_or(Error::EmptyData { rows: rows.len(), skipped })?;

    let (points, clipped) = projection.project_all(samples);
    if clipped > 0 {
        crate::debug!("map", "clipped {clipped} points outside the window");
    }
    let (sw, sh) = viewport.sub_grid();
    let sub_bins = BinGrid::from_points(sw, sh, &points);
    let (rx, ry) = viewport.resolution();
    let cell_bins = sub_bins.coarsen(rx, ry);

    let painter = Painter {
        viewport,
        theme: ctx.theme_for(options)?,
        space: ctx.color_space,
        accent: ctx.override_color(options)?,
    };
    let mut canvas = Canvas::new(viewport);

    let mut stats = RenderStats { rows: rows.len(), skipped, clipped, bins: cell_bins.len(), clusters: 0 };
    let legend = match options.subtype {
        MapSubtype::Points | MapSubtype::Blocks => painter.points(&mut canvas, &sub_bins, &cell_bins),
        MapSubtype::Clusters => {
            let clusters = painter.clusters(&mut canvas, &sub_bins);
            stats.clusters = clusters;
            cluster_legend()
        }
        subtype => {
            let field = match (subtype, value) {
                (MapSubtype::Density, _) | (_, None) => cell_bins.counts(),
                _ => cell_bins.mean_weights(),
            };
            painter.intensity(&mut canvas, &sub_bins, field.smoothed(options.smoothing))
        }
    };
    crate::debug!("map", "bins={} clusters={}", stats.bins, stats.clusters);

    let legend = if options.show_legend { legend } else { Vec::new() };
    Ok(canvas.finish(options.title.clone(), legend, stats))
}

struct Painter {
    viewport: Viewport,
    theme: Theme,
    space: crate::color::ColorSpace,
    accent: Option<TermColor>,
}

impl Painter {
    fn mode(&self) -> GlyphMode {
        self.viewport.mode()
    }

    /// Sub-cell occupancy masks per terminal cell.
    fn masks(&self, sub_bins: &BinGrid) -> BTreeMap<(u32, u32), u8> {
        let (rx, ry) = self.viewport.resolution();
        let mut masks = BTreeMap::new();
        for ((sx, sy), _) in sub_bins.iter() {
            let bit = self.mode().bit((sx % rx) as u8, (sy % ry) as u8);
            *masks.entry((sx / rx, sy / ry)).or_insert(0u8) |= bit;
        }
        masks
    }

    fn points(&self, canvas: &mut Canvas, sub_bins: &BinGrid, cell_bins: &BinGrid) -> Vec<LegendEntry> {
        for ((x, y), mask) in self.masks(sub_bins) {
            let key = cell_bins.get((x, y)).and_then(|b| b.majority_key());
            let fg = self.accent.or_else(|| key.map(|k| self.theme.category(k, self.space)));
            canvas.set(x, y, Cell::new(self.mode().encode(mask), fg));
        }

        if self.accent.is_some() {
            return Vec::new();
        }
        let mut keys: Vec<&str> = cell_bins.iter().flat_map(|(_, b)| b.keys.keys().map(String::as_str)).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
            .take(MAX_LEGEND_KEYS)
            .map(|k| LegendEntry::new(FULL_BLOCK, Some(self.theme.category(k, self.space)), k))
            .collect()
    }

    fn intensity(&self, canvas: &mut Canvas, sub_bins: &BinGrid, field: IntensityField) -> Vec<LegendEntry> {
        let (lo, hi) = raw_range(&field);
        let masks = self.masks(sub_bins);
        for ((x, y), t) in field.normalized().iter() {
            let t = t.max(MIN_VISIBLE);
            let glyph = match (self.mode(), masks.get(&(x, y))) {
                (GlyphMode::Shade, _) | (_, None) => shade(t),
                (mode, Some(&mask)) => mode.encode(mask),
            };
            canvas.set(x, y, Cell::new(glyph, Some(self.theme.intensity(t, self.space))));
        }

        let bands = self.theme.band_count().max(1);
        let span = hi - lo;
        (0..bands)
            .map(|i| {
                let t = (i as f64 + 0.5) / bands as f64;
                let from = lo + span * i as f64 / bands as f64;
                let to = lo + span * (i + 1) as f64 / bands as f64;
                let glyph = match self.mode() {
                    GlyphMode::Shade => shade(t),
                    mode => mode.encode(0xFF),
                };
                LegendEntry::new(
                    glyph,
                    Some(self.theme.intensity(t, self.space)),
                    format!("{} to {}", compact_number(from), compact_number(to)),
                )
            })
            .collect()
    }

    /// Draws cluster markers; returns the number of clusters.
    fn clusters(&self, canvas: &mut Canvas, sub_bins: &BinGrid) -> usize {
        let (rx, ry) = self.viewport.resolution();
        let clusters = sub_bins.clusters();
        let palette = self.theme.palette();

        // Largest cluster wins a shared cell.
        let mut drawn: BTreeMap<(u32, u32), u64> = BTreeMap::new();
        let mut labels = Vec::new();
        for (i, cluster) in clusters.iter().enumerate() {
            let cell = (cluster.x / rx, cluster.y / ry);
            if drawn.get(&cell).is_some_and(|&n| n >= cluster.count) {
                continue;
            }
            drawn.insert(cell, cluster.count);

            let fg = match (&cluster.key, self.accent) {
                (Some(key), _) => Some(self.theme.category(key, self.space)),
                (None, Some(accent)) => Some(accent),
                (None, None) => palette.get(i % palette.len().max(1)).map(|s| s.in_space(self.space)),
            };
            let count = usize::try_from(cluster.count).unwrap_or(usize::MAX);
            canvas.set(cell.0, cell.1, Cell::new(cluster_marker(count), fg));
            if cluster.count >= 10 {
                labels.push((cell, cluster.count));
            }
        }

        let muted = Some(MUTED.in_space(self.space));
        for ((x, y), count) in labels {
            if x + 2 >= canvas.width() {
                continue;
            }
            let room = (canvas.width() - x - 1).min(3) as usize;
            for (i, digit) in count.to_string().chars().take(room).enumerate() {
                let cx = x + 1 + i as u32;
                if canvas.get(cx, y).is_some_and(Cell::is_blank) {
                    canvas.set(cx, y, Cell::new(digit, muted));
                }
            }
        }
        clusters.len()
    }
}

fn cluster_legend() -> Vec<LegendEntry> {
    [(1, "<5 points"), (5, "5-9"), (10, "10-19"), (20, "20+")]
        .into_iter()
        .map(|(n, label)| LegendEntry::new(cluster_marker(n), None, label))
        .collect()
}

/// Range the normalized intensities stand for.
fn raw_range(field: &IntensityField) -> (f64, f64) {
    let (min, max) = field
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 0.0);
    }
    if min >= 0.0 {
        (0.0, max)
    } else {
        (min, max)
    }
}

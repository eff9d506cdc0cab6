//! Chart renderers.
//!
//! Every renderer is a pure function of a [`RowSet`], [`ChartOptions`], a
//! [`Viewport`] and an explicit [`RenderContext`]; nothing is cached between
//! calls. Errors are checked in a fixed order: unsupported kind, empty
//! row-set, role schema, then value domain.

mod map;
mod matrix;
mod pie;
mod waffle;

pub use map::render_map;
pub use matrix::render_matrix;
pub use pie::render_pie;
pub use waffle::render_waffle;

use crate::color::{parse_color, ColorSpace, TermColor};
use crate::data::RowSet;
use crate::error::{Error, Result};
use crate::frame::{Frame, Viewport};
use crate::options::{ChartKind, ChartOptions};
use crate::scale::ProjectionConfig;
use crate::theme::Theme;

/// Theme, color space and terminal size for a render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// Theme used unless the options name another.
    pub theme: Theme,
    /// Target color space.
    pub color_space: ColorSpace,
    /// Terminal size for percentage dimensions, if known.
    pub terminal: Option<(u32, u32)>,
    /// Projection tunables.
    pub projection: ProjectionConfig,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            color_space: ColorSpace::Palette,
            terminal: None,
            projection: ProjectionConfig::default(),
        }
    }
}

impl RenderContext {
    /// Default context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Sets the color space.
    #[must_use]
    pub fn with_color_space(mut self, space: ColorSpace) -> Self {
        self.color_space = space;
        self
    }

    /// Sets the terminal size.
    #[must_use]
    pub fn with_terminal(mut self, width: u32, height: u32) -> Self {
        self.terminal = Some((width, height));
        self
    }

    /// Sets projection tunables.
    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = projection;
        self
    }

    /// Theme for a render: the options' theme if named, else the context's.
    pub fn theme_for(&self, options: &ChartOptions) -> Result<Theme> {
        match options.theme.as_deref() {
            None => Ok(self.theme.clone()),
            Some(name) => Theme::by_name(name)
                .ok_or_else(|| Error::InvalidColor(format!("unknown theme '{name}'"))),
        }
    }

    /// Parsed color override of the options, in this context's color space.
    pub fn override_color(&self, options: &ChartOptions) -> Result<Option<TermColor>> {
        options
            .color
            .as_deref()
            .map(|c| parse_color(c).map(|s| s.in_space(self.color_space)))
            .transpose()
    }
}

/// Renders a chart into a frame of exactly `viewport` dimensions.
///
/// # Errors
///
/// - [`Error::Unsupported`] for kinds delegated to an external backend
/// - [`Error::EmptyData`] for an empty row-set or when every row is skipped
/// - [`Error::Schema`] when a required role column is missing or mistyped
/// - [`Error::InvalidValue`] for domain violations (negative pie values)
pub fn render(
    rows: &RowSet,
    options: &ChartOptions,
    viewport: Viewport,
    ctx: &RenderContext,
) -> Result<Frame> {
    crate::time_scope!("render", options.kind.as_str());
    crate::trace!(
        "render",
        "kind={} subtype={:?} viewport={}x{} rows={}",
        options.kind,
        options.subtype,
        viewport.width(),
        viewport.height(),
        rows.len()
    );

    if !options.kind.is_native() {
        return Err(Error::Unsupported { kind: options.kind });
    }
    if rows.is_empty() {
        return Err(Error::EmptyData { rows: 0, skipped: 0 });
    }

    let result = match options.kind {
        ChartKind::Map => render_map(rows, options, viewport, ctx),
        ChartKind::Pie => render_pie(rows, options, viewport, ctx),
        ChartKind::Waffle => render_waffle(rows, options, viewport, ctx),
        ChartKind::MatrixHeatmap => render_matrix(rows, options, viewport, ctx),
        kind => Err(Error::Unsupported { kind }),
    };

    match &result {
        Ok(frame) => {
            let stats = frame.stats();
            crate::debug!(
                "render",
                "rows={} skipped={} clipped={} bins={} clusters={}",
                stats.rows,
                stats.skipped,
                stats.clipped,
                stats.bins,
                stats.clusters
            );
        }
        Err(e) => crate::warn!("render", "{e}"),
    }
    result
}

/// Renders with the viewport taken from the options' width/height and the
/// context's terminal size.
pub fn render_fit(rows: &RowSet, options: &ChartOptions, ctx: &RenderContext) -> Result<Frame> {
    let viewport = options.viewport(ctx.terminal)?;
    render(rows, options, viewport, ctx)
}

/// A role resolved to a column index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Binding<'a> {
    pub(crate) column: &'a str,
    pub(crate) index: usize,
}

/// Resolves a required role.
pub(crate) fn require<'a>(
    rows: &RowSet,
    options: &'a ChartOptions,
    role: &'a str,
) -> Result<Binding<'a>> {
    let column = options.role(role);
    let index = rows
        .index_of(column)
        .ok_or_else(|| Error::schema(role, column, "required column not found"))?;
    Ok(Binding { column, index })
}

/// Resolves a required numeric role.
pub(crate) fn require_numeric<'a>(
    rows: &RowSet,
    options: &'a ChartOptions,
    role: &'a str,
) -> Result<Binding<'a>> {
    let binding = require(rows, options, role)?;
    check_numeric(rows, role, binding)?;
    Ok(binding)
}

/// Resolves an optional role: absent unless the column exists or the role
/// was remapped (a remapped role must exist).
pub(crate) fn optional<'a>(
    rows: &RowSet,
    options: &'a ChartOptions,
    role: &'a str,
) -> Result<Option<Binding<'a>>> {
    if options.has_role(role) || rows.has_field(options.role(role)) {
        require(rows, options, role).map(Some)
    } else {
        Ok(None)
    }
}

/// Resolves an optional numeric role.
pub(crate) fn optional_numeric<'a>(
    rows: &RowSet,
    options: &'a ChartOptions,
    role: &'a str,
) -> Result<Option<Binding<'a>>> {
    let binding = optional(rows, options, role)?;
    if let Some(b) = binding {
        check_numeric(rows, role, b)?;
    }
    Ok(binding)
}

fn check_numeric(rows: &RowSet, role: &str, binding: Binding<'_>) -> Result<()> {
    let numeric = rows.field_types()[binding.index].is_numeric();
    let has_values = rows.column(binding.column).any(|v| !v.is_null());
    if !numeric && has_values {
        let found = rows.field_types()[binding.index];
        return Err(Error::schema(role, binding.column, format!("expected numeric values, found {found:?}")));
    }
    Ok(())
}

/// Label and value pairs aggregated by label, for pie and waffle charts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Slice {
    pub(crate) label: String,
    pub(crate) value: f64,
}

/// Sums `y` per `x` label, validating non-negativity and a positive total.
///
/// Slices are ordered by descending value, then label. Returns the slices
/// and the number of rows skipped for nulls.
pub(crate) fn collect_slices(rows: &RowSet, options: &ChartOptions) -> Result<(Vec<Slice>, usize)> {
    let label = require(rows, options, "x")?;
    let value = require_numeric(rows, options, "y")?;

    let mut totals: std::collections::BTreeMap<String, f64> = std::collections::BTreeMap::new();
    let mut skipped = 0usize;
    for (i, row) in rows.rows().enumerate() {
        let (Some(l), Some(v)) = (row.at(label.index).label(), row.at(value.index).as_f64()) else {
            skipped += 1;
            continue;
        };
        if v < 0.0 {
            return Err(Error::InvalidValue {
                field: value.column.to_string(),
                row: i,
                value: v,
                reason: "negative values have no proportion".to_string(),
            });
        }
        *totals.entry(l).or_insert(0.0) += v;
    }

    if totals.is_empty() {
        return Err(Error::EmptyData { rows: rows.len(), skipped });
    }
    let total: f64 = totals.values().sum();
    if total <= 0.0 {
        return Err(Error::InvalidValue {
            field: value.column.to_string(),
            row: rows.len(),
            value: total,
            reason: "total must be greater than zero".to_string(),
        });
    }

    let mut slices: Vec<Slice> = totals.into_iter().map(|(label, value)| Slice { label, value }).collect();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    Ok((slices, skipped))
}

/// Legend line of a slice: `label (42.9%) = 15`.
pub(crate) fn slice_label(slice: &Slice, total: f64) -> String {
    format!("{} ({:.1}%) = {}", slice.label, slice.value / total * 100.0, compact_number(slice.value))
}

/// Formats a number with thousands separators; integers without decimals.
#[must_use]
pub(crate) fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = if (v - v.round()).abs() < 1e-9 { format!("{v:.0}") } else { format!("{v:.1}") };
    let (sign, digits) = rounded.strip_prefix('-').map_or(("", rounded.as_str()), |d| ("-", d));
    let (int, frac) = digits.split_once('.').map_or((digits, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Compact value: `1.5M`, `2.3K`, otherwise [`format_number`].
#[must_use]
pub(crate) fn compact_number(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v.abs() >= 1_000.0 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        format_number(v)
    }
}

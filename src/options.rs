//! Chart options: kind, subtype, sizing, glyph mode, colors and role mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::Viewport;
use crate::glyph::GlyphMode;
use crate::scale::Framing;

/// Chart kinds known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Geographic map (see [`MapSubtype`]).
    #[default]
    Map,
    /// Pie chart.
    Pie,
    /// Waffle (unit grid) chart.
    Waffle,
    /// Pivoted matrix heatmap.
    MatrixHeatmap,
    /// Bar chart, rendered by an external backend.
    Bar,
    /// Line chart, rendered by an external backend.
    Line,
    /// Scatter plot, rendered by an external backend.
    Scatter,
    /// Histogram, rendered by an external backend.
    Histogram,
}

impl ChartKind {
    /// Snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Pie => "pie",
            Self::Waffle => "waffle",
            Self::MatrixHeatmap => "matrix_heatmap",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Histogram => "histogram",
        }
    }

    /// True for kinds this crate renders itself.
    #[must_use]
    pub fn is_native(self) -> bool {
        matches!(self, Self::Map | Self::Pie | Self::Waffle | Self::MatrixHeatmap)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map rendering variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSubtype {
    /// Individual points, colored by category.
    #[default]
    Points,
    /// Half-block points.
    Blocks,
    /// Shade glyphs by point count.
    Density,
    /// Shade glyphs by mean value, gradient colored.
    Heatmap,
    /// Solid blocks, gradient colored by intensity.
    BlocksHeatmap,
    /// Braille dots, gradient colored by cell intensity.
    BrailleHeatmap,
    /// 8-connected cluster markers.
    Clusters,
}

impl MapSubtype {
    /// Glyph mode used when none is configured.
    #[must_use]
    pub fn default_markers(self) -> GlyphMode {
        match self {
            Self::Points | Self::BrailleHeatmap | Self::Clusters => GlyphMode::Braille,
            Self::Blocks => GlyphMode::HalfBlock,
            Self::Density | Self::Heatmap => GlyphMode::Shade,
            Self::BlocksHeatmap => GlyphMode::Block,
        }
    }
}

/// A width or height: absolute cells or a percentage of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    /// Absolute number of cells.
    Cells(u32),
    /// Percentage of the terminal dimension.
    Percent(f64),
}

impl Dimension {
    /// Cells for a terminal dimension; at least 1.
    #[must_use]
    pub fn resolve(self, terminal: u32) -> u32 {
        match self {
            Self::Cells(n) => n,
            Self::Percent(p) => ((f64::from(terminal) * p / 100.0).floor() as u32).max(1),
        }
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::ConfigParse { line: 0, message: format!("invalid dimension '{s}'") };
        if let Some(pct) = s.strip_suffix('%') {
            let p: f64 = pct.trim().parse().map_err(|_| invalid())?;
            if !(p > 0.0 && p <= 100.0) {
                return Err(invalid());
            }
            return Ok(Self::Percent(p));
        }
        s.parse::<u32>().map(Self::Cells).map_err(|_| invalid())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cells(n) => write!(f, "{n}"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Cells(u32),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = Error;

    fn try_from(repr: DimensionRepr) -> Result<Self> {
        match repr {
            DimensionRepr::Cells(n) => Ok(Self::Cells(n)),
            DimensionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(d: Dimension) -> Self {
        match d {
            Dimension::Cells(n) => Self::Cells(n),
            Dimension::Percent(_) => Self::Text(d.to_string()),
        }
    }
}

/// Waffle layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaffleOptions {
    /// Total cells representing 100%.
    pub total_cells: u32,
    /// Cells per grid row.
    pub cells_per_row: u32,
}

impl Default for WaffleOptions {
    fn default() -> Self {
        Self { total_cells: 100, cells_per_row: 10 }
    }
}

fn default_true() -> bool {
    true
}

/// Options for one render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Chart kind.
    #[serde(rename = "chart")]
    pub kind: ChartKind,
    /// Map variant.
    #[serde(rename = "chart_subtype")]
    pub subtype: MapSubtype,
    /// Requested width.
    pub width: Option<Dimension>,
    /// Requested height.
    pub height: Option<Dimension>,
    /// Theme name, overriding the render context's theme.
    pub theme: Option<String>,
    /// Color override (name or `#rrggbb`) for single-color glyphs.
    pub color: Option<String>,
    /// Glyph mode; defaults per map subtype.
    pub markers: Option<GlyphMode>,
    /// Title carried on the frame.
    pub title: Option<String>,
    /// Write values into matrix cells.
    pub show_values: bool,
    /// Emit legend entries.
    #[serde(default = "default_true")]
    pub show_legend: bool,
    /// Blur passes applied to density/heatmap intensities.
    pub smoothing: u32,
    /// Window selection for maps.
    pub framing: Framing,
    /// Role → column overrides.
    pub columns: BTreeMap<String, String>,
    /// Waffle layout.
    pub waffle: WaffleOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            kind: ChartKind::default(),
            subtype: MapSubtype::default(),
            width: None,
            height: None,
            theme: None,
            color: None,
            markers: None,
            title: None,
            show_values: false,
            show_legend: true,
            smoothing: 0,
            framing: Framing::default(),
            columns: BTreeMap::new(),
            waffle: WaffleOptions::default(),
        }
    }
}

impl ChartOptions {
    /// Terminal size assumed when none is known.
    pub const DEFAULT_TERMINAL: (u32, u32) = (80, 24);

    /// Options for a chart kind.
    #[must_use]
    pub fn new(kind: ChartKind) -> Self {
        Self { kind, ..Self::default() }
    }

    /// Map options of a subtype.
    #[must_use]
    pub fn map(subtype: MapSubtype) -> Self {
        Self { kind: ChartKind::Map, subtype, ..Self::default() }
    }

    /// Sets the map subtype.
    #[must_use]
    pub fn subtype(mut self, subtype: MapSubtype) -> Self {
        self.subtype = subtype;
        self
    }

    /// Sets the glyph mode.
    #[must_use]
    pub fn markers(mut self, markers: GlyphMode) -> Self {
        self.markers = Some(markers);
        self
    }

    /// Sets the theme name.
    #[must_use]
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Sets the color override.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Maps a role to a column.
    #[must_use]
    pub fn column(mut self, role: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(role.into(), column.into());
        self
    }

    /// Sets smoothing passes.
    #[must_use]
    pub fn smoothing(mut self, passes: u32) -> Self {
        self.smoothing = passes;
        self
    }

    /// Sets the framing policy.
    #[must_use]
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Toggles values in matrix cells.
    #[must_use]
    pub fn show_values(mut self, show: bool) -> Self {
        self.show_values = show;
        self
    }

    /// Toggles legend entries.
    #[must_use]
    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Column bound to a role (the role name itself unless remapped).
    #[must_use]
    pub fn role<'a>(&'a self, role: &'a str) -> &'a str {
        self.columns.get(role).map_or(role, String::as_str)
    }

    /// True when the role was explicitly remapped.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.columns.contains_key(role)
    }

    /// Glyph mode after applying the subtype default.
    #[must_use]
    pub fn glyph_mode(&self) -> GlyphMode {
        self.markers.unwrap_or_else(|| self.subtype.default_markers())
    }

    /// Resolves width/height against a terminal size into a viewport.
    ///
    /// Unset dimensions take the whole terminal dimension.
    pub fn viewport(&self, terminal: Option<(u32, u32)>) -> Result<Viewport> {
        let (tw, th) = terminal.unwrap_or(Self::DEFAULT_TERMINAL);
        let width = self.width.map_or(tw, |d| d.resolve(tw));
        let height = self.height.map_or(th, |d| d.resolve(th));
        Ok(Viewport::new(width, height)?.with_mode(self.glyph_mode()))
    }
}

impl batuta_common::display::WithDimensions for ChartOptions {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = Some(Dimension::Cells(width));
        self.height = Some(Dimension::Cells(height));
    }
}

//! Viewports and rendered frames.
//!
//! A [`Frame`] is the immutable result of a render call: a row-major grid of
//! [`Cell`]s whose dimensions equal the viewport, plus legend entries and
//! render statistics. Frames never contain escape sequences; see
//! [`crate::output::AnsiEncoder`] for terminal serialization.

use std::fmt;

use crate::color::TermColor;
use crate::error::{Error, Result};
use crate::glyph::{GlyphMode, BLANK};

/// Output dimensions in terminal cells plus the sub-cell resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
    mode: GlyphMode,
}

impl Viewport {
    /// Creates a viewport; both dimensions must be at least 1.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidViewport { width: i64::from(width), height: i64::from(height) });
        }
        Ok(Self { width, height, mode: GlyphMode::default() })
    }

    /// Same dimensions, sub-cell resolution of `mode`.
    #[must_use]
    pub fn with_mode(self, mode: GlyphMode) -> Self {
        Self { mode, ..self }
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Glyph mode fixing the sub-cell multipliers.
    #[must_use]
    pub fn mode(&self) -> GlyphMode {
        self.mode
    }

    /// Sub-cell multipliers `(columns, rows)`.
    #[must_use]
    pub fn resolution(&self) -> (u32, u32) {
        let (x, y) = self.mode.resolution();
        (u32::from(x), u32::from(y))
    }

    /// Sub-cell grid dimensions.
    #[must_use]
    pub fn sub_grid(&self) -> (u32, u32) {
        let (rx, ry) = self.resolution();
        (self.width * rx, self.height * ry)
    }
}

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Display glyph.
    pub glyph: char,
    /// Foreground color.
    pub fg: Option<TermColor>,
    /// Background color.
    pub bg: Option<TermColor>,
}

impl Cell {
    /// Blank cell without colors.
    pub const BLANK: Self = Self { glyph: BLANK, fg: None, bg: None };

    /// Glyph with an optional foreground.
    #[must_use]
    pub const fn new(glyph: char, fg: Option<TermColor>) -> Self {
        Self { glyph, fg, bg: None }
    }

    /// True for a blank glyph without a background.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.glyph == BLANK && self.bg.is_none()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// One legend line: swatch glyph, color and label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Swatch glyph.
    pub glyph: char,
    /// Swatch color.
    pub color: Option<TermColor>,
    /// Label text.
    pub label: String,
}

impl LegendEntry {
    /// New legend entry.
    #[must_use]
    pub fn new(glyph: char, color: Option<TermColor>, label: impl Into<String>) -> Self {
        Self { glyph, color, label: label.into() }
    }
}

/// Counters describing how a row-set became a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Rows in the input.
    pub rows: usize,
    /// Rows skipped for a null required field.
    pub skipped: usize,
    /// Points outside the visible window.
    pub clipped: usize,
    /// Occupied bins.
    pub bins: usize,
    /// Clusters found.
    pub clusters: usize,
}

/// Rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    title: Option<String>,
    legend: Vec<LegendEntry>,
    stats: RenderStats,
}

impl Frame {
    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at `(x, y)`.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    /// Row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Optional title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Legend entries.
    #[must_use]
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Render statistics.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Number of non-blank cells.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }

    /// Glyphs of each row without colors.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.rows().map(|row| row.iter().map(|c| c.glyph).collect()).collect()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Mutable cell grid used while rendering.
#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Canvas {
    pub(crate) fn new(viewport: Viewport) -> Self {
        let (width, height) = (viewport.width(), viewport.height());
        Self { width, height, cells: vec![Cell::BLANK; width as usize * height as usize] }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Sets a cell; out-of-bounds writes are ignored.
    pub(crate) fn set(&mut self, x: u32, y: u32, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y as usize * self.width as usize + x as usize] = cell;
        }
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        (x < self.width && y < self.height)
            .then(|| &self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Writes text starting at `(x, y)`, clipped at the right edge.
    pub(crate) fn text(&mut self, x: u32, y: u32, text: &str, fg: Option<TermColor>) {
        for (i, ch) in text.chars().enumerate() {
            let Ok(offset) = u32::try_from(i) else { break };
            let cx = x.saturating_add(offset);
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg));
        }
    }

    pub(crate) fn finish(
        self,
        title: Option<String>,
        legend: Vec<LegendEntry>,
        stats: RenderStats,
    ) -> Frame {
        Frame { width: self.width, height: self.height, cells: self.cells, title, legend, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_rejects_zero() {
        assert!(matches!(
            Viewport::new(0, 10),
            Err(Error::InvalidViewport { width: 0, height: 10 })
        ));
        assert!(Viewport::new(10, 0).is_err());
        assert!(Viewport::new(1, 1).is_ok());
    }

    #[test]
    fn test_viewport_sub_grid() {
        let v = Viewport::new(10, 5).unwrap();
        assert_eq!(v.sub_grid(), (20, 20));
        assert_eq!(v.with_mode(GlyphMode::HalfBlock).sub_grid(), (10, 10));
        assert_eq!(v.with_mode(GlyphMode::Shade).sub_grid(), (10, 5));
    }

    #[test]
    fn test_canvas_bounds() {
        let mut canvas = Canvas::new(Viewport::new(3, 2).unwrap());
        canvas.set(5, 5, Cell::new('x', None));
        canvas.set(2, 1, Cell::new('x', None));
        assert_eq!(canvas.get(2, 1).map(|c| c.glyph), Some('x'));
        assert!(canvas.get(3, 0).is_none());
    }

    #[test]
    fn test_canvas_text_clips() {
        let mut canvas = Canvas::new(Viewport::new(4, 1).unwrap());
        canvas.text(1, 0, "hello", None);
        let frame = canvas.finish(None, Vec::new(), RenderStats::default());
        assert_eq!(frame.lines(), vec![" hel".to_string()]);
    }

    #[test]
    fn test_frame_accessors() {
        let mut canvas = Canvas::new(Viewport::new(2, 2).unwrap());
        canvas.set(1, 1, Cell::new('█', Some(TermColor::Ansi(9))));
        let frame = canvas.finish(
            Some("t".into()),
            vec![LegendEntry::new('█', None, "x")],
            RenderStats { rows: 1, ..RenderStats::default() },
        );
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.occupied(), 1);
        assert_eq!(frame.cell(1, 1).unwrap().fg, Some(TermColor::Ansi(9)));
        assert!(frame.cell(2, 0).is_none());
        assert_eq!(frame.title(), Some("t"));
        assert_eq!(frame.legend().len(), 1);
        assert_eq!(frame.stats().rows, 1);
        assert_eq!(frame.to_string(), "  \n █");
    }
}

//! ANSI encoder for rendered frames.
//!
//! Frames carry colors as data; this encoder is the only place escape
//! sequences are produced. Palette colors use `38;5;n`, truecolor uses
//! `38;2;r;g;b` (backgrounds `48;...`). Adjacent cells sharing a style are
//! written as one run followed by a single reset.

use std::fmt::Write as FmtWrite;

use crate::color::TermColor;
use crate::frame::{Cell, Frame, LegendEntry};

const RESET: &str = "\x1b[0m";

/// Frame-to-string encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsiEncoder {
    color: bool,
    title: bool,
    legend: bool,
}

impl Default for AnsiEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnsiEncoder {
    /// Colored output with title and legend.
    #[must_use]
    pub fn new() -> Self {
        Self { color: true, title: true, legend: true }
    }

    /// Glyphs only, no escapes.
    #[must_use]
    pub fn plain() -> Self {
        Self { color: false, ..Self::new() }
    }

    /// Emit color escapes.
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Prepend the frame title when it has one.
    #[must_use]
    pub fn title(mut self, title: bool) -> Self {
        self.title = title;
        self
    }

    /// Append one line per legend entry.
    #[must_use]
    pub fn legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Encodes a frame; lines are separated by `\n` without a trailing newline.
    #[must_use]
    pub fn encode(&self, frame: &Frame) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(frame.height() as usize + frame.legend().len() + 1);
        if self.title {
            if let Some(title) = frame.title() {
                lines.push(title.to_string());
            }
        }
        lines.extend(frame.rows().map(|row| self.encode_row(row)));
        if self.legend {
            lines.extend(frame.legend().iter().map(|entry| self.encode_legend(entry)));
        }
        lines.join("\n")
    }

    fn encode_row(&self, row: &[Cell]) -> String {
        let mut out = String::with_capacity(row.len() * 4);
        let mut open: Option<(Option<TermColor>, Option<TermColor>)> = None;
        for cell in row {
            let style = if self.color { (cell.fg, cell.bg) } else { (None, None) };
            if open != Some(style) {
                if matches!(open, Some((fg, bg)) if fg.is_some() || bg.is_some()) {
                    out.push_str(RESET);
                }
                push_style(&mut out, style.0, style.1);
                open = Some(style);
            }
            out.push(cell.glyph);
        }
        if matches!(open, Some((fg, bg)) if fg.is_some() || bg.is_some()) {
            out.push_str(RESET);
        }
        out
    }

    fn encode_legend(&self, entry: &LegendEntry) -> String {
        let mut out = String::new();
        match entry.color.filter(|_| self.color) {
            Some(color) => {
                push_style(&mut out, Some(color), None);
                out.push(entry.glyph);
                out.push_str(RESET);
            }
            None => out.push(entry.glyph),
        }
        out.push(' ');
        out.push_str(&entry.label);
        out
    }
}

fn push_style(out: &mut String, fg: Option<TermColor>, bg: Option<TermColor>) {
    if let Some(fg) = fg {
        push_color(out, 38, fg);
    }
    if let Some(bg) = bg {
        push_color(out, 48, bg);
    }
}

fn push_color(out: &mut String, layer: u8, color: TermColor) {
    let _ = match color {
        TermColor::Ansi(n) => write!(out, "\x1b[{layer};5;{n}m"),
        TermColor::Rgb(c) => write!(out, "\x1b[{layer};2;{};{};{}m", c.r, c.g, c.b),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::frame::{Canvas, RenderStats, Viewport};

    fn frame(cells: &[(u32, Cell)], legend: Vec<LegendEntry>, title: Option<&str>) -> Frame {
        let mut canvas = Canvas::new(Viewport::new(4, 1).unwrap());
        for &(x, cell) in cells {
            canvas.set(x, 0, cell);
        }
        canvas.finish(title.map(str::to_string), legend, RenderStats::default())
    }

    #[test]
    fn test_palette_run_single_reset() {
        let red = Some(TermColor::Ansi(9));
        let f = frame(&[(0, Cell::new('█', red)), (1, Cell::new('█', red))], Vec::new(), None);
        assert_eq!(AnsiEncoder::new().encode(&f), "\x1b[38;5;9m██\x1b[0m  ");
    }

    #[test]
    fn test_truecolor_and_background() {
        let cell = Cell { glyph: 'x', fg: Some(TermColor::Rgb(Rgba::rgb(1, 2, 3))), bg: Some(TermColor::Ansi(4)) };
        let f = frame(&[(3, cell)], Vec::new(), None);
        assert_eq!(AnsiEncoder::new().encode(&f), "   \x1b[38;2;1;2;3m\x1b[48;5;4mx\x1b[0m");
    }

    #[test]
    fn test_style_change_resets() {
        let f = frame(
            &[(0, Cell::new('a', Some(TermColor::Ansi(1)))), (1, Cell::new('b', Some(TermColor::Ansi(2))))],
            Vec::new(),
            None,
        );
        assert_eq!(AnsiEncoder::new().encode(&f), "\x1b[38;5;1ma\x1b[0m\x1b[38;5;2mb\x1b[0m  ");
    }

    #[test]
    fn test_plain_matches_display() {
        let f = frame(&[(1, Cell::new('o', Some(TermColor::Ansi(1))))], Vec::new(), None);
        assert_eq!(AnsiEncoder::plain().encode(&f), f.to_string());
    }

    #[test]
    fn test_title_and_legend_lines() {
        let legend = vec![LegendEntry::new('●', Some(TermColor::Ansi(12)), "blue"), LegendEntry::new('·', None, "none")];
        let f = frame(&[], legend, Some("Sales"));
        let out = AnsiEncoder::new().encode(&f);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["Sales", "    ", "\x1b[38;5;12m●\x1b[0m blue", "· none"]);

        let bare = AnsiEncoder::new().title(false).legend(false).encode(&f);
        assert_eq!(bare, "    ");
    }
}

//! Color types for terminal output.
//!
//! [`Rgba`] is the working representation; [`TermColor`] is what a frame cell
//! carries, either an xterm-256 palette index or a truecolor value depending
//! on the [`ColorSpace`] of the render.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Linear interpolation between two colors; `t` is clamped to [0, 1].
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;

        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Nearest xterm-256 index (6×6×6 cube or grey ramp).
    #[must_use]
    pub fn to_ansi256(self) -> u8 {
        fn cube_level(v: u8) -> u8 {
            match v {
                0..=47 => 0,
                48..=114 => 1,
                _ => (v - 35) / 40,
            }
        }
        const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

        let (r, g, b) = (cube_level(self.r), cube_level(self.g), cube_level(self.b));
        let cube = Self::rgb(LEVELS[r as usize], LEVELS[g as usize], LEVELS[b as usize]);

        let mean = (u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3;
        let grey_step = (if mean > 238 { 23 } else { mean.saturating_sub(3) / 10 }) as u8;
        let grey_value = 8 + 10 * grey_step;
        let grey = Self::rgb(grey_value, grey_value, grey_value);

        if self.distance_sq(grey) < self.distance_sq(cube) {
            232 + grey_step
        } else {
            16 + 36 * r + 6 * g + b
        }
    }

    fn distance_sq(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let v = i32::from(a) - i32::from(b);
            (v * v) as u32
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::InvalidColor(text.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| Error::InvalidColor(text.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Target color space of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// xterm-256 palette indices; portable to low-color terminals.
    #[default]
    Palette,
    /// 24-bit color.
    TrueColor,
}

/// Color attached to a frame cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermColor {
    /// xterm-256 palette index.
    Ansi(u8),
    /// 24-bit color.
    Rgb(Rgba),
}

/// A color known both as a palette index and as RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    /// Palette index used in [`ColorSpace::Palette`].
    pub ansi: u8,
    /// RGB used in [`ColorSpace::TrueColor`].
    pub rgb: Rgba,
}

impl Swatch {
    /// Swatch from RGB, with the palette index approximated.
    #[must_use]
    pub fn from_rgb(rgb: Rgba) -> Self {
        Self { ansi: rgb.to_ansi256(), rgb }
    }

    /// The cell color for a color space.
    #[must_use]
    pub fn in_space(self, space: ColorSpace) -> TermColor {
        match space {
            ColorSpace::Palette => TermColor::Ansi(self.ansi),
            ColorSpace::TrueColor => TermColor::Rgb(self.rgb),
        }
    }
}

const fn swatch(ansi: u8, r: u8, g: u8, b: u8) -> Swatch {
    Swatch { ansi, rgb: Rgba::rgb(r, g, b) }
}

/// Grey used for secondary text such as cluster counts.
pub const MUTED: Swatch = swatch(8, 128, 128, 128);

const NAMED: [(&str, Swatch); 13] = [
    ("red", swatch(9, 255, 85, 85)),
    ("green", swatch(10, 85, 255, 85)),
    ("yellow", swatch(11, 255, 255, 85)),
    ("blue", swatch(12, 85, 85, 255)),
    ("magenta", swatch(13, 255, 85, 255)),
    ("cyan", swatch(14, 85, 255, 255)),
    ("white", swatch(15, 255, 255, 255)),
    ("orange", swatch(208, 255, 135, 0)),
    ("purple", swatch(141, 175, 135, 255)),
    ("pink", swatch(213, 255, 135, 255)),
    ("brown", swatch(130, 175, 95, 0)),
    ("gray", MUTED),
    ("grey", MUTED),
];

/// Look up a named terminal color (case-insensitive).
#[must_use]
pub fn named(name: &str) -> Option<Swatch> {
    let name = name.trim();
    NAMED.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|&(_, s)| s)
}

/// Parse a color name or `#rrggbb` hex value.
pub fn parse_color(text: &str) -> Result<Swatch> {
    if let Some(s) = named(text) {
        return Ok(s);
    }
    if text.trim().starts_with('#') {
        return Rgba::from_hex(text).map(Swatch::from_rgb);
    }
    Err(Error::InvalidColor(text.to_string()))
}

/// Categorical palette of 16 visually distinct colors.
pub const CATEGORY_PALETTE: [Swatch; 16] = [
    swatch(37, 26, 188, 156),
    swatch(32, 52, 152, 219),
    swatch(98, 155, 89, 182),
    swatch(203, 231, 76, 60),
    swatch(208, 230, 126, 34),
    swatch(220, 241, 196, 15),
    swatch(41, 46, 204, 113),
    swatch(247, 149, 165, 166),
    swatch(238, 52, 73, 94),
    swatch(160, 192, 57, 43),
    swatch(97, 142, 68, 173),
    swatch(35, 39, 174, 96),
    swatch(214, 243, 156, 18),
    swatch(166, 211, 84, 0),
    swatch(31, 41, 128, 185),
    swatch(244, 127, 140, 141),
];

/// FNV-1a hash of a category label.
///
/// Stable across processes and platforms, unlike `DefaultHasher`.
#[must_use]
pub fn category_hash(label: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    label.bytes().fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Palette index of a category label.
#[must_use]
pub fn category_index(label: &str, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    (category_hash(label) % palette_len as u64) as usize
}

/// Color of a category label: the named color if the label is one, otherwise
/// a palette entry chosen by hash.
#[must_use]
pub fn category_color(label: &str, palette: &[Swatch]) -> Swatch {
    if let Some(s) = named(label) {
        return s;
    }
    palette.get(category_index(label, palette.len())).copied().unwrap_or(MUTED)
}

/// Distinct palette colors for an ordered set of labels.
///
/// Each label starts at its hash slot and probes forward past slots already
/// taken, so up to `palette.len()` labels never share a color. Labels must be
/// supplied in a deterministic order.
#[must_use]
pub fn distinct_colors<S: AsRef<str>>(labels: &[S], palette: &[Swatch]) -> Vec<Swatch> {
    if palette.is_empty() {
        return vec![MUTED; labels.len()];
    }
    let mut taken = vec![false; palette.len()];
    let mut used = 0usize;

    labels
        .iter()
        .map(|label| {
            if used == palette.len() {
                taken.iter_mut().for_each(|t| *t = false);
                used = 0;
            }
            let mut slot = category_index(label.as_ref(), palette.len());
            while taken[slot] {
                slot = (slot + 1) % palette.len();
            }
            taken[slot] = true;
            used += 1;
            palette[slot]
        })
        .collect()
}

//! Glyph encoding: sub-cell occupancy and intensity to characters.
//!
//! Each [`GlyphMode`] subdivides a terminal cell into a fixed sub-grid.
//! Occupancy of the sub-grid is packed into a bit mask and then encoded to a
//! single character:
//!
//! | Mode         | Sub-grid | Glyphs                    |
//! |--------------|----------|---------------------------|
//! | `braille`    | 2×4      | U+2800..U+28FF            |
//! | `half_block` | 1×2      | `▀` `▄` `█`               |
//! | `block`      | 1×1      | `█`                       |
//! | `shade`      | 1×1      | `░` `▒` `▓` `█` by intensity |

use serde::{Deserialize, Serialize};

/// Blank glyph for unoccupied cells.
pub const BLANK: char = ' ';

/// Solid block.
pub const FULL_BLOCK: char = '█';

/// Upper half block.
pub const UPPER_HALF: char = '▀';

/// Lower half block.
pub const LOWER_HALF: char = '▄';

/// Code point of the empty Braille pattern.
pub const BRAILLE_BASE: u32 = 0x2800;

/// Braille dot bit per sub-cell, indexed `[sub_y][sub_x]`.
///
/// ```text
/// 1 4      0x01 0x08
/// 2 5      0x02 0x10
/// 3 6      0x04 0x20
/// 7 8      0x40 0x80
/// ```
pub const BRAILLE_DOTS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Shading glyphs from empty to full.
pub const SHADES: [char; 5] = [BLANK, '░', '▒', '▓', FULL_BLOCK];

/// Sub-cell addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphMode {
    /// 2×4 Braille dots.
    #[default]
    Braille,
    /// One solid block per occupied cell.
    Block,
    /// Upper/lower half blocks.
    HalfBlock,
    /// Shading by intensity.
    Shade,
}

impl GlyphMode {
    /// Sub-cell multipliers `(columns, rows)` per terminal cell.
    #[must_use]
    pub const fn resolution(self) -> (u8, u8) {
        match self {
            Self::Braille => (2, 4),
            Self::HalfBlock => (1, 2),
            Self::Block | Self::Shade => (1, 1),
        }
    }

    /// Occupancy bit of a sub-cell within its terminal cell.
    ///
    /// Out-of-range sub-cell coordinates yield 0.
    #[must_use]
    pub fn bit(self, sub_x: u8, sub_y: u8) -> u8 {
        let (w, h) = self.resolution();
        if sub_x >= w || sub_y >= h {
            return 0;
        }
        match self {
            Self::Braille => BRAILLE_DOTS[sub_y as usize][sub_x as usize],
            Self::HalfBlock => 1 << sub_y,
            Self::Block | Self::Shade => 1,
        }
    }

    /// Encodes an occupancy mask built from [`GlyphMode::bit`].
    #[must_use]
    pub fn encode(self, mask: u8) -> char {
        match self {
            Self::Braille => braille(mask),
            Self::HalfBlock => half_block(mask & 0b01 != 0, mask & 0b10 != 0),
            Self::Block | Self::Shade => {
                if mask == 0 {
                    BLANK
                } else {
                    FULL_BLOCK
                }
            }
        }
    }
}

/// The Braille pattern for a dot mask.
#[must_use]
pub fn braille(mask: u8) -> char {
    char::from_u32(BRAILLE_BASE + u32::from(mask)).unwrap_or(BLANK)
}

/// Packs a 2×4 occupancy grid (`[sub_y][sub_x]`) into its Braille pattern.
#[must_use]
pub fn pack_braille(grid: [[bool; 2]; 4]) -> char {
    let mut mask = 0u8;
    for (row, bits) in grid.iter().zip(BRAILLE_DOTS.iter()) {
        for (&on, &bit) in row.iter().zip(bits.iter()) {
            if on {
                mask |= bit;
            }
        }
    }
    braille(mask)
}

/// Half-block glyph for top/bottom occupancy.
#[must_use]
pub fn half_block(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (true, true) => FULL_BLOCK,
        (true, false) => UPPER_HALF,
        (false, true) => LOWER_HALF,
        (false, false) => BLANK,
    }
}

/// Shade glyph for a normalized intensity.
///
/// Bands: `(0, .25]` `░`, `(.25, .5]` `▒`, `(.5, .75]` `▓`, `(.75, 1]` `█`.
/// Zero, negative and NaN intensities are blank.
#[must_use]
pub fn shade(intensity: f64) -> char {
    if intensity.is_nan() || intensity <= 0.0 {
        return BLANK;
    }
    let band = (intensity.min(1.0) * 4.0).ceil() as usize;
    SHADES[band.clamp(1, 4)]
}

/// Cluster marker by point count.
#[must_use]
pub fn cluster_marker(count: usize) -> char {
    match count {
        0..=4 => '•',
        5..=9 => '◉',
        10..=19 => '◎',
        _ => '⊕',
    }
}

//! Themes: a truecolor gradient, a palette band ramp and a categorical palette.

use serde::{Deserialize, Serialize};

use crate::color::{parse_color, ColorSpace, Rgba, Swatch, TermColor, CATEGORY_PALETTE};
use crate::error::{Error, Result};

/// A multi-stop color gradient.
///
/// Serialized as a list of color strings (`#rrggbb` or names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Gradient {
    stops: Vec<Rgba>,
}

impl Gradient {
    /// Creates a gradient from explicit stops.
    ///
    /// # Errors
    ///
    /// Returns an error if `stops` is empty.
    pub fn new(stops: Vec<Rgba>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::InvalidColor("gradient needs at least one stop".to_string()));
        }
        Ok(Self { stops })
    }

    /// Parses a gradient from color strings.
    pub fn parse<S: AsRef<str>>(stops: &[S]) -> Result<Self> {
        let stops =
            stops.iter().map(|s| parse_color(s.as_ref()).map(|c| c.rgb)).collect::<Result<_>>()?;
        Self::new(stops)
    }

    /// The configured stops.
    #[must_use]
    pub fn stops(&self) -> &[Rgba] {
        &self.stops
    }

    /// Samples the gradient at position t (clamped to 0.0 - 1.0).
    ///
    /// Interpolation is piecewise-linear in RGB between adjacent stops.
    #[must_use]
    pub fn sample(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self.stops.as_slice() {
            [] => Rgba::WHITE,
            [only] => *only,
            stops => {
                let segment_count = stops.len() - 1;
                let scaled = t * segment_count as f64;
                let segment = (scaled.floor() as usize).min(segment_count - 1);
                let local_t = scaled - segment as f64;
                stops[segment].lerp(stops[segment + 1], local_t)
            }
        }
    }
}

impl TryFrom<Vec<String>> for Gradient {
    type Error = Error;

    fn try_from(stops: Vec<String>) -> Result<Self> {
        Self::parse(&stops)
    }
}

impl From<Gradient> for Vec<String> {
    fn from(gradient: Gradient) -> Self {
        gradient
            .stops
            .iter()
            .map(|c| format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b))
            .collect()
    }
}

/// Built-in theme names.
pub const THEME_NAMES: [&str; 8] = [
    "default",
    "green_yellow_red",
    "blue_white_red",
    "cool_warm",
    "viridis",
    "magma",
    "blues",
    "heat",
];

/// Colors used by a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    name: String,
    gradient: Gradient,
    bands: Vec<u8>,
    palette: Vec<Swatch>,
}

impl Default for Theme {
    fn default() -> Self {
        // blue, cyan, green, yellow, red
        Self {
            name: "default".to_string(),
            gradient: Gradient {
                stops: vec![
                    Rgba::rgb(85, 85, 255),
                    Rgba::rgb(85, 255, 255),
                    Rgba::rgb(85, 255, 85),
                    Rgba::rgb(255, 255, 85),
                    Rgba::rgb(255, 85, 85),
                ],
            },
            bands: vec![12, 14, 10, 11, 9],
            palette: CATEGORY_PALETTE.to_vec(),
        }
    }
}

impl Theme {
    /// Builds a theme whose palette bands are derived from its gradient.
    #[must_use]
    pub fn from_gradient(name: impl Into<String>, gradient: Gradient) -> Self {
        const BANDS: usize = 5;
        let bands = (0..BANDS)
            .map(|i| gradient.sample((i as f64 + 0.5) / BANDS as f64).to_ansi256())
            .collect();
        Self { name: name.into(), gradient, bands, palette: CATEGORY_PALETTE.to_vec() }
    }

    /// Looks up a built-in theme.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        let rgb = |stops: &[(u8, u8, u8)]| Gradient {
            stops: stops.iter().map(|&(r, g, b)| Rgba::rgb(r, g, b)).collect(),
        };
        let gradient = match name.trim().to_ascii_lowercase().as_str() {
            "default" => return Some(Self::default()),
            "green_yellow_red" => rgb(&[(0, 255, 0), (255, 255, 0), (255, 0, 0)]),
            "blue_white_red" => rgb(&[(0, 0, 255), (255, 255, 255), (255, 0, 0)]),
            "cool_warm" => rgb(&[(0, 0, 255), (255, 220, 200), (255, 80, 0)]),
            "viridis" => rgb(&[(68, 1, 84), (59, 82, 139), (33, 145, 140), (94, 201, 98), (253, 231, 37)]),
            "magma" => rgb(&[(0, 0, 4), (81, 18, 124), (183, 55, 121), (252, 137, 97), (252, 253, 191)]),
            "blues" => {
                rgb(&[(247, 251, 255), (198, 219, 239), (107, 174, 214), (33, 113, 181), (8, 48, 107)])
            }
            "heat" => rgb(&[(128, 0, 0), (255, 0, 0), (255, 128, 0), (255, 255, 0), (255, 255, 255)]),
            _ => return None,
        };
        Some(Self::from_gradient(name.trim().to_ascii_lowercase(), gradient))
    }

    /// Replaces the categorical palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Vec<Swatch>) -> Self {
        if !palette.is_empty() {
            self.palette = palette;
        }
        self
    }

    /// Theme name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The truecolor gradient.
    #[must_use]
    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// The categorical palette.
    #[must_use]
    pub fn palette(&self) -> &[Swatch] {
        &self.palette
    }

    /// Number of discrete intensity bands in palette mode.
    #[must_use]
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band index of a normalized intensity.
    #[must_use]
    pub fn band(&self, t: f64) -> usize {
        let n = self.bands.len().max(1);
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        ((t * n as f64) as usize).min(n - 1)
    }

    /// Color of a normalized intensity.
    ///
    /// Palette mode quantizes into the band ramp; truecolor samples the gradient.
    #[must_use]
    pub fn intensity(&self, t: f64, space: ColorSpace) -> TermColor {
        match space {
            ColorSpace::Palette => match self.bands.get(self.band(t)) {
                Some(&ansi) => TermColor::Ansi(ansi),
                None => TermColor::Ansi(self.gradient.sample(t).to_ansi256()),
            },
            ColorSpace::TrueColor => TermColor::Rgb(self.gradient.sample(t)),
        }
    }

    /// Color of a category label.
    #[must_use]
    pub fn category(&self, label: &str, space: ColorSpace) -> TermColor {
        crate::color::category_color(label, &self.palette).in_space(space)
    }
}

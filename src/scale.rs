//! Domains, axes and cell projection.
//!
//! An [`Axis`] maps a data domain linearly onto grid positions. A [`Projection`] pairs
//! two [`Axis`] scales and maps (x, y) samples onto the integer sub-cell grid
//! of a viewport. Geographic projection is equirectangular: longitude is
//! linear on the horizontal axis, latitude linear on the vertical axis, with
//! no spherical correction.
//!
//! Degenerate domains never raise: a zero-width domain is widened
//! symmetrically so a constant field still lands on a real cell.

use serde::{Deserialize, Serialize};

/// Closed numeric interval `[min, max]` with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    min: f64,
    max: f64,
}

impl Domain {
    /// Minimum absolute half-width used when widening a point domain.
    pub const EPSILON: f64 = 1e-6;

    /// Creates a domain; the bounds may be given in either order.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Min/max over the finite values; `None` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, v| {
            Some(match acc {
                None => Self::new(v, v),
                Some(d) => Self::new(d.min.min(v), d.max.max(v)),
            })
        })
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// `max - min`.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint.
    #[must_use]
    pub fn center(&self) -> f64 {
        self.min + self.span() / 2.0
    }

    /// True when the bounds coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.span() <= 0.0
    }

    /// Inclusive containment.
    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Widens a zero-width domain to `center ± max(|center|·1e-6, 1e-6)`.
    #[must_use]
    pub fn non_degenerate(self) -> Self {
        if !self.is_degenerate() {
            return self;
        }
        let c = self.center();
        let half = (c.abs() * Self::EPSILON).max(Self::EPSILON);
        Self::new(c - half, c + half)
    }

    /// Widens the domain symmetrically to at least `min_span`.
    #[must_use]
    pub fn widened(self, min_span: f64) -> Self {
        if min_span.is_nan() || min_span <= 0.0 || self.span() >= min_span {
            return self;
        }
        let c = self.center();
        Self::new(c - min_span / 2.0, c + min_span / 2.0)
    }

    /// Position of `v` within the domain, 0.0 at `min` and 1.0 at `max`.
    #[must_use]
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.5;
        }
        (v - self.min) / span
    }
}

/// A linear scale onto the integer positions `0..len`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    domain: Domain,
    len: u32,
}

impl Axis {
    /// Axis over `len` positions (at least one).
    #[must_use]
    pub fn new(domain: Domain, len: u32) -> Self {
        let len = len.max(1);
        Self { domain: domain.non_degenerate(), len }
    }

    /// Number of positions.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.len
    }

    /// The (widened) domain.
    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Position of `v`: rounded, then clamped to `[0, len - 1]`.
    #[must_use]
    pub fn index(&self, v: f64) -> u32 {
        let pos = (self.domain.normalize(v) * f64::from(self.len - 1)).round();
        if pos.is_nan() || pos <= 0.0 {
            0
        } else {
            (pos as u32).min(self.len - 1)
        }
    }
}

/// How the visible window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Observed bounding box of all points.
    #[default]
    Extent,
    /// The central `coverage` fraction of points per axis; the rest are clipped.
    DensityCore,
}

/// Linear for generic charts, equirectangular for maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Plain linear mapping on both axes.
    Linear,
    /// Longitude → x, latitude → y, with the geographic minimum span.
    Equirectangular,
}

/// Tunables for projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Minimum span in degrees of a geographic domain.
    pub min_geo_span: f64,
    /// Fraction of points kept by [`Framing::DensityCore`].
    pub coverage: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { min_geo_span: 0.01, coverage: 0.9 }
    }
}

/// A raw sample before projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Horizontal value (longitude for maps).
    pub x: f64,
    /// Vertical value (latitude for maps).
    pub y: f64,
    /// Weight carried into aggregation.
    pub weight: f64,
    /// Optional color-group key.
    pub key: Option<String>,
}

impl Sample {
    /// Unit-weight sample without a key.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, weight: 1.0, key: None }
    }
}

/// A sample reduced to sub-cell coordinates.
///
/// Coordinates are in the sub-cell grid; divide by the viewport's
/// multipliers for terminal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    /// Sub-cell column, 0 at the left.
    pub x: u32,
    /// Sub-cell row, 0 at the top.
    pub y: u32,
    /// Weight (1.0 when the row-set has no value field).
    pub weight: f64,
    /// Optional color-group key.
    pub key: Option<String>,
}

/// Maps (x, y) samples onto a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    x: Axis,
    y: Axis,
    window: Option<(Domain, Domain)>,
}

impl Projection {
    /// Fits a projection to the given samples.
    ///
    /// Returns `None` when no sample has finite coordinates.
    #[must_use]
    pub fn fit(
        samples: &[Sample],
        grid: (u32, u32),
        kind: ProjectionKind,
        framing: Framing,
        config: &ProjectionConfig,
    ) -> Option<Self> {
        let xs: Vec<f64> = samples.iter().map(|s| s.x).filter(|v| v.is_finite()).collect();
        let ys: Vec<f64> = samples.iter().map(|s| s.y).filter(|v| v.is_finite()).collect();

        let (x_dom, y_dom, window) = match framing {
            Framing::Extent => (Domain::from_values(xs)?, Domain::from_values(ys)?, None),
            Framing::DensityCore => {
                let x_dom = core_domain(xs, config.coverage)?;
                let y_dom = core_domain(ys, config.coverage)?;
                (x_dom, y_dom, Some((x_dom, y_dom)))
            }
        };

        let (x_dom, y_dom) = match kind {
            ProjectionKind::Linear => (x_dom, y_dom),
            ProjectionKind::Equirectangular => {
                (x_dom.widened(config.min_geo_span), y_dom.widened(config.min_geo_span))
            }
        };

        Some(Self { x: Axis::new(x_dom, grid.0), y: Axis::new(y_dom, grid.1), window })
    }

    /// Horizontal axis.
    #[must_use]
    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    /// Vertical axis (not flipped; see [`Projection::project`]).
    #[must_use]
    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    /// Grid position of a sample, with larger `y` toward the top.
    ///
    /// Returns `None` for non-finite coordinates or points outside the
    /// density-core window.
    #[must_use]
    pub fn project(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        if let Some((wx, wy)) = &self.window {
            if !wx.contains(x) || !wy.contains(y) {
                return None;
            }
        }
        let col = self.x.index(x);
        let row = self.y.size() - 1 - self.y.index(y);
        Some((col, row))
    }

    /// Projects every sample; returns the points and the number clipped.
    #[must_use]
    pub fn project_all(&self, samples: Vec<Sample>) -> (Vec<ProjectedPoint>, usize) {
        let mut clipped = 0usize;
        let mut points = Vec::with_capacity(samples.len());
        for s in samples {
            match self.project(s.x, s.y) {
                Some((x, y)) => points.push(ProjectedPoint { x, y, weight: s.weight, key: s.key }),
                None => clipped += 1,
            }
        }
        (points, clipped)
    }
}

/// Domain covering the central `coverage` fraction of `values`.
fn core_domain(mut values: Vec<f64>, coverage: f64) -> Option<Domain> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let coverage = if coverage.is_nan() { 1.0 } else { coverage.clamp(0.0, 1.0) };
    let tail = (1.0 - coverage) / 2.0;
    let last = values.len() - 1;
    // nudge so that exact ranks survive float error in `tail`
    let lo = (tail * last as f64 + 1e-9).floor() as usize;
    let hi = ((1.0 - tail) * last as f64 - 1e-9).ceil() as usize;
    Some(Domain::new(values[lo.min(last)], values[hi.min(last)]))
}

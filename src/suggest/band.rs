//! Fit bands for suggestion scoring.

use serde::{Deserialize, Serialize};

/// A preferred interval with linear falloff.
///
/// Values inside `[ideal_min, ideal_max]` fit perfectly (1.0). Below the
/// ideal the fit falls linearly to 0.0 at `hard_min`; above it, to 0.0 at
/// `hard_max`. Values at or beyond a hard limit fit 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// First low value that scores zero.
    pub hard_min: f64,
    /// Start of the ideal interval.
    pub ideal_min: f64,
    /// End of the ideal interval.
    pub ideal_max: f64,
    /// First high value that scores zero.
    pub hard_max: f64,
}

impl Band {
    /// Band from its four limits.
    #[must_use]
    pub const fn new(hard_min: f64, ideal_min: f64, ideal_max: f64, hard_max: f64) -> Self {
        Self { hard_min, ideal_min, ideal_max, hard_max }
    }

    /// Open-ended band: ramps up to `ideal_min` and stays at 1.0.
    #[must_use]
    pub const fn at_least(hard_min: f64, ideal_min: f64) -> Self {
        Self::new(hard_min, ideal_min, f64::INFINITY, f64::INFINITY)
    }

    /// True when the limits are ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.hard_min <= self.ideal_min && self.ideal_min <= self.ideal_max && self.ideal_max <= self.hard_max
    }

    /// Fit of a value in `[0, 1]`.
    #[must_use]
    pub fn fit(&self, v: f64) -> f64 {
        if v.is_nan() {
            return 0.0;
        }
        if v >= self.ideal_min && v <= self.ideal_max {
            return 1.0;
        }
        if v <= self.hard_min || v >= self.hard_max {
            return 0.0;
        }
        if v < self.ideal_min {
            (v - self.hard_min) / (self.ideal_min - self.hard_min)
        } else {
            (self.hard_max - v) / (self.hard_max - self.ideal_max)
        }
    }

    /// Fit of a count.
    #[must_use]
    pub fn fit_count(&self, n: usize) -> f64 {
        self.fit(n as f64)
    }
}

//! YAML configuration.
//!
//! A config file supplies the defaults a caller would otherwise pass by hand:
//! theme, color space, chart options, suggestion thresholds and projection
//! tunables. Every section is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::ColorSpace;
use crate::error::{Error, Result};
use crate::options::ChartOptions;
use crate::render::RenderContext;
use crate::scale::ProjectionConfig;
use crate::suggest::SuggestionConfig;
use crate::theme::{Gradient, Theme};

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Built-in theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Custom gradient stops (`#rrggbb` or names) replacing the theme's gradient.
    #[serde(default)]
    pub gradient: Option<Vec<String>>,

    /// Target color space.
    #[serde(default)]
    pub color_space: ColorSpace,

    /// Default chart options.
    #[serde(default)]
    pub chart: ChartOptions,

    /// Suggestion thresholds.
    #[serde(default)]
    pub suggest: SuggestionConfig,

    /// Projection tunables.
    #[serde(default)]
    pub projection: ProjectionConfig,
}

fn default_version() -> u32 {
    1
}
fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            theme: default_theme(),
            gradient: None,
            color_space: ColorSpace::default(),
            chart: ChartOptions::default(),
            suggest: SuggestionConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the offending line, also when a
    /// suggestion band's limits are out of order.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse { line, message: e.to_string() }
        })?;

        if let Some(name) = config.suggest.invalid_band() {
            let key = format!("{name}:");
            let line = yaml
                .lines()
                .position(|l| l.trim_start().starts_with(&key))
                .map_or(0, |i| i + 1);
            return Err(Error::ConfigParse {
                line,
                message: format!("suggest.{name}: expected hard_min <= ideal_min <= ideal_max <= hard_max"),
            });
        }
        Ok(config)
    }

    /// Loads configuration, or returns defaults if the file is missing or invalid.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// The configured theme, with the gradient override applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for an unknown theme name or a bad stop.
    pub fn theme(&self) -> Result<Theme> {
        let theme = Theme::by_name(&self.theme)
            .ok_or_else(|| Error::InvalidColor(format!("unknown theme '{}'", self.theme)))?;
        match &self.gradient {
            None => Ok(theme),
            Some(stops) => {
                let palette = theme.palette().to_vec();
                Ok(Theme::from_gradient(theme.name(), Gradient::parse(stops)?).with_palette(palette))
            }
        }
    }

    /// Render context built from this configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Config::theme`].
    pub fn context(&self) -> Result<RenderContext> {
        Ok(RenderContext::new()
            .with_theme(self.theme()?)
            .with_color_space(self.color_space)
            .with_projection(self.projection))
    }
}

//! Chart suggestions.
//!
//! The engine scores a [`SchemaSummary`] against a declarative table of
//! archetype rules (see [`rules::RULES`]). Each rule generates candidate
//! column mappings with a band-based fit; the score is
//!
//! ```text
//! score = (base weight + bonus) × fit × (1 − mean null rate of mapped columns)
//! ```
//!
//! Suggestions are sorted by descending score, then archetype priority, then
//! mapping, so identical summaries always produce identical rankings.

mod band;
pub mod rules;

pub use band::Band;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::RowSet;
use crate::options::{ChartKind, ChartOptions, MapSubtype};
use crate::schema::SchemaSummary;

/// Chart archetypes, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Point map.
    MapPoints,
    /// Cluster map.
    MapClusters,
    /// Density map.
    MapDensity,
    /// Value heatmap map.
    MapHeatmap,
    /// Pie chart.
    Pie,
    /// Waffle chart.
    Waffle,
    /// Matrix heatmap.
    MatrixHeatmap,
    /// Bar chart.
    Bar,
    /// Line chart.
    Line,
    /// Scatter plot.
    Scatter,
    /// Histogram.
    Histogram,
}

impl Archetype {
    /// All archetypes in priority order.
    pub const ALL: [Archetype; 11] = [
        Self::MapPoints,
        Self::MapClusters,
        Self::MapDensity,
        Self::MapHeatmap,
        Self::Pie,
        Self::Waffle,
        Self::MatrixHeatmap,
        Self::Bar,
        Self::Line,
        Self::Scatter,
        Self::Histogram,
    ];

    /// Rank in tie-breaks; 0 is highest.
    #[must_use]
    pub fn priority(self) -> usize {
        self as usize
    }

    /// Chart kind rendering this archetype.
    #[must_use]
    pub fn kind(self) -> ChartKind {
        match self {
            Self::MapPoints | Self::MapClusters | Self::MapDensity | Self::MapHeatmap => ChartKind::Map,
            Self::Pie => ChartKind::Pie,
            Self::Waffle => ChartKind::Waffle,
            Self::MatrixHeatmap => ChartKind::MatrixHeatmap,
            Self::Bar => ChartKind::Bar,
            Self::Line => ChartKind::Line,
            Self::Scatter => ChartKind::Scatter,
            Self::Histogram => ChartKind::Histogram,
        }
    }

    /// Map subtype for map archetypes.
    #[must_use]
    pub fn subtype(self) -> Option<MapSubtype> {
        match self {
            Self::MapPoints => Some(MapSubtype::Points),
            Self::MapClusters => Some(MapSubtype::Clusters),
            Self::MapDensity => Some(MapSubtype::Density),
            Self::MapHeatmap => Some(MapSubtype::Heatmap),
            _ => None,
        }
    }

    /// Snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MapPoints => "map_points",
            Self::MapClusters => "map_clusters",
            Self::MapDensity => "map_density",
            Self::MapHeatmap => "map_heatmap",
            Self::Pie => "pie",
            Self::Waffle => "waffle",
            Self::MatrixHeatmap => "matrix_heatmap",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Histogram => "histogram",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every threshold the suggestion engine uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Distinct labels for a pie chart.
    pub pie: Band,
    /// Distinct labels for a waffle chart.
    pub waffle: Band,
    /// Distinct labels for a bar chart.
    pub bar: Band,
    /// Distinct labels per matrix heatmap dimension.
    pub matrix: Band,
    /// Distinct labels of a map color grouping.
    pub map_color: Band,
    /// Distinct values of a continuous field (line, scatter, histogram).
    pub continuous: Band,
    /// Added to the base weight of matrix heatmaps over a date-like dimension.
    pub date_bonus: f64,
    /// Suggestions kept per archetype.
    pub max_per_archetype: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            pie: Band::new(1.0, 2.0, 5.0, 9.0),
            waffle: Band::new(1.0, 2.0, 6.0, 11.0),
            bar: Band::new(1.0, 3.0, 20.0, 51.0),
            matrix: Band::new(1.0, 3.0, 12.0, 21.0),
            map_color: Band::new(1.0, 2.0, 8.0, 31.0),
            continuous: Band::at_least(1.0, 10.0),
            date_bonus: 0.03,
            max_per_archetype: 3,
        }
    }
}

impl SuggestionConfig {
    /// Named fit bands, in declaration order.
    #[must_use]
    pub fn bands(&self) -> [(&'static str, Band); 6] {
        [
            ("pie", self.pie),
            ("waffle", self.waffle),
            ("bar", self.bar),
            ("matrix", self.matrix),
            ("map_color", self.map_color),
            ("continuous", self.continuous),
        ]
    }

    /// Name of the first band whose limits are out of order.
    #[must_use]
    pub fn invalid_band(&self) -> Option<&'static str> {
        self.bands().into_iter().find(|(_, band)| !band.is_valid()).map(|(name, _)| name)
    }
}

/// A scored chart recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Matched archetype.
    pub archetype: Archetype,
    /// Chart kind to render.
    pub kind: ChartKind,
    /// Map subtype, for map archetypes.
    pub subtype: Option<MapSubtype>,
    /// Role → column.
    pub mapping: BTreeMap<String, String>,
    /// Confidence in `(0, 1]`.
    pub score: f64,
}

impl Suggestion {
    /// Chart options rendering this suggestion.
    #[must_use]
    pub fn options(&self) -> ChartOptions {
        let mut options = ChartOptions::new(self.kind);
        if let Some(subtype) = self.subtype {
            options.subtype = subtype;
        }
        for (role, column) in &self.mapping {
            options = options.column(role.as_str(), column.as_str());
        }
        options
    }

    /// Column mapped to a role.
    #[must_use]
    pub fn column(&self, role: &str) -> Option<&str> {
        self.mapping.get(role).map(String::as_str)
    }
}

/// Ranks chart archetypes for a schema summary.
#[must_use]
pub fn suggest(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Suggestion> {
    crate::time_scope!("suggest", "suggest");
    if summary.row_count == 0 {
        return Vec::new();
    }

    let mut suggestions: Vec<Suggestion> = Vec::new();
    for rule in rules::RULES {
        for candidate in (rule.candidates)(summary, config) {
            let score = rule.score(summary, &candidate);
            if score > 0.0 {
                suggestions.push(Suggestion {
                    archetype: rule.archetype,
                    kind: rule.archetype.kind(),
                    subtype: rule.archetype.subtype(),
                    mapping: candidate.mapping,
                    score,
                });
            }
        }
    }

    suggestions.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.archetype.priority().cmp(&b.archetype.priority()))
            .then_with(|| a.mapping.cmp(&b.mapping))
    });

    let mut per_archetype: BTreeMap<Archetype, usize> = BTreeMap::new();
    suggestions.retain(|s| {
        let n = per_archetype.entry(s.archetype).or_insert(0);
        *n += 1;
        *n <= config.max_per_archetype
    });

    crate::debug!("suggest", "{} suggestions for {} columns", suggestions.len(), summary.columns.len());
    suggestions
}

/// Summarizes a row-set and ranks it.
#[must_use]
pub fn suggest_rows(rows: &RowSet, config: &SuggestionConfig) -> Vec<Suggestion> {
    suggest(&SchemaSummary::from_row_set(rows), config)
}

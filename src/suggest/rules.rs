//! Declarative archetype rules.
//!
//! Each [`Rule`] names its archetype, the roles a mapping must bind, a base
//! weight and a candidate generator. Generators only look at the schema
//! summary and the configured bands, so each rule can be tested alone.

use std::collections::BTreeMap;

use super::{Archetype, SuggestionConfig};
use crate::data::FieldType;
use crate::schema::{ColumnProfile, SchemaSummary};

/// Name fragments that make a dimension date-like.
pub const DATE_TERMS: [&str; 6] = ["year", "month", "quarter", "week", "day", "hour"];

/// A column mapping produced by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Role → column.
    pub mapping: BTreeMap<String, String>,
    /// Band fit in `[0, 1]`.
    pub fit: f64,
    /// Added to the rule's base weight.
    pub bonus: f64,
}

impl Candidate {
    fn new(roles: &[(&str, &ColumnProfile)], fit: f64) -> Self {
        let mapping = roles.iter().map(|(role, c)| ((*role).to_string(), c.name.clone())).collect();
        Self { mapping, fit, bonus: 0.0 }
    }

    fn with(mut self, role: &str, column: &ColumnProfile) -> Self {
        self.mapping.insert(role.to_string(), column.name.clone());
        self
    }

    fn bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }
}

/// Candidate generator.
pub type Generator = fn(&SchemaSummary, &SuggestionConfig) -> Vec<Candidate>;

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Archetype suggested.
    pub archetype: Archetype,
    /// Roles every mapping must bind.
    pub roles: &'static [&'static str],
    /// Base weight.
    pub weight: f64,
    /// Candidate mappings with their fits.
    pub candidates: Generator,
}

impl Rule {
    /// Score of a candidate: `(weight + bonus) × fit × (1 − mean null rate)`,
    /// clamped to `[0, 1]`. Candidates missing a required role score 0.
    #[must_use]
    pub fn score(&self, summary: &SchemaSummary, candidate: &Candidate) -> f64 {
        if !self.roles.iter().all(|r| candidate.mapping.contains_key(*r)) {
            return 0.0;
        }
        let rates: Vec<f64> = candidate
            .mapping
            .values()
            .filter_map(|c| summary.column(c))
            .map(|c| c.null_rate)
            .collect();
        let mean_null = if rates.is_empty() { 0.0 } else { rates.iter().sum::<f64>() / rates.len() as f64 };
        ((self.weight + candidate.bonus) * candidate.fit * (1.0 - mean_null)).clamp(0.0, 1.0)
    }
}

/// The rule table, in archetype priority order.
pub static RULES: [Rule; 11] = [
    Rule { archetype: Archetype::MapPoints, roles: &["lat", "lon"], weight: 0.95, candidates: map_points },
    Rule { archetype: Archetype::MapClusters, roles: &["lat", "lon"], weight: 0.94, candidates: map_plain },
    Rule { archetype: Archetype::MapDensity, roles: &["lat", "lon"], weight: 0.93, candidates: map_plain },
    Rule { archetype: Archetype::MapHeatmap, roles: &["lat", "lon", "value"], weight: 0.92, candidates: map_valued },
    Rule { archetype: Archetype::Pie, roles: &["x", "y"], weight: 0.83, candidates: pie },
    Rule { archetype: Archetype::Waffle, roles: &["x", "y"], weight: 0.82, candidates: waffle },
    Rule { archetype: Archetype::MatrixHeatmap, roles: &["x", "y"], weight: 0.88, candidates: matrix },
    Rule { archetype: Archetype::Bar, roles: &["x"], weight: 0.9, candidates: bar },
    Rule { archetype: Archetype::Line, roles: &["x"], weight: 0.88, candidates: line },
    Rule { archetype: Archetype::Scatter, roles: &["x", "y"], weight: 0.75, candidates: scatter },
    Rule { archetype: Archetype::Histogram, roles: &["x"], weight: 0.7, candidates: histogram },
];

/// Rule for an archetype.
#[must_use]
pub fn rule(archetype: Archetype) -> &'static Rule {
    &RULES[archetype.priority()]
}

/// True when a name contains a date term (`year`, `month`, ...).
#[must_use]
pub fn is_date_like(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DATE_TERMS.iter().any(|t| lower.contains(t))
}

/// First latitude and longitude columns, by name hint and range.
fn geo_pair(summary: &SchemaSummary) -> Option<(&ColumnProfile, &ColumnProfile)> {
    let lat = summary.select(|c| c.named_latitude() && c.fits_latitude()).next()?;
    let lon = summary
        .select(|c| c.named_longitude() && c.fits_longitude())
        .find(|c| c.name != lat.name)?;
    Some((lat, lon))
}

fn dimensions(summary: &SchemaSummary) -> impl Iterator<Item = &ColumnProfile> {
    summary.select(ColumnProfile::is_dimension)
}

fn measures(summary: &SchemaSummary) -> impl Iterator<Item = &ColumnProfile> {
    summary.select(ColumnProfile::is_measure)
}

fn map_plain(summary: &SchemaSummary, _: &SuggestionConfig) -> Vec<Candidate> {
    geo_pair(summary)
        .map(|(lat, lon)| Candidate::new(&[("lat", lat), ("lon", lon)], 1.0))
        .into_iter()
        .collect()
}

fn map_points(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    let Some((lat, lon)) = geo_pair(summary) else { return Vec::new() };
    let base = Candidate::new(&[("lat", lat), ("lon", lon)], 1.0);
    let colored = dimensions(summary).filter_map(|d| {
        let fit = config.map_color.fit_count(d.distinct_count);
        (fit > 0.0).then(|| Candidate { fit, ..base.clone() }.with("color", d))
    });
    std::iter::once(base.clone()).chain(colored).collect()
}

fn map_valued(summary: &SchemaSummary, _: &SuggestionConfig) -> Vec<Candidate> {
    let Some((lat, lon)) = geo_pair(summary) else { return Vec::new() };
    measures(summary)
        .map(|m| Candidate::new(&[("lat", lat), ("lon", lon), ("value", m)], 1.0))
        .collect()
}

/// Label column × non-negative measure, fit by the label's cardinality.
fn proportions(summary: &SchemaSummary, band: super::Band) -> Vec<Candidate> {
    dimensions(summary)
        .flat_map(|d| {
            measures(summary)
                .filter(|m| m.is_non_negative())
                .map(move |m| Candidate::new(&[("x", d), ("y", m)], band.fit_count(d.distinct_count)))
        })
        .filter(|c| c.fit > 0.0)
        .collect()
}

fn pie(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    proportions(summary, config.pie)
}

fn waffle(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    proportions(summary, config.waffle)
}

fn matrix(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    let dims: Vec<&ColumnProfile> = summary
        .select(|c| c.is_dimension() || (c.field_type == FieldType::Numeric && is_date_like(&c.name)))
        .collect();
    let value = measures(summary).find(|m| !is_date_like(&m.name));

    let mut out = Vec::new();
    for (i, x) in dims.iter().enumerate() {
        for y in &dims[i + 1..] {
            let fit = config.matrix.fit_count(x.distinct_count).min(config.matrix.fit_count(y.distinct_count));
            if fit <= 0.0 {
                continue;
            }
            let bonus = if is_date_like(&x.name) || is_date_like(&y.name) { config.date_bonus } else { 0.0 };
            let counts = Candidate::new(&[("x", x), ("y", y)], fit).bonus(bonus);
            if let Some(v) = value {
                out.push(counts.clone().with("value", v));
            }
            out.push(counts);
        }
    }
    out
}

fn bar(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    dimensions(summary)
        .flat_map(|d| {
            let fit = config.bar.fit_count(d.distinct_count);
            let counts = Candidate::new(&[("x", d)], fit);
            std::iter::once(counts.clone()).chain(measures(summary).map(move |m| counts.clone().with("y", m)))
        })
        .filter(|c| c.fit > 0.0)
        .collect()
}

fn line(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    summary
        .select(|c| c.field_type == FieldType::Temporal)
        .flat_map(|t| {
            let fit = config.continuous.fit_count(t.distinct_count);
            let counts = Candidate::new(&[("x", t)], fit);
            std::iter::once(counts.clone()).chain(measures(summary).map(move |m| counts.clone().with("y", m)))
        })
        .filter(|c| c.fit > 0.0)
        .collect()
}

fn scatter(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    let nums: Vec<&ColumnProfile> = measures(summary).collect();
    let mut out = Vec::new();
    for (i, x) in nums.iter().enumerate() {
        for y in &nums[i + 1..] {
            let fit = config.continuous.fit_count(x.distinct_count).min(config.continuous.fit_count(y.distinct_count));
            if fit > 0.0 {
                out.push(Candidate::new(&[("x", x), ("y", y)], fit));
            }
        }
    }
    out
}

fn histogram(summary: &SchemaSummary, config: &SuggestionConfig) -> Vec<Candidate> {
    measures(summary)
        .map(|m| Candidate::new(&[("x", m)], config.continuous.fit_count(m.distinct_count)))
        .filter(|c| c.fit > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn col(name: &str, field_type: FieldType, distinct: usize, range: Option<(f64, f64)>) -> ColumnProfile {
        ColumnProfile { name: name.to_string(), field_type, null_rate: 0.0, distinct_count: distinct, range }
    }

    fn summary(columns: Vec<ColumnProfile>) -> SchemaSummary {
        SchemaSummary { row_count: 100, columns }
    }

    fn geo() -> Vec<ColumnProfile> {
        vec![
            col("lat", FieldType::Latitude, 90, Some((40.0, 41.0))),
            col("lon", FieldType::Longitude, 90, Some((-4.0, -3.0))),
        ]
    }

    fn candidates(archetype: Archetype, s: &SchemaSummary) -> Vec<Candidate> {
        (rule(archetype).candidates)(s, &SuggestionConfig::default())
    }

    #[test]
    fn test_rule_table_matches_priority() {
        for (i, rule) in RULES.iter().enumerate() {
            assert_eq!(rule.archetype.priority(), i);
            assert!(rule.weight > 0.0 && rule.weight <= 1.0);
        }
    }

    #[test]
    fn test_map_needs_geographic_pair() {
        let s = summary(geo());
        assert_eq!(candidates(Archetype::MapPoints, &s).len(), 1);
        assert_eq!(candidates(Archetype::MapClusters, &s).len(), 1);

        let plain = summary(vec![
            col("width", FieldType::Numeric, 90, Some((0.0, 10.0))),
            col("height", FieldType::Numeric, 90, Some((0.0, 10.0))),
        ]);
        assert!(candidates(Archetype::MapPoints, &plain).is_empty());
    }

    #[test]
    fn test_bare_xy_in_range_is_a_map() {
        let s = summary(vec![
            col("y", FieldType::Numeric, 90, Some((40.0, 41.0))),
            col("x", FieldType::Numeric, 90, Some((-4.0, -3.0))),
        ]);
        let found = candidates(Archetype::MapPoints, &s);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mapping.get("lat").map(String::as_str), Some("y"));
        assert_eq!(found[0].mapping.get("lon").map(String::as_str), Some("x"));
        // still usable as measures
        assert_eq!(candidates(Archetype::Scatter, &s).len(), 1);

        let wide = summary(vec![
            col("y", FieldType::Numeric, 90, Some((0.0, 500.0))),
            col("x", FieldType::Numeric, 90, Some((-4.0, -3.0))),
        ]);
        assert!(candidates(Archetype::MapPoints, &wide).is_empty());
    }

    #[test]
    fn test_map_rejects_out_of_range() {
        let s = summary(vec![
            col("latitude", FieldType::Numeric, 90, Some((100.0, 200.0))),
            col("lon", FieldType::Longitude, 90, Some((-4.0, -3.0))),
        ]);
        assert!(candidates(Archetype::MapDensity, &s).is_empty());
    }

    #[test]
    fn test_map_points_colored_variant() {
        let mut columns = geo();
        columns.push(col("kind", FieldType::Categorical, 4, None));
        columns.push(col("id", FieldType::Categorical, 100, None));
        let found = candidates(Archetype::MapPoints, &summary(columns));
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].mapping.get("color").map(String::as_str), Some("kind"));
    }

    #[test]
    fn test_map_heatmap_needs_measure() {
        assert!(candidates(Archetype::MapHeatmap, &summary(geo())).is_empty());
        let mut columns = geo();
        columns.push(col("price", FieldType::Numeric, 50, Some((1.0, 9.0))));
        let found = candidates(Archetype::MapHeatmap, &summary(columns));
        assert_eq!(found[0].mapping.get("value").map(String::as_str), Some("price"));
    }

    #[test]
    fn test_pie_band_and_sign() {
        let s = summary(vec![
            col("region", FieldType::Categorical, 4, None),
            col("sales", FieldType::Numeric, 50, Some((0.0, 100.0))),
            col("delta", FieldType::Numeric, 50, Some((-5.0, 5.0))),
        ]);
        let found = candidates(Archetype::Pie, &s);
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].fit, 1.0);
        assert_eq!(found[0].mapping.get("y").map(String::as_str), Some("sales"));

        let crowded = summary(vec![
            col("city", FieldType::Categorical, 40, None),
            col("sales", FieldType::Numeric, 50, Some((0.0, 100.0))),
        ]);
        assert!(candidates(Archetype::Pie, &crowded).is_empty());
    }

    #[test]
    fn test_waffle_decay() {
        let s = summary(vec![
            col("region", FieldType::Categorical, 8, None),
            col("sales", FieldType::Numeric, 50, Some((0.0, 100.0))),
        ]);
        // ideal up to 6, zero at 11
        assert_relative_eq!(candidates(Archetype::Waffle, &s)[0].fit, 0.6);
        assert_relative_eq!(candidates(Archetype::Pie, &s)[0].fit, 0.25);
    }

    #[test]
    fn test_matrix_date_bonus() {
        let s = summary(vec![
            col("month", FieldType::Numeric, 12, Some((1.0, 12.0))),
            col("store", FieldType::Categorical, 5, None),
            col("sales", FieldType::Numeric, 50, Some((0.0, 100.0))),
        ]);
        let found = candidates(Archetype::MatrixHeatmap, &s);
        assert_eq!(found.len(), 2);
        assert_relative_eq!(found[0].bonus, 0.03);
        assert_eq!(found[0].mapping.get("value").map(String::as_str), Some("sales"));
        assert!(!found[1].mapping.contains_key("value"));

        let score = rule(Archetype::MatrixHeatmap).score(&s, &found[1]);
        assert_relative_eq!(score, 0.91, epsilon = 1e-12);
    }

    #[test]
    fn test_bar_counts_and_measures() {
        let s = summary(vec![
            col("dept", FieldType::Categorical, 10, None),
            col("cost", FieldType::Numeric, 50, Some((-1.0, 100.0))),
        ]);
        let found = candidates(Archetype::Bar, &s);
        assert_eq!(found.len(), 2);
        assert!(!found[0].mapping.contains_key("y"));
        assert_eq!(found[1].mapping.get("y").map(String::as_str), Some("cost"));
    }

    #[test]
    fn test_line_needs_temporal() {
        let s = summary(vec![col("day", FieldType::Temporal, 30, None)]);
        assert_eq!(candidates(Archetype::Line, &s).len(), 1);
        assert!(candidates(Archetype::Line, &summary(geo())).is_empty());
    }

    #[test]
    fn test_scatter_pairs() {
        let s = summary(vec![
            col("a", FieldType::Numeric, 50, Some((0.0, 1.0))),
            col("b", FieldType::Numeric, 50, Some((0.0, 1.0))),
            col("c", FieldType::Numeric, 50, Some((0.0, 1.0))),
        ]);
        assert_eq!(candidates(Archetype::Scatter, &s).len(), 3);
    }

    #[test]
    fn test_histogram_single_measure() {
        let s = summary(vec![col("age", FieldType::Numeric, 5, Some((18.0, 90.0)))]);
        let found = candidates(Archetype::Histogram, &s);
        assert_eq!(found.len(), 1);
        // 5 distinct values: (5 - 1) / (10 - 1)
        assert_relative_eq!(found[0].fit, 4.0 / 9.0);
    }

    #[test]
    fn test_null_rate_penalty() {
        let mut sales = col("sales", FieldType::Numeric, 50, Some((0.0, 100.0)));
        sales.null_rate = 0.5;
        let s = summary(vec![col("region", FieldType::Categorical, 3, None), sales]);
        let found = candidates(Archetype::Pie, &s);
        // mean null rate (0 + 0.5) / 2
        assert_relative_eq!(rule(Archetype::Pie).score(&s, &found[0]), 0.83 * 0.75);
    }

    #[test]
    fn test_missing_role_scores_zero() {
        let s = summary(geo());
        let partial = Candidate { mapping: BTreeMap::new(), fit: 1.0, bonus: 0.0 };
        assert_relative_eq!(rule(Archetype::MapPoints).score(&s, &partial), 0.0);
    }

    #[test]
    fn test_date_like_names() {
        assert!(is_date_like("order_YEAR"));
        assert!(is_date_like("Weekday"));
        assert!(!is_date_like("region"));
    }
}

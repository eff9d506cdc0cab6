//! Schema summaries: per-field type, null rate, cardinality and range.
//!
//! A [`SchemaSummary`] is what the suggestion engine scores. It can be
//! computed from a [`RowSet`] or supplied directly by a data layer that
//! already knows its column statistics (it is serde-serializable).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::{has_latitude_hint, has_longitude_hint, FieldType, RowSet, Value};

/// Statistics for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Field name.
    pub name: String,
    /// Inferred type.
    pub field_type: FieldType,
    /// Fraction of rows holding null (0.0-1.0).
    #[serde(default)]
    pub null_rate: f64,
    /// Number of distinct non-null values.
    pub distinct_count: usize,
    /// Minimum and maximum for numeric fields.
    #[serde(default)]
    pub range: Option<(f64, f64)>,
}

impl ColumnProfile {
    /// True when every observed numeric value is >= 0.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.range.is_some_and(|(lo, _)| lo >= 0.0)
    }

    /// True when the range fits latitude bounds.
    #[must_use]
    pub fn fits_latitude(&self) -> bool {
        self.field_type.is_numeric()
            && self.range.is_some_and(|(lo, hi)| lo >= -90.0 && hi <= 90.0)
    }

    /// True when the range fits longitude bounds.
    #[must_use]
    pub fn fits_longitude(&self) -> bool {
        self.field_type.is_numeric()
            && self.range.is_some_and(|(lo, hi)| lo >= -180.0 && hi <= 180.0)
    }

    /// True when the name or the inferred type marks the field as latitude.
    ///
    /// A column named exactly `y` counts too; it stays a measure.
    #[must_use]
    pub fn named_latitude(&self) -> bool {
        self.field_type == FieldType::Latitude
            || has_latitude_hint(&self.name)
            || self.name.eq_ignore_ascii_case("y")
    }

    /// True when the name or the inferred type marks the field as longitude.
    ///
    /// A column named exactly `x` counts too; it stays a measure.
    #[must_use]
    pub fn named_longitude(&self) -> bool {
        self.field_type == FieldType::Longitude
            || has_longitude_hint(&self.name)
            || self.name.eq_ignore_ascii_case("x")
    }

    /// True for low-cardinality labels usable as a dimension.
    #[must_use]
    pub fn is_dimension(&self) -> bool {
        self.field_type == FieldType::Categorical
    }

    /// True for numeric, non-geographic fields usable as a measure.
    #[must_use]
    pub fn is_measure(&self) -> bool {
        self.field_type == FieldType::Numeric
    }
}

/// Statistics for a whole row-set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaSummary {
    /// Number of rows.
    pub row_count: usize,
    /// Per-field profiles in header order.
    pub columns: Vec<ColumnProfile>,
}

impl SchemaSummary {
    /// Summarize a row-set.
    #[must_use]
    pub fn from_row_set(rows: &RowSet) -> Self {
        let row_count = rows.len();
        let columns = rows
            .fields()
            .iter()
            .zip(rows.field_types())
            .map(|(name, &field_type)| profile(rows, name, field_type))
            .collect();
        Self { row_count, columns }
    }

    /// Profile of a named field.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Profiles matching a predicate, in header order.
    pub fn select<'a>(
        &'a self,
        pred: impl Fn(&ColumnProfile) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ColumnProfile> + 'a {
        self.columns.iter().filter(move |c| pred(c))
    }
}

impl From<&RowSet> for SchemaSummary {
    fn from(rows: &RowSet) -> Self {
        Self::from_row_set(rows)
    }
}

fn profile(rows: &RowSet, name: &str, field_type: FieldType) -> ColumnProfile {
    let mut nulls = 0usize;
    let mut distinct: HashSet<String> = HashSet::new();
    let mut range: Option<(f64, f64)> = None;

    for value in rows.column(name) {
        match value {
            Value::Null => nulls += 1,
            other => {
                if let Some(v) = other.as_f64() {
                    range = Some(range.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))));
                }
                distinct.insert(other.to_string());
            }
        }
    }

    let total = rows.len().max(1);
    ColumnProfile {
        name: name.to_string(),
        field_type,
        null_rate: nulls as f64 / total as f64,
        distinct_count: distinct.len(),
        range: if field_type.is_numeric() { range } else { None },
    }
}

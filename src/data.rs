//! Row-set model consumed by every renderer.
//!
//! A [`RowSet`] is an ordered sequence of rows sharing one header. Field
//! types are inferred once, when the row-set is built, and never re-inferred
//! on access.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A timestamp.
    Temporal(NaiveDateTime),
    /// A missing value.
    Null,
}

impl Value {
    /// Get as f64, or None if not a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice, or None if not text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Label used when the value acts as a category.
    ///
    /// Returns None for nulls.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Temporal(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Temporal(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Inferred type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Numbers only.
    Numeric,
    /// Labels (text or mixed).
    Categorical,
    /// Timestamps or date-like text.
    Temporal,
    /// Numeric field recognized as latitude.
    Latitude,
    /// Numeric field recognized as longitude.
    Longitude,
}

impl FieldType {
    /// True for numeric fields, geographic ones included.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Numeric | FieldType::Latitude | FieldType::Longitude)
    }

    /// True for latitude/longitude fields.
    #[must_use]
    pub fn is_geographic(self) -> bool {
        matches!(self, FieldType::Latitude | FieldType::Longitude)
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses date-like text in one of the recognized formats.
#[must_use]
pub fn parse_temporal(text: &str) -> Option<NaiveDateTime> {
    // Fractional seconds are ignored.
    let text = text.trim().split('.').next().unwrap_or("");
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

const LAT_HINTS: &[&str] = &["lat", "latitude", "y_coord", "y_pos"];
const LON_HINTS: &[&str] = &["lon", "lng", "long", "longitude", "x_coord", "x_pos"];

/// True when the name suggests a latitude column.
#[must_use]
pub fn has_latitude_hint(name: &str) -> bool {
    let lower = name.to_lowercase();
    LAT_HINTS.iter().any(|h| lower.contains(h))
}

/// True when the name suggests a longitude column.
#[must_use]
pub fn has_longitude_hint(name: &str) -> bool {
    let lower = name.to_lowercase();
    LON_HINTS.iter().any(|h| lower.contains(h))
}

/// A single row, borrowed from its [`RowSet`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    set: &'a RowSet,
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Value of the named field; `Null` for unknown names.
    #[must_use]
    pub fn get(&self, field: &str) -> &'a Value {
        self.set.index_of(field).map_or(&Value::Null, |i| &self.values[i])
    }

    /// Value at a column index.
    #[must_use]
    pub fn at(&self, index: usize) -> &'a Value {
        self.values.get(index).unwrap_or(&Value::Null)
    }

    /// All values in header order.
    #[must_use]
    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// An ordered, read-only sequence of rows with per-field inferred types.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    fields: Vec<String>,
    index: HashMap<String, usize>,
    types: Vec<FieldType>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    /// Build from a header and row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a row's width differs from the header or a
    /// field name repeats.
    pub fn new(fields: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, name) in fields.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(Error::schema(name, name, "duplicate field name"));
            }
        }

        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != fields.len())
        {
            return Err(Error::schema(
                "*",
                "*",
                format!("row {row} has {} values, header has {}", values.len(), fields.len()),
            ));
        }

        let mut set = Self { fields, index, types: Vec::new(), rows };
        set.types = (0..set.fields.len()).map(|i| set.infer_type(i)).collect();
        Ok(set)
    }

    /// Build from records of `(field, value)` pairs.
    ///
    /// The header is the union of field names in first-seen order; fields a
    /// record lacks become `Null`.
    ///
    /// # Errors
    ///
    /// Propagates [`RowSet::new`] errors.
    pub fn from_records<K, V, R>(records: impl IntoIterator<Item = R>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<Value>,
        R: IntoIterator<Item = (K, V)>,
    {
        let mut fields: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut sparse: Vec<Vec<(usize, Value)>> = Vec::new();

        for record in records {
            let mut row = Vec::new();
            for (k, v) in record {
                let name: String = k.into();
                let i = *index.entry(name.clone()).or_insert_with(|| {
                    fields.push(name);
                    fields.len() - 1
                });
                row.push((i, v.into()));
            }
            sparse.push(row);
        }

        let width = fields.len();
        let rows = sparse
            .into_iter()
            .map(|pairs| {
                let mut dense = vec![Value::Null; width];
                for (i, v) in pairs {
                    dense[i] = v;
                }
                dense
            })
            .collect();

        Self::new(fields, rows)
    }

    fn infer_type(&self, column: usize) -> FieldType {
        let mut numbers = 0usize;
        let mut temporal = 0usize;
        let mut text = 0usize;
        let mut date_text = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for row in &self.rows {
            match &row[column] {
                Value::Number(n) => {
                    numbers += 1;
                    min = min.min(*n);
                    max = max.max(*n);
                }
                Value::Temporal(_) => temporal += 1,
                Value::Text(s) => {
                    text += 1;
                    if parse_temporal(s).is_some() {
                        date_text += 1;
                    }
                }
                Value::Null => {}
            }
        }

        let name = &self.fields[column];
        if numbers > 0 && temporal == 0 && text == 0 {
            if has_latitude_hint(name) && min >= -90.0 && max <= 90.0 {
                return FieldType::Latitude;
            }
            if has_longitude_hint(name) && min >= -180.0 && max <= 180.0 {
                return FieldType::Longitude;
            }
            return FieldType::Numeric;
        }

        if numbers == 0 && temporal + text > 0 && date_text == text {
            return FieldType::Temporal;
        }

        FieldType::Categorical
    }

    /// Field names in header order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Column index of a field.
    #[must_use]
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    /// Inferred type of a field.
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.index_of(field).map(|i| self.types[i])
    }

    /// Inferred types in header order.
    #[must_use]
    pub fn field_types(&self) -> &[FieldType] {
        &self.types
    }

    /// Check if a field exists.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at an index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row { set: self, values })
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |values| Row { set: self, values })
    }

    /// Values of one column in row order.
    pub fn column(&self, field: &str) -> impl Iterator<Item = &Value> + '_ {
        let idx = self.index_of(field);
        self.rows.iter().map(move |r| idx.map_or(&Value::Null, |i| &r[i]))
    }

    /// Non-null numeric values of one column.
    #[must_use]
    pub fn numbers(&self, field: &str) -> Vec<f64> {
        self.column(field).filter_map(Value::as_f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowSet {
        RowSet::from_records(vec![
            vec![("x", Value::from("A")), ("y", Value::from(10.0))],
            vec![("x", Value::from("B")), ("y", Value::from(20.0))],
            vec![("x", Value::from("A")), ("y", Value::from(5.0))],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_records_preserves_order() {
        let rs = sample();
        assert_eq!(rs.fields(), &["x".to_string(), "y".to_string()]);
        assert_eq!(rs.len(), 3);
        assert_eq!(rs.row(1).unwrap().get("x"), &Value::from("B"));
    }

    #[test]
    fn test_missing_fields_become_null() {
        let rs = RowSet::from_records(vec![
            vec![("a", Value::from(1.0))],
            vec![("b", Value::from(2.0))],
        ])
        .unwrap();
        assert_eq!(rs.row(0).unwrap().get("b"), &Value::Null);
        assert_eq!(rs.row(1).unwrap().get("a"), &Value::Null);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = RowSet::new(
            vec!["a".into(), "b".into()],
            vec![vec![Value::from(1.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        assert!(RowSet::new(vec!["a".into(), "a".into()], vec![]).is_err());
    }

    #[test]
    fn test_type_inference() {
        let rs = sample();
        assert_eq!(rs.field_type("x"), Some(FieldType::Categorical));
        assert_eq!(rs.field_type("y"), Some(FieldType::Numeric));
    }

    #[test]
    fn test_geographic_inference() {
        let rs = RowSet::from_records(vec![
            vec![("latitude", Value::from(37.7)), ("lng", Value::from(-122.4))],
            vec![("latitude", Value::from(40.7)), ("lng", Value::from(-74.0))],
        ])
        .unwrap();
        assert_eq!(rs.field_type("latitude"), Some(FieldType::Latitude));
        assert_eq!(rs.field_type("lng"), Some(FieldType::Longitude));
    }

    #[test]
    fn test_latitude_hint_requires_range() {
        let rs = RowSet::from_records(vec![vec![("lat", Value::from(120.0))]]).unwrap();
        assert_eq!(rs.field_type("lat"), Some(FieldType::Numeric));
    }

    #[test]
    fn test_temporal_text_inference() {
        let rs = RowSet::from_records(vec![
            vec![("day", Value::from("2024-01-02"))],
            vec![("day", Value::from("2024-01-03"))],
            vec![("day", Value::Null)],
        ])
        .unwrap();
        assert_eq!(rs.field_type("day"), Some(FieldType::Temporal));
    }

    #[test]
    fn test_parse_temporal_formats() {
        assert!(parse_temporal("2024-03-01").is_some());
        assert!(parse_temporal("2024/03/01").is_some());
        assert!(parse_temporal("2024-03-01 12:30:00.123").is_some());
        assert!(parse_temporal("not a date").is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(3.0).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.label(), None);
        assert_eq!(Value::from("a").label(), Some("a".to_string()));
    }

    #[test]
    fn test_numbers_skip_nulls() {
        let rs = RowSet::from_records(vec![
            vec![("v", Value::from(1.0))],
            vec![("v", Value::Null)],
            vec![("v", Value::from(3.0))],
        ])
        .unwrap();
        assert_eq!(rs.numbers("v"), vec![1.0, 3.0]);
    }
}

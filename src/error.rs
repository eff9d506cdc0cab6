//! Error types for cheshire-viz operations.

use std::io;
use thiserror::Error;

use crate::options::ChartKind;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building row-sets, rendering frames or loading configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// A required role column is missing, or has the wrong type.
    #[error("schema error for role '{role}' (column '{column}'): {reason}")]
    Schema {
        /// Role the renderer needed (e.g. "y", "lat").
        role: String,
        /// Column the role resolved to.
        column: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No usable rows remained after null filtering.
    #[error("empty data: {rows} rows supplied, {skipped} skipped, nothing to render")]
    EmptyData {
        /// Rows in the row-set.
        rows: usize,
        /// Rows skipped because a required field was null.
        skipped: usize,
    },

    /// Viewport dimensions below 1.
    #[error("invalid viewport: {width}x{height}")]
    InvalidViewport {
        /// Requested width in cells.
        width: i64,
        /// Requested height in cells.
        height: i64,
    },

    /// A value violates the domain of the chart (e.g. negative pie slice).
    #[error("invalid value {value} in field '{field}' at row {row}: {reason}")]
    InvalidValue {
        /// Field holding the value.
        field: String,
        /// Zero-based row index (or row count for aggregate violations).
        row: usize,
        /// The offending value.
        value: f64,
        /// Why it is invalid.
        reason: String,
    },

    /// Chart kind rendered by an external backend.
    #[error("chart kind '{kind}' is rendered by an external backend")]
    Unsupported {
        /// The requested kind.
        kind: ChartKind,
    },

    /// Color parsing error.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Schema`] error.
    pub(crate) fn schema(role: &str, column: &str, reason: impl Into<String>) -> Self {
        Self::Schema { role: role.to_string(), column: column.to_string(), reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_role() {
        let err = Error::schema("y", "amount", "column not found");
        let msg = err.to_string();
        assert!(msg.contains("'y'"));
        assert!(msg.contains("amount"));
    }

    #[test]
    fn test_empty_data_reports_counts() {
        let err = Error::EmptyData { rows: 10, skipped: 10 };
        assert!(err.to_string().contains("10 rows"));
        assert!(err.to_string().contains("10 skipped"));
    }

    #[test]
    fn test_invalid_viewport_display() {
        let err = Error::InvalidViewport { width: 0, height: 24 };
        assert!(err.to_string().contains("0x24"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = Error::InvalidValue {
            field: "y".to_string(),
            row: 3,
            value: -2.0,
            reason: "negative".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("-2"));
        assert!(msg.contains("row 3"));
    }

    #[test]
    fn test_unsupported_names_kind() {
        let err = Error::Unsupported { kind: ChartKind::Bar };
        assert!(err.to_string().contains("bar"));
    }
}

//! Source value types for database-agnostic row handling.
//!
//! Rows read from the source are represented as column-name → [`SqlValue`]
//! mappings. The value enum carries exactly the scalar, temporal, and array
//! types the fixed entity set produces.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};

/// A single value read from a source column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 16-bit signed integer (smallint).
    I16(i16),

    /// 32-bit signed integer (int).
    I32(i32),

    /// 64-bit signed integer (bigint).
    I64(i64),

    /// 32-bit floating point (real/float4).
    F32(f32),

    /// 64-bit floating point (double precision/float8).
    F64(f64),

    /// Decimal value with arbitrary precision (numeric).
    Decimal(Decimal),

    /// Text/string data.
    Text(String),

    /// Text array (e.g. a film's special features).
    TextArray(Vec<String>),

    /// Date without time component.
    Date(NaiveDate),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Interpret this value as a record key (integer primary/foreign key).
    ///
    /// Returns `None` for NULL and for non-integer values.
    #[must_use]
    pub fn as_key(&self) -> Option<i64> {
        match self {
            SqlValue::I16(v) => Some(i64::from(*v)),
            SqlValue::I32(v) => Some(i64::from(*v)),
            SqlValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a JSON document field value.
    ///
    /// Decimals become floats, matching the destination's numeric coercion.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(v) => json!(v),
            SqlValue::I16(v) => json!(v),
            SqlValue::I32(v) => json!(v),
            SqlValue::I64(v) => json!(v),
            SqlValue::F32(v) => json!(v),
            SqlValue::F64(v) => json!(v),
            SqlValue::Decimal(d) => d.to_f64().map_or(Value::Null, |f| json!(f)),
            SqlValue::Text(s) => json!(s),
            SqlValue::TextArray(v) => json!(v),
            SqlValue::Date(d) => json!(d.to_string()),
            SqlValue::DateTime(v) => json!(v.to_string()),
        }
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

/// One source row as a column-name → value mapping.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: HashMap<String, SqlValue>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.insert(column.into(), value);
    }

    /// Get a column value, if the column is present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.get(column)
    }

    /// Number of columns in this row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, SqlValue)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_key_integers() {
        assert_eq!(SqlValue::I16(7).as_key(), Some(7));
        assert_eq!(SqlValue::I32(42).as_key(), Some(42));
        assert_eq!(SqlValue::I64(9).as_key(), Some(9));
        assert_eq!(SqlValue::Null.as_key(), None);
        assert_eq!(SqlValue::Text("42".into()).as_key(), None);
    }

    #[test]
    fn test_decimal_to_json_is_float() {
        let v = SqlValue::Decimal(Decimal::new(499, 2));
        assert_eq!(v.to_json(), json!(4.99));
    }

    #[test]
    fn test_text_array_to_json() {
        let v = SqlValue::TextArray(vec!["Trailers".into(), "Commentaries".into()]);
        assert_eq!(v.to_json(), json!(["Trailers", "Commentaries"]));
    }

    #[test]
    fn test_row_round_trip() {
        let row: Row = vec![
            ("country_id", SqlValue::I32(1)),
            ("country", SqlValue::from("Canada")),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("country_id"), Some(&SqlValue::I32(1)));
        assert!(row.get("missing").is_none());
    }
}

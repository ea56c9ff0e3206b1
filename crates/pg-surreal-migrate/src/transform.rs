//! Row-to-document mapping: temporal normalization, reference rewriting,
//! and document assembly.

use chrono::NaiveTime;
use serde_json::{Map, Value};

use crate::error::{MigrateError, Result};
use crate::schema::{FieldKind, TableSpec};
use crate::value::{Row, SqlValue};

/// Canonical datetime rendering accepted by the destination's datetime
/// coercion. Source timestamps carry no zone; they are rendered as UTC.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Normalize a possibly-absent temporal value to its canonical string form.
///
/// NULL input yields `None`: never an error, never a default date.
pub fn normalize_temporal(table: &str, column: &str, value: &SqlValue) -> Result<Option<String>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::DateTime(v) => Ok(Some(v.format(DATETIME_FORMAT).to_string())),
        SqlValue::Date(d) => Ok(Some(
            d.and_time(NaiveTime::MIN).format(DATETIME_FORMAT).to_string(),
        )),
        other => Err(MigrateError::row_mapping(
            table,
            format!("column `{}` is not a temporal value: {:?}", column, other),
        )),
    }
}

/// Rewrite a possibly-absent foreign key into a `<collection>:<key>`
/// reference string.
///
/// NULL input yields `None`, leaving the field absent rather than dangling.
/// Existence of the referenced document is guaranteed by step ordering, not
/// checked here.
pub fn resolve_reference(
    table: &str,
    column: &str,
    target: &str,
    value: &SqlValue,
) -> Result<Option<String>> {
    match value.as_key() {
        Some(key) => Ok(Some(format!("{}:{}", target, key))),
        None if value.is_null() => Ok(None),
        None => Err(MigrateError::row_mapping(
            table,
            format!(
                "column `{}` is not an integer key for `{}`: {:?}",
                column, target, value
            ),
        )),
    }
}

/// Extract the record key from a row's primary key column.
pub fn primary_key(spec: &TableSpec, row: &Row) -> Result<i64> {
    let value = row.get(spec.primary_key).ok_or_else(|| {
        MigrateError::row_mapping(
            spec.collection,
            format!("missing primary key column `{}`", spec.primary_key),
        )
    })?;
    value.as_key().ok_or_else(|| {
        MigrateError::row_mapping(
            spec.collection,
            format!(
                "primary key column `{}` is not an integer: {:?}",
                spec.primary_key, value
            ),
        )
    })
}

/// Build the destination document for one source row.
///
/// Scalars are copied verbatim (SQL NULL becomes JSON null); reference and
/// temporal fields go through their resolvers and stay absent when NULL.
pub fn build_document(spec: &TableSpec, row: &Row) -> Result<(i64, Map<String, Value>)> {
    let key = primary_key(spec, row)?;

    let mut document = Map::with_capacity(spec.fields.len());
    for mapping in spec.fields {
        let value = row.get(mapping.column).ok_or_else(|| {
            MigrateError::row_mapping(
                spec.collection,
                format!("missing column `{}`", mapping.column),
            )
        })?;

        match mapping.kind {
            FieldKind::Scalar => {
                document.insert(mapping.field.to_string(), value.to_json());
            }
            FieldKind::Reference { target } => {
                if let Some(reference) =
                    resolve_reference(spec.collection, mapping.column, target, value)?
                {
                    document.insert(mapping.field.to_string(), Value::String(reference));
                }
            }
            FieldKind::Temporal => {
                if let Some(rendered) =
                    normalize_temporal(spec.collection, mapping.column, value)?
                {
                    document.insert(mapping.field.to_string(), Value::String(rendered));
                }
            }
        }
    }

    Ok((key, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldMap, TABLES};
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_datetime() -> SqlValue {
        SqlValue::DateTime(
            NaiveDate::from_ymd_opt(2006, 2, 15)
                .unwrap()
                .and_hms_opt(9, 34, 33)
                .unwrap(),
        )
    }

    #[test]
    fn test_normalize_null_temporal_is_absent() {
        assert_eq!(
            normalize_temporal("rental", "return_date", &SqlValue::Null).unwrap(),
            None
        );
    }

    #[test]
    fn test_normalize_datetime_format() {
        let rendered = normalize_temporal("country", "last_update", &sample_datetime())
            .unwrap()
            .unwrap();
        assert_eq!(rendered, "2006-02-15T09:34:33.000000Z");
    }

    #[test]
    fn test_normalize_date_renders_midnight() {
        let date = SqlValue::Date(NaiveDate::from_ymd_opt(2006, 2, 14).unwrap());
        let rendered = normalize_temporal("customer", "create_date", &date)
            .unwrap()
            .unwrap();
        assert_eq!(rendered, "2006-02-14T00:00:00.000000Z");
    }

    #[test]
    fn test_normalize_rejects_non_temporal() {
        let err = normalize_temporal("rental", "rental_date", &SqlValue::Text("soon".into()));
        assert!(err.is_err());
    }

    #[test]
    fn test_resolve_reference_formats_target() {
        let resolved = resolve_reference("city", "country_id", "country", &SqlValue::I32(1))
            .unwrap()
            .unwrap();
        assert_eq!(resolved, "country:1");
    }

    #[test]
    fn test_resolve_null_reference_is_absent() {
        assert_eq!(
            resolve_reference("city", "country_id", "country", &SqlValue::Null).unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_rejects_non_integer_key() {
        let err = resolve_reference("city", "country_id", "country", &SqlValue::Text("ca".into()));
        assert!(err.is_err());
    }

    fn city_spec() -> &'static TableSpec {
        TABLES.iter().find(|t| t.collection == "city").unwrap()
    }

    #[test]
    fn test_build_document_rewrites_references() {
        let row: Row = vec![
            ("city_id", SqlValue::I32(1)),
            ("city", SqlValue::from("Toronto")),
            ("country_id", SqlValue::I32(1)),
            ("last_update", sample_datetime()),
        ]
        .into_iter()
        .collect();

        let (key, document) = build_document(city_spec(), &row).unwrap();
        assert_eq!(key, 1);
        assert_eq!(document["city_id"], json!(1));
        assert_eq!(document["city"], json!("Toronto"));
        assert_eq!(document["country_id"], json!("country:1"));
        assert_eq!(document["last_update"], json!("2006-02-15T09:34:33.000000Z"));
    }

    #[test]
    fn test_build_document_missing_column_fails() {
        let row: Row = vec![("city_id", SqlValue::I32(1))].into_iter().collect();
        let err = build_document(city_spec(), &row).unwrap_err();
        assert!(matches!(err, MigrateError::RowMapping { .. }));
    }

    #[test]
    fn test_build_document_null_scalar_stays_null() {
        let spec = TABLES.iter().find(|t| t.collection == "address").unwrap();
        let row: Row = vec![
            ("address_id", SqlValue::I32(3)),
            ("address", SqlValue::from("23 Workhaven Lane")),
            ("address2", SqlValue::Null),
            ("district", SqlValue::from("Alberta")),
            ("city_id", SqlValue::I32(1)),
            ("postal_code", SqlValue::Null),
            ("phone", SqlValue::from("14033335568")),
            ("last_update", sample_datetime()),
        ]
        .into_iter()
        .collect();

        let (_, document) = build_document(spec, &row).unwrap();
        assert_eq!(document["address2"], Value::Null);
        assert_eq!(document["city_id"], json!("city:1"));
    }

    #[test]
    fn test_build_document_renames_field() {
        // film maps the language_id column onto a `language` field
        let spec = TABLES.iter().find(|t| t.collection == "film").unwrap();
        let mapping: &FieldMap = spec
            .fields
            .iter()
            .find(|f| f.column == "language_id")
            .unwrap();
        assert_eq!(mapping.field, "language");
    }
}

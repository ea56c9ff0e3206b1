//! Parameterized graph statement construction.
//!
//! Record keys always travel as bound parameters. The only identifiers
//! spliced into statement text are collection names, field names, and edge
//! labels from the static catalog, never values read from source rows.

use serde_json::{json, Value};

/// A graph statement the engine can ask the destination to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Reset a list-valued field on every document of a collection.
    ResetList {
        collection: &'static str,
        field: &'static str,
    },

    /// Append a typed reference to a list-valued field on one document.
    AppendReference {
        collection: &'static str,
        key: i64,
        field: &'static str,
        target: &'static str,
        target_key: i64,
    },

    /// Create a directed, labeled edge between two documents.
    Relate {
        label: &'static str,
        from: &'static str,
        from_key: i64,
        to: &'static str,
        to_key: i64,
    },
}

impl Statement {
    /// Render to statement text plus named bindings.
    pub fn render(&self) -> (String, Vec<(&'static str, Value)>) {
        match self {
            Statement::ResetList { collection, field } => (
                format!("UPDATE type::table($tb) SET {} = []", field),
                vec![("tb", json!(collection))],
            ),
            Statement::AppendReference {
                collection,
                key,
                field,
                target,
                target_key,
            } => (
                format!(
                    "UPDATE type::thing($tb, $id) SET {} += type::thing($target_tb, $target_id)",
                    field
                ),
                vec![
                    ("tb", json!(collection)),
                    ("id", json!(key)),
                    ("target_tb", json!(target)),
                    ("target_id", json!(target_key)),
                ],
            ),
            Statement::Relate {
                label,
                from,
                from_key,
                to,
                to_key,
            } => (
                format!(
                    "RELATE type::thing($from_tb, $from_id)->{}->type::thing($to_tb, $to_id)",
                    label
                ),
                vec![
                    ("from_tb", json!(from)),
                    ("from_id", json!(from_key)),
                    ("to_tb", json!(to)),
                    ("to_id", json!(to_key)),
                ],
            ),
        }
    }
}

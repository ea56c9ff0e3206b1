//! Relation materialization: junction rows into graph edges or embedded
//! reference lists.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::import::{SkippedRow, StepReport};
use crate::schema::{RelationKind, RelationSpec};
use crate::source::SourceReader;
use crate::store::{DestinationStore, Statement};
use crate::value::Row;

/// Materializes declared relations between already-imported documents.
///
/// Each relation is reset before it is recreated: edge tables are deleted
/// and list fields emptied. Without the reset, re-running a migration
/// would accumulate duplicate edges and list entries, because the store
/// enforces no uniqueness on either.
pub struct RelationMaterializer {
    source: Arc<dyn SourceReader>,
    store: Arc<dyn DestinationStore>,
}

impl RelationMaterializer {
    pub fn new(source: Arc<dyn SourceReader>, store: Arc<dyn DestinationStore>) -> Self {
        Self { source, store }
    }

    /// Materialize one relation end to end.
    pub async fn materialize(&self, spec: &'static RelationSpec) -> Result<StepReport> {
        let mut report = StepReport::new(spec.name);

        match &spec.kind {
            RelationKind::EmbeddedList { owner, target, field } => {
                let field = *field;
                self.store
                    .execute(Statement::ResetList {
                        collection: owner.collection,
                        field,
                    })
                    .await?;

                let rows = self.source.query(spec.query).await?;
                debug!("{}: fetched {} rows", spec.name, rows.len());

                for row in &rows {
                    let owner_key = match endpoint_key(row, owner.column) {
                        Ok(key) => key,
                        Err(reason) => {
                            report.skipped.push(skip(spec.name, row, owner.column, reason));
                            continue;
                        }
                    };
                    let target_key = match endpoint_key(row, target.column) {
                        Ok(key) => key,
                        Err(reason) => {
                            report.skipped.push(skip(spec.name, row, target.column, reason));
                            continue;
                        }
                    };

                    self.store
                        .execute(Statement::AppendReference {
                            collection: owner.collection,
                            key: owner_key,
                            field,
                            target: target.collection,
                            target_key,
                        })
                        .await?;
                    report.appended += 1;
                }
            }

            RelationKind::Edges(edges) => {
                for edge in *edges {
                    self.store.delete(edge.label).await?;
                }

                let rows = self.source.query(spec.query).await?;
                debug!("{}: fetched {} rows", spec.name, rows.len());

                'rows: for row in &rows {
                    // Resolve every endpoint before creating anything, so a
                    // bad row produces no half-materialized edge pair.
                    let mut resolved = Vec::with_capacity(edges.len());
                    for edge in *edges {
                        let from_key = match endpoint_key(row, edge.from.column) {
                            Ok(key) => key,
                            Err(reason) => {
                                report.skipped.push(skip(spec.name, row, edge.from.column, reason));
                                continue 'rows;
                            }
                        };
                        let to_key = match endpoint_key(row, edge.to.column) {
                            Ok(key) => key,
                            Err(reason) => {
                                report.skipped.push(skip(spec.name, row, edge.to.column, reason));
                                continue 'rows;
                            }
                        };
                        resolved.push((edge, from_key, to_key));
                    }

                    for (edge, from_key, to_key) in resolved {
                        self.store
                            .execute(Statement::Relate {
                                label: edge.label,
                                from: edge.from.collection,
                                from_key,
                                to: edge.to.collection,
                                to_key,
                            })
                            .await?;
                        report.edges += 1;
                    }
                }
            }
        }

        if report.skipped.is_empty() {
            info!(
                "{}: created {} edges, appended {} references",
                spec.name, report.edges, report.appended
            );
        } else {
            warn!(
                "{}: created {} edges, appended {} references, skipped {} rows",
                spec.name,
                report.edges,
                report.appended,
                report.skipped.len()
            );
        }

        Ok(report)
    }
}

/// Read an endpoint key from a junction row.
fn endpoint_key(row: &Row, column: &str) -> std::result::Result<i64, String> {
    match row.get(column) {
        None => Err(format!("missing column `{}`", column)),
        Some(value) => match value.as_key() {
            Some(key) => Ok(key),
            None if value.is_null() => Err(format!("null endpoint key in `{}`", column)),
            None => Err(format!("non-integer endpoint key in `{}`: {:?}", column, value)),
        },
    }
}

fn skip(relation: &str, row: &Row, column: &str, reason: String) -> SkippedRow {
    SkippedRow {
        table: relation.to_string(),
        key: row.get(column).and_then(|v| v.as_key()),
        reason,
    }
}

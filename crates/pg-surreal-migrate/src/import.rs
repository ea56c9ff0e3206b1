//! Entity import: one source table into one destination collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{MigrateError, Result};
use crate::schema::TableSpec;
use crate::source::SourceReader;
use crate::store::DestinationStore;
use crate::transform::{build_document, primary_key};

/// A source row excluded from the destination by a row-level mapping
/// failure. Aggregated here and surfaced in the final report instead of
/// aborting the step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Source table or relation the row came from.
    pub table: String,
    /// Primary key of the row, when it could be read.
    pub key: Option<i64>,
    /// Why the row was skipped.
    pub reason: String,
}

/// Outcome of one migration step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name.
    pub step: String,
    /// Documents written.
    pub documents: u64,
    /// Graph edges created.
    pub edges: u64,
    /// Reference-list entries appended.
    pub appended: u64,
    /// Rows excluded by mapping failures.
    pub skipped: Vec<SkippedRow>,
}

impl StepReport {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ..Self::default()
        }
    }
}

/// Imports entity tables as keyed documents.
pub struct EntityImporter {
    source: Arc<dyn SourceReader>,
    store: Arc<dyn DestinationStore>,
    workers: usize,
}

impl EntityImporter {
    pub fn new(
        source: Arc<dyn SourceReader>,
        store: Arc<dyn DestinationStore>,
        workers: usize,
    ) -> Self {
        Self {
            source,
            store,
            workers: workers.max(1),
        }
    }

    /// Import one table: clear the collection, map every row, write each
    /// document under its stable key.
    ///
    /// Readers of the collection see a partial state while the step runs;
    /// the reset is what makes a re-run overwrite instead of accumulate.
    pub async fn import_entity(&self, spec: &'static TableSpec) -> Result<StepReport> {
        let mut report = StepReport::new(spec.collection);

        self.store.delete(spec.collection).await?;

        let rows = self.source.query(spec.query).await?;
        debug!("{}: fetched {} rows", spec.collection, rows.len());

        let mut pending = Vec::with_capacity(rows.len());
        for row in &rows {
            match build_document(spec, row) {
                Ok((key, document)) => pending.push((key, document)),
                Err(MigrateError::RowMapping { message, .. }) => {
                    report.skipped.push(SkippedRow {
                        table: spec.collection.to_string(),
                        key: primary_key(spec, row).ok(),
                        reason: message,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        // Writes target distinct keys, so they are safe to run in parallel.
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(pending.len());
        for (key, document) in pending {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let store = self.store.clone();
            let collection = spec.collection;

            let handle = tokio::spawn(async move {
                let result = store.create(collection, key, document).await;
                drop(permit);
                result
            });
            handles.push(handle);
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| MigrateError::step(spec.collection, format!("write task panicked: {}", e)))??;
            report.documents += 1;
        }

        if report.skipped.is_empty() {
            info!("{}: imported {} documents", spec.collection, report.documents);
        } else {
            warn!(
                "{}: imported {} documents, skipped {} rows",
                spec.collection,
                report.documents,
                report.skipped.len()
            );
        }

        Ok(report)
    }
}

//! Migration orchestrator - main workflow coordinator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::import::{EntityImporter, SkippedRow};
use crate::plan::plan;
use crate::relate::RelationMaterializer;
use crate::schema::{catalog, Step, TABLES};
use crate::source::{PgSource, SourceReader};
use crate::store::{DestinationStore, SurrealStore};

/// Migration orchestrator.
pub struct Orchestrator {
    source: Arc<dyn SourceReader>,
    store: Arc<dyn DestinationStore>,
    workers: usize,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed" or "cancelled".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Planned step names in execution order.
    pub plan: Vec<String>,

    /// Steps in the plan.
    pub steps_total: usize,

    /// Steps that ran to completion.
    pub steps_completed: usize,

    /// Total documents written.
    pub documents_written: u64,

    /// Total graph edges created.
    pub edges_created: u64,

    /// Total reference-list entries appended.
    pub references_appended: u64,

    /// Rows excluded by mapping failures.
    pub rows_skipped: usize,

    /// Details for every skipped row.
    pub skipped: Vec<SkippedRow>,
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a connectivity health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    pub source_error: Option<String>,
    pub destination_connected: bool,
    pub destination_latency_ms: u64,
    pub destination_error: Option<String>,
    pub healthy: bool,
}

impl Orchestrator {
    /// Create a new orchestrator, connecting both backends.
    pub async fn new(config: &Config) -> Result<Self> {
        let workers = config.migration.get_workers();
        let source = PgSource::new(&config.source, workers).await?;
        let store = SurrealStore::new(&config.destination).await?;
        Ok(Self::with_backends(
            Arc::new(source),
            Arc::new(store),
            workers,
        ))
    }

    /// Create an orchestrator over already-constructed backends.
    pub fn with_backends(
        source: Arc<dyn SourceReader>,
        store: Arc<dyn DestinationStore>,
        workers: usize,
    ) -> Self {
        Self {
            source,
            store,
            workers,
        }
    }

    /// Run the migration end to end.
    ///
    /// Steps execute strictly in planner order; cancellation is observed
    /// between steps only. A cancelled or failed run leaves the destination
    /// consistent with every step that completed; re-running is the
    /// recovery path.
    pub async fn run(
        &self,
        cancel: Option<CancellationToken>,
        dry_run: bool,
    ) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let cancel = cancel.unwrap_or_default();

        let steps = plan(&catalog())?;
        let plan_names: Vec<String> = steps.iter().map(|s| s.name().to_string()).collect();

        info!("Starting migration run: {} ({} steps)", run_id, steps.len());

        if dry_run {
            for name in &plan_names {
                info!("  would run: {}", name);
            }
            return Ok(Self::build_result(
                run_id, "completed", started_at, plan_names, 0, &[],
            ));
        }

        let importer = EntityImporter::new(self.source.clone(), self.store.clone(), self.workers);
        let materializer = RelationMaterializer::new(self.source.clone(), self.store.clone());

        let mut reports = Vec::with_capacity(steps.len());
        let mut cancelled = false;

        for step in &steps {
            if cancel.is_cancelled() {
                warn!("Cancellation requested, stopping before step {}", step.name());
                cancelled = true;
                break;
            }

            let report = match *step {
                Step::Import(table) => importer.import_entity(table).await,
                Step::Relate(relation) => materializer.materialize(relation).await,
            }
            .map_err(|e| {
                error!("{}: step failed - {}", step.name(), e);
                e
            })?;

            reports.push(report);
        }

        let status = if cancelled { "cancelled" } else { "completed" };
        let result = Self::build_result(
            run_id,
            status,
            started_at,
            plan_names,
            reports.len(),
            &reports,
        );

        if result.rows_skipped > 0 {
            warn!("{} rows were skipped; see the skipped-row summary", result.rows_skipped);
        }
        info!(
            "Migration {}: {}/{} steps, {} documents, {} edges, {} list entries in {:.1}s",
            result.status,
            result.steps_completed,
            result.steps_total,
            result.documents_written,
            result.edges_created,
            result.references_appended,
            result.duration_seconds
        );

        Ok(result)
    }

    fn build_result(
        run_id: String,
        status: &str,
        started_at: DateTime<Utc>,
        plan_names: Vec<String>,
        steps_completed: usize,
        reports: &[crate::import::StepReport],
    ) -> MigrationResult {
        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let skipped: Vec<SkippedRow> = reports
            .iter()
            .flat_map(|r| r.skipped.iter().cloned())
            .collect();

        MigrationResult {
            run_id,
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            steps_total: plan_names.len(),
            plan: plan_names,
            steps_completed,
            documents_written: reports.iter().map(|r| r.documents).sum(),
            edges_created: reports.iter().map(|r| r.edges).sum(),
            references_appended: reports.iter().map(|r| r.appended).sum(),
            rows_skipped: skipped.len(),
            skipped,
        }
    }

    /// Compare per-table source row counts against destination collection
    /// counts. Returns (source, destination, match) keyed by collection.
    pub async fn validate(&self) -> Result<HashMap<String, (i64, i64, bool)>> {
        let mut results = HashMap::new();

        for spec in TABLES {
            let query = format!("select count(*) as count from {}", spec.source_table);
            let rows = self.source.query(&query).await?;
            let source_count = rows
                .first()
                .and_then(|row| row.get("count"))
                .and_then(|value| value.as_key())
                .unwrap_or(0);

            let destination_count = self.store.count(spec.collection).await?;
            let matches = source_count == destination_count;

            if matches {
                info!("{}: {} rows (match)", spec.collection, source_count);
            } else {
                warn!(
                    "{}: source={} destination={} (MISMATCH)",
                    spec.collection, source_count, destination_count
                );
            }

            results.insert(
                spec.collection.to_string(),
                (source_count, destination_count, matches),
            );
        }

        Ok(results)
    }

    /// Probe both backends and report connectivity and latency.
    pub async fn health_check(&self) -> Result<HealthCheckResult> {
        let start = Instant::now();
        let source_result = self.source.ping().await;
        let source_latency_ms = start.elapsed().as_millis() as u64;

        let start = Instant::now();
        let destination_result = self.store.ping().await;
        let destination_latency_ms = start.elapsed().as_millis() as u64;

        let result = HealthCheckResult {
            source_connected: source_result.is_ok(),
            source_latency_ms,
            source_error: source_result.err().map(|e| e.to_string()),
            destination_connected: destination_result.is_ok(),
            destination_latency_ms,
            destination_error: destination_result.err().map(|e| e.to_string()),
            healthy: false,
        };

        Ok(HealthCheckResult {
            healthy: result.source_connected && result.destination_connected,
            ..result
        })
    }
}

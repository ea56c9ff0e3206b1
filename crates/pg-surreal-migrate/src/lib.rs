//! # pg-surreal-migrate
//!
//! Migrates the classic dvdrental PostgreSQL database into a
//! document-plus-graph data model in SurrealDB:
//!
//! - **Rows become keyed documents** under stable `<collection>:<pk>` keys
//! - **Foreign keys become typed record references** (`country:1`)
//! - **Junction tables become labeled graph edges** or embedded reference
//!   lists, including synthetic bidirectional pairs
//! - **Re-runs are idempotent**: collections, edge tables, and reference
//!   lists are reset before being rewritten
//!
//! Import order is not hand-maintained: a declarative catalog describes
//! every table and relation, and a topological planner derives a
//! deterministic step order from the declared dependencies.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_surreal_migrate::{Config, Orchestrator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::new(&config).await?;
//!     let result = orchestrator.run(None, false).await?;
//!     println!("Wrote {} documents", result.documents_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod orchestrator;
pub mod plan;
pub mod relate;
pub mod schema;
pub mod source;
pub mod store;
pub mod transform;
pub mod value;

// Re-exports for convenient access
pub use config::{Config, DestinationConfig, MigrationConfig, SourceConfig};
pub use error::{MigrateError, Result};
pub use import::{EntityImporter, SkippedRow, StepReport};
pub use orchestrator::{HealthCheckResult, MigrationResult, Orchestrator};
pub use plan::plan;
pub use relate::RelationMaterializer;
pub use schema::{catalog, RelationSpec, Step, TableSpec, RELATIONS, TABLES};
pub use source::{PgSource, SourceReader};
pub use store::{DestinationStore, Document, Statement, SurrealStore};
pub use value::{Row, SqlValue};

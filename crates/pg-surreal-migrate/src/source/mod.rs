//! Source database access.

mod postgres;

pub use postgres::PgSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::value::Row;

/// Read rows from a source database.
///
/// The engine consumes exactly one capability: execute a query and get the
/// rows back as column-name → value mappings (NULL representable).
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Execute a query and return all result rows.
    async fn query(&self, statement: &str) -> Result<Vec<Row>>;

    /// Check that the source is reachable.
    async fn ping(&self) -> Result<()>;
}

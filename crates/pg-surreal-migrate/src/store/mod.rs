//! Destination store access.

mod statements;
mod surreal;

pub use statements::Statement;
pub use surreal::SurrealStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// A destination document: the field map written under a record key.
pub type Document = Map<String, Value>;

/// Write documents and graph statements to the destination store.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Delete every record in a collection (documents or edges).
    async fn delete(&self, collection: &str) -> Result<()>;

    /// Create or overwrite the document at `<collection>:<key>`.
    ///
    /// Overwrite semantics: an existing record under the same key is
    /// replaced, not treated as a conflict.
    async fn create(&self, collection: &str, key: i64, document: Document) -> Result<()>;

    /// Run a parameterized graph statement.
    async fn execute(&self, statement: Statement) -> Result<()>;

    /// Number of records in a collection.
    async fn count(&self, collection: &str) -> Result<i64>;

    /// Check that the destination is reachable.
    async fn ping(&self) -> Result<()>;
}

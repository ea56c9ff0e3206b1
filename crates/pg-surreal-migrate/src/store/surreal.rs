//! SurrealDB destination implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;

use crate::config::DestinationConfig;
use crate::error::Result;
use crate::store::{DestinationStore, Document, Statement};

/// SurrealDB destination over the `any` engine (ws/wss/http/https).
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl SurrealStore {
    /// Connect, sign in as root, and select namespace/database.
    pub async fn new(config: &DestinationConfig) -> Result<Self> {
        let db = any::connect(&config.endpoint).await?;

        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await?;

        db.use_ns(&config.namespace).use_db(&config.database).await?;

        info!(
            "Connected to SurrealDB destination: {} ({}/{})",
            config.endpoint, config.namespace, config.database
        );

        Ok(Self { db })
    }
}

#[derive(Deserialize)]
struct CountRow {
    count: i64,
}

#[async_trait]
impl DestinationStore for SurrealStore {
    async fn delete(&self, collection: &str) -> Result<()> {
        let _: Vec<Value> = self.db.delete(collection).await?;
        Ok(())
    }

    async fn create(&self, collection: &str, key: i64, document: Document) -> Result<()> {
        let _: Option<Value> = self
            .db
            .upsert((collection, key))
            .content(Value::Object(document))
            .await?;
        Ok(())
    }

    async fn execute(&self, statement: Statement) -> Result<()> {
        let (text, bindings) = statement.render();
        let mut query = self.db.query(text);
        for (name, value) in bindings {
            query = query.bind((name, value));
        }
        let response = query.await?;
        response.check()?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<i64> {
        let mut response = self
            .db
            .query("SELECT count() AS count FROM type::table($tb) GROUP ALL")
            .bind(("tb", collection.to_string()))
            .await?;
        let row: Option<CountRow> = response.take(0)?;
        Ok(row.map_or(0, |r| r.count))
    }

    async fn ping(&self) -> Result<()> {
        let response = self.db.query("RETURN 1").await?;
        response.check()?;
        Ok(())
    }
}

//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] tokio_postgres::Error),

    /// Destination store connection or statement error
    #[error("Destination store error: {0}")]
    Destination(#[from] surrealdb::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Step ordering could not be planned (cycle or unknown collection)
    #[error("Planning error: {0}")]
    Plan(String),

    /// A single source row could not be mapped to a destination document.
    ///
    /// Caught and aggregated at the importer/materializer boundary; it is
    /// reported as a skipped row rather than propagated.
    #[error("Row mapping failed for {table}: {message}")]
    RowMapping { table: String, message: String },

    /// A migration step failed as a whole
    #[error("Step {step} failed: {message}")]
    Step { step: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Migration was cancelled (SIGINT, etc.)
    #[error("Migration cancelled")]
    Cancelled,
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a RowMapping error
    pub fn row_mapping(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::RowMapping {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a Step error
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Step {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) | MigrateError::Json(_) => 1,
            MigrateError::Source(_) | MigrateError::Pool { .. } => 2,
            MigrateError::Destination(_) => 3,
            MigrateError::Plan(_) => 4,
            MigrateError::Step { .. } | MigrateError::RowMapping { .. } => 5,
            MigrateError::Cancelled => 6,
            MigrateError::Io(_) => 7,
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

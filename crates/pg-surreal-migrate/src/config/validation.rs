//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(MigrateError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(MigrateError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(MigrateError::Config("source.user is required".into()));
    }
    match config.source.ssl_mode.as_str() {
        "disable" | "require" | "verify-ca" | "verify-full" => {}
        other => {
            return Err(MigrateError::Config(format!(
                "source.ssl_mode must be one of disable, require, verify-ca, verify-full, got '{}'",
                other
            )));
        }
    }

    // Destination validation
    if config.destination.endpoint.is_empty() {
        return Err(MigrateError::Config("destination.endpoint is required".into()));
    }
    let scheme_ok = ["ws://", "wss://", "http://", "https://"]
        .iter()
        .any(|scheme| config.destination.endpoint.starts_with(scheme));
    if !scheme_ok {
        return Err(MigrateError::Config(format!(
            "destination.endpoint must start with ws://, wss://, http:// or https://, got '{}'",
            config.destination.endpoint
        )));
    }
    if config.destination.namespace.is_empty() {
        return Err(MigrateError::Config("destination.namespace is required".into()));
    }
    if config.destination.database.is_empty() {
        return Err(MigrateError::Config("destination.database is required".into()));
    }

    // Migration config validation - only check if explicitly set
    if let Some(0) = config.migration.workers {
        return Err(MigrateError::Config(
            "migration.workers must be at least 1".into(),
        ));
    }

    Ok(())
}

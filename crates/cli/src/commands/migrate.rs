//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cs-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/sync/migrations/`:
//! ```text
//! migrations/
//! └── 20261019000001_create_customer_sync_schema.sql
//! ```

use customer_sync::postgres::PgCustomerDataLayer;
use customer_sync::{ConfigError, StorageError, SyncConfig};

/// Errors from the migrate command.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Run pending `customer_sync` migrations.
pub async fn run() -> Result<(), MigrateError> {
    let config = SyncConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let data_layer = PgCustomerDataLayer::connect(&config).await?;

    tracing::info!("Running customer_sync migrations...");
    data_layer.migrate().await?;

    tracing::info!("Migrations complete");
    Ok(())
}

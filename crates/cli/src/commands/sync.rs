//! One-off sync of a single external customer.
//!
//! # Usage
//!
//! ```bash
//! cs-cli sync --file customer.json
//! ```
//!
//! The file holds one external customer in the upstream feed format:
//!
//! ```json
//! {
//!   "externalId": "12345",
//!   "name": "Acme Inc.",
//!   "companyNumber": "470813-8895",
//!   "postalAddress": { "street": "123 main st", "city": "Helsingborg", "postalCode": "SE-123 45" },
//!   "shoppingLists": [{ "products": ["lipstick", "blusher"] }]
//! }
//! ```
//!
//! The outcome, including assigned internal IDs, is printed as JSON on
//! stdout. Running the same file again updates the customer and its lists
//! in place.

use std::path::Path;
use std::sync::Arc;

use customer_sync::postgres::PgCustomerDataLayer;
use customer_sync::{ConfigError, CustomerSync, StorageError, SyncConfig, SyncError};
use customer_sync_core::ExternalCustomer;

/// Errors from the sync command.
#[derive(Debug, thiserror::Error)]
pub enum SyncCommandError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid customer document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),
}

/// Read an external customer from `path` and sync it.
pub async fn run(path: &Path) -> Result<(), SyncCommandError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SyncCommandError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let mut external: ExternalCustomer = serde_json::from_str(&raw)?;

    let config = SyncConfig::from_env()?;
    let data_layer = PgCustomerDataLayer::connect(&config).await?;
    let sync = CustomerSync::new(Arc::new(data_layer), config.resolution);

    let outcome = sync.sync(&mut external).await?;
    tracing::info!(
        external_id = %external.external_id,
        created = outcome.created,
        "Sync complete"
    );

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}

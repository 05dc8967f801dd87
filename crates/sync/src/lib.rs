//! Customer Sync - reconcile external customers into the internal store.
//!
//! Given one customer record from the upstream source system, decide whether
//! it is new or already known, write the merged record, and bring its
//! shopping lists up to date.
//!
//! # Architecture
//!
//! ```text
//! ExternalCustomer
//!        │
//!        ▼
//! ┌──────────────────┐   lookups   ┌───────────────────┐
//! │ IdentityResolver │────────────►│                   │
//! └────────┬─────────┘             │                   │
//!          ▼                       │ CustomerDataLayer │
//!     merge()                      │ (memory/postgres) │
//!          │      create / update  │                   │
//!          ├──────────────────────►│                   │
//!          ▼                       │                   │
//! ┌──────────────────────────┐     │                   │
//! │ ShoppingListSynchronizer │────►│                   │
//! └──────────────────────────┘     └───────────────────┘
//! ```
//!
//! [`CustomerSync`] composes these steps; it is the only type most callers
//! need.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use customer_sync::{CustomerSync, InMemoryCustomerDataLayer};
//! use customer_sync_core::{Address, ExternalCustomer, ExternalId, ShoppingList};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), customer_sync::SyncError> {
//! let db = Arc::new(InMemoryCustomerDataLayer::new());
//! let sync = CustomerSync::from_data_layer(db);
//!
//! let mut external = ExternalCustomer {
//!     postal_address: Address::new("1 high st", "Lund", "SE-222 22"),
//!     name: "Jane Doe".to_owned(),
//!     master_external_id: None,
//!     shopping_lists: vec![ShoppingList::new(["soap"])],
//!     external_id: ExternalId::new("9"),
//!     company_number: None,
//! };
//!
//! assert!(sync.sync_with_data_layer(&mut external).await?);
//! // The list now carries the ID it was stored under.
//! assert!(!external.shopping_lists[0].is_new());
//!
//! // Syncing the same data again updates instead of creating.
//! assert!(!sync.sync_with_data_layer(&mut external).await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `postgres` - [`postgres::PgCustomerDataLayer`], a `PostgreSQL` backend
//!   built on sqlx

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod data_layer;
pub mod error;
pub mod memory;
pub mod merger;
pub mod orchestrator;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod resolver;
pub mod shopping_lists;

pub use config::{ConfigError, ResolutionPolicy, SyncConfig};
pub use data_layer::CustomerDataLayer;
pub use error::{StorageError, SyncError, SyncResult};
pub use memory::InMemoryCustomerDataLayer;
pub use merger::merge;
pub use orchestrator::{CustomerSync, SyncOutcome};
pub use resolver::{IdentityMatch, IdentityResolver, MatchedBy};
pub use shopping_lists::ShoppingListSynchronizer;

//! The storage contract customer sync depends on.
//!
//! Sync never talks to a database directly. Any backend that implements
//! [`CustomerDataLayer`] can be plugged into [`CustomerSync`](crate::CustomerSync):
//! the in-memory store in [`memory`](crate::memory), the `PostgreSQL` store
//! behind the `postgres` feature, or a caller's own.
//!
//! # Backend obligations
//!
//! - Lookups should be indexed; the sync algorithm calls up to three of them
//!   per external customer.
//! - Concurrent syncs for the same identity must not race. Sync itself takes
//!   no locks, so the backend must at least provide read-your-writes
//!   consistency.
//! - Customer records returned from any method carry their persisted shopping
//!   lists, in creation order. Creating or updating a customer record never
//!   writes shopping lists; that is done through
//!   [`update_shopping_list`](CustomerDataLayer::update_shopping_list).

use async_trait::async_trait;
use customer_sync_core::{CompanyNumber, Customer, ExternalId, ShoppingList};

use crate::error::StorageError;

/// Lookup and write operations on the internal customer store.
#[async_trait]
pub trait CustomerDataLayer: Send + Sync {
    /// Find the customer with this exact external ID.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Customer>, StorageError>;

    /// Find the customer registered under this company number.
    async fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> Result<Option<Customer>, StorageError>;

    /// Find a customer whose master external ID is `master_external_id`.
    ///
    /// Several sub-accounts may share a master; backends return the earliest
    /// created one.
    async fn find_by_master_external_id(
        &self,
        master_external_id: &ExternalId,
    ) -> Result<Option<Customer>, StorageError>;

    /// Insert a new customer record.
    ///
    /// Returns the stored record with its `internal_id` assigned. A caller
    /// supplied `internal_id` is kept.
    async fn create_customer_record(&self, customer: Customer) -> Result<Customer, StorageError>;

    /// Replace the customer record keyed by `customer.internal_id`.
    ///
    /// Returns `Ok(None)` if no such record exists (anymore).
    async fn update_customer_record(
        &self,
        customer: Customer,
    ) -> Result<Option<Customer>, StorageError>;

    /// Upsert a shopping list.
    ///
    /// Keyed by `internal_id` when present, otherwise a new list is created.
    /// `customer_internal_id` must reference an existing customer. Returns the
    /// stored list with both IDs set.
    async fn update_shopping_list(
        &self,
        shopping_list: ShoppingList,
    ) -> Result<ShoppingList, StorageError>;
}

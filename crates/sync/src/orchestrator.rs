//! The create-or-update entry point.
//!
//! One call reconciles one external customer:
//!
//! 1. resolve the matching internal customer (if any)
//! 2. merge the external fields onto it, or onto a fresh record
//! 3. create or update the customer record
//! 4. write the shopping lists against the persisted customer, recording
//!    the assigned list IDs on the external customer
//!
//! Steps 3 and 4 are separate writes. A failure during step 4 leaves the
//! customer persisted with some lists unsynced; running the same sync again
//! repairs it without duplicating the lists already written.

use std::sync::Arc;

use customer_sync_core::{Customer, ExternalCustomer, ShoppingList};
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::ResolutionPolicy;
use crate::data_layer::CustomerDataLayer;
use crate::error::{StorageError, SyncError, SyncResult};
use crate::merger::merge;
use crate::resolver::{IdentityResolver, MatchedBy};
use crate::shopping_lists::ShoppingListSynchronizer;

/// What a single sync did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// `true` if a new customer was created, `false` if one was updated.
    pub created: bool,
    /// The lookup that matched, for updates.
    pub matched_by: Option<MatchedBy>,
    /// The customer record as returned by the data layer after create/update.
    pub customer: Customer,
    /// The synced shopping lists with their assigned IDs, in payload order.
    pub shopping_lists: Vec<ShoppingList>,
}

/// Reconciles external customers into the internal store.
///
/// Holds no mutable state; share it behind an `Arc` to sync different
/// customers concurrently.
#[derive(Clone)]
pub struct CustomerSync {
    data_layer: Arc<dyn CustomerDataLayer>,
    policy: ResolutionPolicy,
}

impl CustomerSync {
    /// Create a sync service with an explicit resolution policy.
    #[must_use]
    pub fn new(data_layer: Arc<dyn CustomerDataLayer>, policy: ResolutionPolicy) -> Self {
        Self { data_layer, policy }
    }

    /// Create a sync service using the default resolution policy.
    #[must_use]
    pub fn from_data_layer(data_layer: Arc<dyn CustomerDataLayer>) -> Self {
        Self::new(data_layer, ResolutionPolicy::default())
    }

    /// Sync one external customer.
    ///
    /// Returns `true` if a new customer was created, `false` if an existing
    /// one was updated. Assigned shopping list IDs are written back onto
    /// `external`.
    ///
    /// # Errors
    ///
    /// See [`CustomerSync::sync`].
    pub async fn sync_with_data_layer(&self, external: &mut ExternalCustomer) -> SyncResult<bool> {
        Ok(self.sync(external).await?.created)
    }

    /// Sync one external customer and report what was written.
    ///
    /// Each of `external`'s shopping lists gets its `internal_id` and
    /// `customer_internal_id` set once it is persisted, so syncing the same
    /// value again updates those lists in place.
    ///
    /// # Errors
    ///
    /// - `SyncError::AmbiguousMatch` if identity resolution is inconclusive;
    ///   nothing has been written.
    /// - `SyncError::LostRecord` if the matched customer vanished before the
    ///   update.
    /// - `SyncError::Storage` if the data layer fails, unchanged.
    #[instrument(skip(self, external), fields(external_id = %external.external_id))]
    pub async fn sync(&self, external: &mut ExternalCustomer) -> SyncResult<SyncOutcome> {
        let data_layer = self.data_layer.as_ref();

        let resolved = IdentityResolver::new(data_layer, self.policy)
            .resolve(&*external)
            .await?;
        let created = resolved.is_none();
        let matched_by = resolved.as_ref().map(|m| m.matched_by);

        let merged = merge(&*external, resolved.as_ref().map(|m| &m.customer));

        let customer = if created {
            data_layer.create_customer_record(merged).await?
        } else {
            let internal_id = merged.internal_id.clone().ok_or_else(|| {
                StorageError::DataCorruption(
                    "matched customer record has no internal id".to_owned(),
                )
            })?;
            data_layer
                .update_customer_record(merged)
                .await?
                .ok_or(SyncError::LostRecord { internal_id })?
        };

        let owner = customer.internal_id.clone().ok_or_else(|| {
            StorageError::DataCorruption("persisted customer record has no internal id".to_owned())
        })?;

        let shopping_lists = ShoppingListSynchronizer::new(data_layer)
            .synchronize(&owner, &customer.shopping_lists, &mut external.shopping_lists)
            .await?;

        if created {
            info!(internal_id = %owner, lists = shopping_lists.len(), "created customer");
        } else {
            info!(
                internal_id = %owner,
                matched_by = ?matched_by,
                lists = shopping_lists.len(),
                "updated customer"
            );
        }

        Ok(SyncOutcome {
            created,
            matched_by,
            customer,
            shopping_lists,
        })
    }
}

impl std::fmt::Debug for CustomerSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerSync")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use customer_sync_core::{Address, CompanyNumber, CustomerType, ExternalId};

    use super::*;
    use crate::memory::InMemoryCustomerDataLayer;

    fn external(external_id: &str) -> ExternalCustomer {
        ExternalCustomer {
            postal_address: Address::new("123 main st", "Helsingborg", "SE-123 45"),
            name: "Acme Inc.".to_owned(),
            master_external_id: None,
            shopping_lists: vec![ShoppingList::new(["lipstick", "blusher"])],
            external_id: ExternalId::new(external_id),
            company_number: Some(CompanyNumber::parse("470813-8895").unwrap()),
        }
    }

    #[tokio::test]
    async fn test_outcome_reports_create_then_update() {
        let db = Arc::new(InMemoryCustomerDataLayer::new());
        let sut = CustomerSync::from_data_layer(db.clone());

        let mut acme = external("12345");
        let created = sut.sync(&mut acme).await.unwrap();
        let updated = sut.sync(&mut acme).await.unwrap();

        assert!(created.created);
        assert_eq!(created.matched_by, None);
        assert_eq!(created.customer.customer_type, Some(CustomerType::Company));
        assert!(!updated.created);
        assert_eq!(updated.matched_by, Some(MatchedBy::ExternalId));
        assert_eq!(updated.customer.internal_id, created.customer.internal_id);
        assert_eq!(updated.shopping_lists, created.shopping_lists);
        assert_eq!(db.customer_count().await, 1);
        assert_eq!(db.shopping_list_count().await, 1);
    }

    #[tokio::test]
    async fn test_sync_records_list_ids_on_external() {
        let db = Arc::new(InMemoryCustomerDataLayer::new());
        let mut acme = external("12345");

        let outcome = CustomerSync::from_data_layer(db)
            .sync(&mut acme)
            .await
            .unwrap();

        let list = acme.shopping_lists.first().unwrap();
        assert_eq!(list.internal_id, outcome.shopping_lists.first().unwrap().internal_id);
        assert_eq!(list.customer_internal_id, outcome.customer.internal_id);
    }

    #[tokio::test]
    async fn test_ambiguous_match_writes_nothing() {
        let db = Arc::new(InMemoryCustomerDataLayer::new());
        db.create_customer_record(Customer {
            external_id: Some(ExternalId::new("12345")),
            company_number: Some(CompanyNumber::parse("111111-2222").unwrap()),
            customer_type: Some(CustomerType::Company),
            ..Customer::default()
        })
        .await
        .unwrap();

        let err = CustomerSync::from_data_layer(db.clone())
            .sync(&mut external("12345"))
            .await
            .unwrap_err();

        assert!(err.is_ambiguous_match());
        assert_eq!(db.shopping_list_count().await, 0);
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let outcome = SyncOutcome {
            created: false,
            matched_by: Some(MatchedBy::CompanyNumber),
            customer: Customer::default(),
            shopping_lists: Vec::new(),
        };

        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["matchedBy"], "company_number");
        assert_eq!(json["shoppingLists"], serde_json::json!([]));
    }

    #[test]
    fn test_debug_omits_data_layer() {
        let sut = CustomerSync::from_data_layer(Arc::new(InMemoryCustomerDataLayer::new()));
        let debug = format!("{sut:?}");
        assert!(debug.contains("policy"));
        assert!(!debug.contains("InMemory"));
    }
}

//! Shopping list synchronization for a persisted customer.

use std::collections::HashSet;

use customer_sync_core::{CustomerId, ShoppingList, ShoppingListId};
use tracing::debug;

use crate::data_layer::CustomerDataLayer;
use crate::error::SyncResult;

/// Writes a customer's shopping lists through the data layer.
///
/// A list that carries an `internal_id` is updated under that ID. A list
/// without one is matched by content against the customer's stored lists
/// that no other list in the payload claims, and only created when nothing
/// matches. Sending the same lists twice therefore never duplicates them.
/// Lists missing from the payload are never deleted.
pub struct ShoppingListSynchronizer<'a> {
    data_layer: &'a dyn CustomerDataLayer,
}

impl<'a> ShoppingListSynchronizer<'a> {
    /// Create a new synchronizer.
    #[must_use]
    pub const fn new(data_layer: &'a dyn CustomerDataLayer) -> Self {
        Self { data_layer }
    }

    /// Persist `shopping_lists` for the customer `owner`, in input order.
    ///
    /// `stored` are the lists the data layer already holds for `owner`. Each
    /// list in `shopping_lists` gets its assigned `internal_id` and
    /// `customer_internal_id` written back as soon as its write succeeds.
    /// Returns the stored lists, in input order.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Storage` on the first failed write. Lists before it
    /// stay persisted and keep their written-back IDs.
    pub async fn synchronize(
        &self,
        owner: &CustomerId,
        stored: &[ShoppingList],
        shopping_lists: &mut [ShoppingList],
    ) -> SyncResult<Vec<ShoppingList>> {
        let mut claimed: HashSet<ShoppingListId> = shopping_lists
            .iter()
            .filter_map(|list| list.internal_id.clone())
            .collect();
        let mut persisted = Vec::with_capacity(shopping_lists.len());

        for list in shopping_lists.iter_mut() {
            let internal_id = match &list.internal_id {
                Some(id) => Some(id.clone()),
                None => match_stored(stored, &mut claimed, list),
            };

            let request = ShoppingList {
                internal_id,
                customer_internal_id: Some(owner.clone()),
                products: list.products.clone(),
            };

            if request.is_new() {
                debug!(products = request.products.len(), "creating shopping list");
            } else {
                debug!(shopping_list_id = ?request.internal_id, "updating shopping list");
            }

            let saved = self.data_layer.update_shopping_list(request).await?;
            list.internal_id.clone_from(&saved.internal_id);
            list.customer_internal_id.clone_from(&saved.customer_internal_id);
            persisted.push(saved);
        }

        Ok(persisted)
    }
}

/// Find an unclaimed stored list with the same products and claim it.
fn match_stored(
    stored: &[ShoppingList],
    claimed: &mut HashSet<ShoppingListId>,
    list: &ShoppingList,
) -> Option<ShoppingListId> {
    let id = stored
        .iter()
        .filter(|candidate| candidate.has_same_products(list))
        .filter_map(|candidate| candidate.internal_id.as_ref())
        .find(|id| !claimed.contains(*id))?
        .clone();
    claimed.insert(id.clone());
    Some(id)
}

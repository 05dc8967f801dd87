//! Shopping lists owned by customers.

use serde::{Deserialize, Serialize};

use super::{CustomerId, ShoppingListId};

/// An ordered collection of product identifiers owned by a customer.
///
/// A list without an `internal_id` has never been persisted. Once the data
/// layer assigns one, the list is updated in place on every later sync.
///
/// Equality compares product content as a multiset: the same products in a
/// different order are equal. Order is still preserved in `products`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    /// Assigned by the data layer on first persistence.
    #[serde(default)]
    pub internal_id: Option<ShoppingListId>,
    /// Back-reference to the owning customer, set by the data layer.
    #[serde(default)]
    pub customer_internal_id: Option<CustomerId>,
    /// Product identifiers, in the order received.
    pub products: Vec<String>,
}

impl ShoppingList {
    /// Create a new, not yet persisted shopping list.
    #[must_use]
    pub fn new<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            internal_id: None,
            customer_internal_id: None,
            products: products.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a previously assigned internal ID.
    #[must_use]
    pub fn with_internal_id(mut self, internal_id: ShoppingListId) -> Self {
        self.internal_id = Some(internal_id);
        self
    }

    /// Whether this list has never been persisted.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.internal_id.is_none()
    }

    /// Whether both lists hold the same products, ignoring order.
    #[must_use]
    pub fn has_same_products(&self, other: &Self) -> bool {
        self.sorted_products() == other.sorted_products()
    }

    fn sorted_products(&self) -> Vec<&str> {
        let mut products: Vec<&str> = self.products.iter().map(String::as_str).collect();
        products.sort_unstable();
        products
    }
}

impl PartialEq for ShoppingList {
    fn eq(&self, other: &Self) -> bool {
        self.internal_id == other.internal_id
            && self.customer_internal_id == other.customer_internal_id
            && self.has_same_products(other)
    }
}

impl Eq for ShoppingList {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_has_no_identity() {
        let list = ShoppingList::new(["lipstick", "blusher"]);
        assert!(list.is_new());
        assert!(list.customer_internal_id.is_none());
        assert_eq!(list.products, vec!["lipstick", "blusher"]);
    }

    #[test]
    fn test_equality_ignores_product_order() {
        let a = ShoppingList::new(["lipstick", "blusher"]);
        let b = ShoppingList::new(["blusher", "lipstick"]);
        assert_eq!(a, b);
        // order is still kept as given
        assert_eq!(b.products.first().map(String::as_str), Some("blusher"));
    }

    #[test]
    fn test_equality_counts_duplicates() {
        let a = ShoppingList::new(["soap", "soap"]);
        let b = ShoppingList::new(["soap"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_includes_identity() {
        let a = ShoppingList::new(["soap"]).with_internal_id(ShoppingListId::new("1"));
        let b = ShoppingList::new(["soap"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_products_ignores_identity() {
        let stored = ShoppingList::new(["blusher", "lipstick"])
            .with_internal_id(ShoppingListId::new("1"));
        let incoming = ShoppingList::new(["lipstick", "blusher"]);
        assert!(stored.has_same_products(&incoming));
        assert!(!stored.has_same_products(&ShoppingList::new(["lipstick"])));
    }

    #[test]
    fn test_deserialize_without_ids() {
        let list: ShoppingList = serde_json::from_str(r#"{"products":["a","b"]}"#).unwrap();
        assert!(list.is_new());
        assert_eq!(list.products.len(), 2);
    }
}

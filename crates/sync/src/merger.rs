//! Field merging from an external customer onto the internal record.

use customer_sync_core::{Customer, ExternalCustomer};

/// Build the customer state to persist.
///
/// With `existing == None` this is a fresh record (create path); otherwise the
/// matched record is the base (update path). The result is a new value: the
/// matched record is never modified in place.
///
/// - Name, address, company number and external ID always come from the
///   external customer.
/// - Customer type is re-derived from company number presence.
/// - The master external ID is only taken from the external customer on
///   create; an existing record is never reparented.
/// - Preferred store and internal ID are carried over untouched.
/// - Shopping lists are the external customer's lists. Their persistence is
///   handled separately by [`ShoppingListSynchronizer`](crate::ShoppingListSynchronizer).
#[must_use]
pub fn merge(external: &ExternalCustomer, existing: Option<&Customer>) -> Customer {
    let base = existing.cloned().unwrap_or_else(|| Customer {
        master_external_id: external.master_external_id.clone(),
        ..Customer::default()
    });

    Customer {
        external_id: Some(external.external_id.clone()),
        address: Some(external.postal_address.clone()),
        name: Some(external.name.clone()),
        customer_type: Some(external.customer_type()),
        company_number: external.company_number.clone(),
        shopping_lists: external.shopping_lists.clone(),
        ..base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use customer_sync_core::{
        Address, CompanyNumber, CustomerId, CustomerType, ExternalId, ShoppingList,
    };

    use super::*;

    fn external_company() -> ExternalCustomer {
        ExternalCustomer {
            postal_address: Address::new("123 main st", "Helsingborg", "SE-123 45"),
            name: "Acme Inc.".to_owned(),
            master_external_id: Some(ExternalId::new("parent-1")),
            shopping_lists: vec![ShoppingList::new(["lipstick", "blusher"])],
            external_id: ExternalId::new("12345"),
            company_number: Some(CompanyNumber::parse("470813-8895").unwrap()),
        }
    }

    #[test]
    fn test_create_takes_everything_from_external() {
        let external = external_company();
        let merged = merge(&external, None);

        assert_eq!(merged.external_id, Some(external.external_id.clone()));
        assert_eq!(merged.master_external_id, external.master_external_id);
        assert_eq!(merged.address, Some(external.postal_address.clone()));
        assert_eq!(merged.name.as_deref(), Some("Acme Inc."));
        assert_eq!(merged.company_number, external.company_number);
        assert_eq!(merged.customer_type, Some(CustomerType::Company));
        assert_eq!(merged.shopping_lists, external.shopping_lists);
        assert!(merged.internal_id.is_none());
        assert!(merged.preferred_store.is_none());
    }

    #[test]
    fn test_update_keeps_internal_only_fields() {
        let existing = Customer {
            internal_id: Some(CustomerId::new("45435")),
            preferred_store: Some("Helsingborg City".to_owned()),
            master_external_id: Some(ExternalId::new("original-parent")),
            name: Some("Old Name AB".to_owned()),
            ..Customer::default()
        };

        let merged = merge(&external_company(), Some(&existing));

        assert_eq!(merged.internal_id, existing.internal_id);
        assert_eq!(merged.preferred_store, existing.preferred_store);
        assert_eq!(merged.master_external_id, existing.master_external_id);
        assert_eq!(merged.name.as_deref(), Some("Acme Inc."));
        // the matched record itself is untouched
        assert_eq!(existing.name.as_deref(), Some("Old Name AB"));
    }

    #[test]
    fn test_update_never_sets_master_on_existing_record() {
        let existing = Customer {
            internal_id: Some(CustomerId::new("1")),
            ..Customer::default()
        };

        let merged = merge(&external_company(), Some(&existing));

        assert!(merged.master_external_id.is_none());
    }

    #[test]
    fn test_type_rederived_when_company_number_disappears() {
        let existing = Customer {
            internal_id: Some(CustomerId::new("1")),
            company_number: Some(CompanyNumber::parse("470813-8895").unwrap()),
            customer_type: Some(CustomerType::Company),
            ..Customer::default()
        };
        let mut external = external_company();
        external.company_number = None;

        let merged = merge(&external, Some(&existing));

        assert!(merged.company_number.is_none());
        assert_eq!(merged.customer_type, Some(CustomerType::Person));
        assert!(merged.is_type_consistent());
    }
}

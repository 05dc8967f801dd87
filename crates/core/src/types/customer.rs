//! The internal customer record.

use serde::{Deserialize, Serialize};

use super::{Address, CompanyNumber, CustomerId, CustomerType, ExternalId, ShoppingList};

/// A customer as stored in this system.
///
/// Every field except `shopping_lists` may be absent: records created by other
/// processes do not necessarily carry external data, and `internal_id` is only
/// present once the data layer has persisted the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub external_id: Option<ExternalId>,
    /// External ID of the parent company, for sub-accounts.
    pub master_external_id: Option<ExternalId>,
    pub address: Option<Address>,
    /// Internal-only preference, never written by sync.
    pub preferred_store: Option<String>,
    /// Durable internal identity, assigned by the data layer.
    pub internal_id: Option<CustomerId>,
    pub name: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub company_number: Option<CompanyNumber>,
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
}

impl Customer {
    /// Whether `customer_type` agrees with company number presence.
    ///
    /// A record with no type at all is considered consistent; it has simply
    /// never been classified.
    #[must_use]
    pub fn is_type_consistent(&self) -> bool {
        self.customer_type.is_none_or(|kind| {
            kind == CustomerType::for_company_number(self.company_number.as_ref())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_record() {
        let customer = Customer::default();
        assert!(customer.internal_id.is_none());
        assert!(customer.shopping_lists.is_empty());
        assert!(customer.is_type_consistent());
    }

    #[test]
    fn test_type_consistency() {
        let mut customer = Customer {
            company_number: Some(CompanyNumber::parse("470813-8895").unwrap()),
            customer_type: Some(CustomerType::Company),
            ..Customer::default()
        };
        assert!(customer.is_type_consistent());

        customer.customer_type = Some(CustomerType::Person);
        assert!(!customer.is_type_consistent());

        customer.company_number = None;
        assert!(customer.is_type_consistent());
    }
}

//! Customer records as delivered by the upstream source system.

use serde::{Deserialize, Serialize};

use super::{Address, CompanyNumber, CustomerType, ExternalId, ShoppingList};

/// A customer as received from the external source system.
///
/// Transient: it is never persisted as-is, only reconciled into a
/// [`Customer`](crate::Customer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCustomer {
    pub postal_address: Address,
    pub name: String,
    /// Set when this customer is a sub-account of another external company.
    #[serde(default)]
    pub master_external_id: Option<ExternalId>,
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
    /// Unique identity in the source system.
    pub external_id: ExternalId,
    /// Present only for companies.
    #[serde(default)]
    pub company_number: Option<CompanyNumber>,
}

impl ExternalCustomer {
    /// Whether the external customer represents a company.
    #[must_use]
    pub const fn is_company(&self) -> bool {
        self.company_number.is_some()
    }

    /// The customer type implied by the external data.
    #[must_use]
    pub const fn customer_type(&self) -> CustomerType {
        CustomerType::for_company_number(self.company_number.as_ref())
    }
}

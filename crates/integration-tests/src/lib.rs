//! Integration tests for Customer Sync.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests
//! cargo test -p customer-sync-integration-tests
//!
//! # PostgreSQL tests (needs CUSTOMER_SYNC_TEST_DATABASE_URL)
//! cargo test -p customer-sync-integration-tests --features postgres -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `customer_sync` - End-to-end sync against the in-memory data layer
//! - `postgres_data_layer` - The `PostgreSQL` backend against a live database
//!
//! This library holds the fixtures shared by both.

use customer_sync_core::{
    Address, CompanyNumber, Customer, CustomerId, CustomerType, ExternalCustomer, ExternalId,
    ShoppingList,
};

/// Parse a company number known to be valid.
///
/// # Panics
///
/// Panics if `raw` is not a valid company number.
#[must_use]
pub fn company_number(raw: &str) -> CompanyNumber {
    CompanyNumber::parse(raw).expect("fixture company number is valid")
}

/// The Acme Inc. company as the upstream feed sends it.
#[must_use]
pub fn create_external_company() -> ExternalCustomer {
    ExternalCustomer {
        postal_address: Address::new("123 main st", "Helsingborg", "SE-123 45"),
        name: "Acme Inc.".to_owned(),
        master_external_id: None,
        shopping_lists: vec![ShoppingList::new(["lipstick", "blusher"])],
        external_id: ExternalId::new("12345"),
        company_number: Some(company_number("470813-8895")),
    }
}

/// A private person as the upstream feed sends it.
#[must_use]
pub fn create_external_person(external_id: &str) -> ExternalCustomer {
    ExternalCustomer {
        postal_address: Address::new("1 high st", "Lund", "SE-222 22"),
        name: "Jane Doe".to_owned(),
        master_external_id: None,
        shopping_lists: vec![ShoppingList::new(["soap"])],
        external_id: ExternalId::new(external_id),
        company_number: None,
    }
}

/// An internal record for the same company as `external`, known by internal
/// ID only.
#[must_use]
pub fn create_customer_with_same_company_as(external: &ExternalCustomer) -> Customer {
    Customer {
        internal_id: Some(CustomerId::new("45435")),
        company_number: external.company_number.clone(),
        customer_type: Some(CustomerType::Company),
        ..Customer::default()
    }
}

/// The Acme Inc. company as a raw upstream feed document.
pub const ACME_FEED_DOCUMENT: &str = r#"{
    "postalAddress": {"street": "123 main st", "city": "Helsingborg", "postalCode": "SE-123 45"},
    "name": "Acme Inc.",
    "masterExternalId": null,
    "shoppingLists": [{"products": ["lipstick", "blusher"]}],
    "externalId": "12345",
    "companyNumber": "470813-8895"
}"#;

/// Decode an external customer from an upstream feed document.
///
/// # Errors
///
/// Returns the `serde_json` error if the document is malformed or a field
/// fails validation.
pub fn parse_feed_document(document: &str) -> Result<ExternalCustomer, serde_json::Error> {
    serde_json::from_str(document)
}

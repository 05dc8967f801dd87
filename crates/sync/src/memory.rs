//! In-memory [`CustomerDataLayer`] backend.
//!
//! Keeps customers and shopping lists in maps indexed by every lookup key, so
//! each lookup is a hash probe. Intended for tests, local tooling, and as a
//! reference for what a storage backend must guarantee:
//!
//! - external IDs and company numbers are unique across customers
//! - stored records are never aliased by returned values
//! - shopping lists reference an existing customer
//!
//! All writes are serialized behind one lock, which gives the per-identity
//! write serialization sync relies on.
//!
//! Failure injection hooks ([`fail_customer_writes`](InMemoryCustomerDataLayer::fail_customer_writes),
//! [`fail_shopping_list_writes_after`](InMemoryCustomerDataLayer::fail_shopping_list_writes_after))
//! and [`remove_customer`](InMemoryCustomerDataLayer::remove_customer) let
//! tests exercise storage failures and records vanishing mid-sync.

use std::collections::HashMap;

use async_trait::async_trait;
use customer_sync_core::{
    Address, CompanyNumber, Customer, CustomerId, CustomerType, ExternalId, ShoppingList,
    ShoppingListId,
};
use tokio::sync::RwLock;

use crate::data_layer::CustomerDataLayer;
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct CustomerRecord {
    internal_id: CustomerId,
    external_id: Option<ExternalId>,
    master_external_id: Option<ExternalId>,
    address: Option<Address>,
    preferred_store: Option<String>,
    name: Option<String>,
    customer_type: Option<CustomerType>,
    company_number: Option<CompanyNumber>,
}

impl CustomerRecord {
    fn from_customer(internal_id: CustomerId, customer: Customer) -> Self {
        Self {
            internal_id,
            external_id: customer.external_id,
            master_external_id: customer.master_external_id,
            address: customer.address,
            preferred_store: customer.preferred_store,
            name: customer.name,
            customer_type: customer.customer_type,
            company_number: customer.company_number,
        }
    }
}

#[derive(Debug, Clone)]
struct ShoppingListRecord {
    internal_id: ShoppingListId,
    customer_id: CustomerId,
    products: Vec<String>,
}

impl ShoppingListRecord {
    fn to_entity(&self) -> ShoppingList {
        ShoppingList {
            internal_id: Some(self.internal_id.clone()),
            customer_internal_id: Some(self.customer_id.clone()),
            products: self.products.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    customers: HashMap<CustomerId, CustomerRecord>,
    by_external_id: HashMap<ExternalId, CustomerId>,
    by_company_number: HashMap<CompanyNumber, CustomerId>,
    // creation order, oldest first
    by_master_external_id: HashMap<ExternalId, Vec<CustomerId>>,
    shopping_lists: HashMap<ShoppingListId, ShoppingListRecord>,
    // creation order, oldest first
    lists_by_customer: HashMap<CustomerId, Vec<ShoppingListId>>,
    next_customer_id: u64,
    next_shopping_list_id: u64,
    fail_customer_writes: bool,
    shopping_list_writes_remaining: Option<usize>,
}

impl State {
    fn allocate_customer_id(&mut self) -> CustomerId {
        loop {
            self.next_customer_id += 1;
            let id = CustomerId::new(self.next_customer_id.to_string());
            if !self.customers.contains_key(&id) {
                return id;
            }
        }
    }

    fn allocate_shopping_list_id(&mut self) -> ShoppingListId {
        loop {
            self.next_shopping_list_id += 1;
            let id = ShoppingListId::new(self.next_shopping_list_id.to_string());
            if !self.shopping_lists.contains_key(&id) {
                return id;
            }
        }
    }

    fn load(&self, id: &CustomerId) -> Option<Customer> {
        let record = self.customers.get(id)?;
        let shopping_lists = self
            .lists_by_customer
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|list_id| self.shopping_lists.get(list_id))
            .map(ShoppingListRecord::to_entity)
            .collect();

        Some(Customer {
            external_id: record.external_id.clone(),
            master_external_id: record.master_external_id.clone(),
            address: record.address.clone(),
            preferred_store: record.preferred_store.clone(),
            internal_id: Some(record.internal_id.clone()),
            name: record.name.clone(),
            customer_type: record.customer_type,
            company_number: record.company_number.clone(),
            shopping_lists,
        })
    }

    /// Ensure `record`'s unique keys are not held by another customer.
    fn check_unique(&self, record: &CustomerRecord) -> Result<(), StorageError> {
        if let Some(external_id) = &record.external_id
            && let Some(owner) = self.by_external_id.get(external_id)
            && *owner != record.internal_id
        {
            return Err(StorageError::Conflict(format!(
                "external id {external_id} already belongs to customer {owner}"
            )));
        }
        if let Some(company_number) = &record.company_number
            && let Some(owner) = self.by_company_number.get(company_number)
            && *owner != record.internal_id
        {
            return Err(StorageError::Conflict(format!(
                "company number {company_number} already belongs to customer {owner}"
            )));
        }
        Ok(())
    }

    fn index(&mut self, record: &CustomerRecord) {
        let id = &record.internal_id;
        if let Some(external_id) = &record.external_id {
            self.by_external_id.insert(external_id.clone(), id.clone());
        }
        if let Some(company_number) = &record.company_number {
            self.by_company_number
                .insert(company_number.clone(), id.clone());
        }
        if let Some(master) = &record.master_external_id {
            let siblings = self.by_master_external_id.entry(master.clone()).or_default();
            if !siblings.contains(id) {
                siblings.push(id.clone());
            }
        }
    }

    fn unindex(&mut self, record: &CustomerRecord) {
        if let Some(external_id) = &record.external_id {
            self.by_external_id.remove(external_id);
        }
        if let Some(company_number) = &record.company_number {
            self.by_company_number.remove(company_number);
        }
        if let Some(master) = &record.master_external_id
            && let Some(siblings) = self.by_master_external_id.get_mut(master)
        {
            siblings.retain(|id| *id != record.internal_id);
            if siblings.is_empty() {
                self.by_master_external_id.remove(master);
            }
        }
    }

    fn check_customer_write(&self) -> Result<(), StorageError> {
        if self.fail_customer_writes {
            return Err(StorageError::Unavailable(
                "customer writes are failing".to_owned(),
            ));
        }
        Ok(())
    }

    fn check_shopping_list_write(&mut self) -> Result<(), StorageError> {
        match &mut self.shopping_list_writes_remaining {
            Some(0) => Err(StorageError::Unavailable(
                "shopping list writes are failing".to_owned(),
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// A [`CustomerDataLayer`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCustomerDataLayer {
    state: RwLock<State>,
}

impl InMemoryCustomerDataLayer {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored customers.
    pub async fn customer_count(&self) -> usize {
        self.state.read().await.customers.len()
    }

    /// Number of stored shopping lists, across all customers.
    pub async fn shopping_list_count(&self) -> usize {
        self.state.read().await.shopping_lists.len()
    }

    /// Load a customer by internal ID.
    pub async fn find_by_internal_id(&self, id: &CustomerId) -> Option<Customer> {
        self.state.read().await.load(id)
    }

    /// Delete a customer and its shopping lists, as another process might.
    ///
    /// Returns the removed customer.
    pub async fn remove_customer(&self, id: &CustomerId) -> Option<Customer> {
        let mut state = self.state.write().await;
        let removed = state.load(id)?;
        let record = state.customers.remove(id)?;
        state.unindex(&record);
        for list_id in state.lists_by_customer.remove(id).unwrap_or_default() {
            state.shopping_lists.remove(&list_id);
        }
        Some(removed)
    }

    /// Make every customer create/update fail with `StorageError::Unavailable`.
    pub async fn fail_customer_writes(&self, fail: bool) {
        self.state.write().await.fail_customer_writes = fail;
    }

    /// Let `successful` more shopping list writes through, then fail the rest
    /// with `StorageError::Unavailable`. `None` disables the failure.
    pub async fn fail_shopping_list_writes_after(&self, successful: Option<usize>) {
        self.state.write().await.shopping_list_writes_remaining = successful;
    }
}

#[async_trait]
impl CustomerDataLayer for InMemoryCustomerDataLayer {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Customer>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .by_external_id
            .get(external_id)
            .and_then(|id| state.load(id)))
    }

    async fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> Result<Option<Customer>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .by_company_number
            .get(company_number)
            .and_then(|id| state.load(id)))
    }

    async fn find_by_master_external_id(
        &self,
        master_external_id: &ExternalId,
    ) -> Result<Option<Customer>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .by_master_external_id
            .get(master_external_id)
            .and_then(|siblings| siblings.first())
            .and_then(|id| state.load(id)))
    }

    async fn create_customer_record(&self, customer: Customer) -> Result<Customer, StorageError> {
        let mut state = self.state.write().await;
        state.check_customer_write()?;

        let internal_id = match customer.internal_id.clone() {
            Some(id) if state.customers.contains_key(&id) => {
                return Err(StorageError::Conflict(format!(
                    "customer {id} already exists"
                )));
            }
            Some(id) => id,
            None => state.allocate_customer_id(),
        };

        let record = CustomerRecord::from_customer(internal_id.clone(), customer);
        state.check_unique(&record)?;
        state.index(&record);
        state.customers.insert(internal_id.clone(), record);

        state.load(&internal_id).ok_or_else(|| {
            StorageError::DataCorruption(format!("customer {internal_id} missing after insert"))
        })
    }

    async fn update_customer_record(
        &self,
        customer: Customer,
    ) -> Result<Option<Customer>, StorageError> {
        let mut state = self.state.write().await;
        state.check_customer_write()?;

        let Some(internal_id) = customer.internal_id.clone() else {
            return Ok(None);
        };
        let Some(previous) = state.customers.get(&internal_id).cloned() else {
            return Ok(None);
        };

        let record = CustomerRecord::from_customer(internal_id.clone(), customer);
        state.check_unique(&record)?;
        state.unindex(&previous);
        state.index(&record);
        state.customers.insert(internal_id.clone(), record);

        Ok(state.load(&internal_id))
    }

    async fn update_shopping_list(
        &self,
        shopping_list: ShoppingList,
    ) -> Result<ShoppingList, StorageError> {
        let mut state = self.state.write().await;

        let customer_id = shopping_list.customer_internal_id.ok_or_else(|| {
            StorageError::Conflict("shopping list has no owning customer".to_owned())
        })?;
        if !state.customers.contains_key(&customer_id) {
            return Err(StorageError::UnknownCustomer(customer_id));
        }
        state.check_shopping_list_write()?;

        let internal_id = match shopping_list.internal_id {
            Some(id) => id,
            None => state.allocate_shopping_list_id(),
        };

        let previous_owner = state
            .shopping_lists
            .get(&internal_id)
            .map(|record| record.customer_id.clone());
        match previous_owner {
            Some(owner) if owner == customer_id => {}
            Some(owner) => {
                if let Some(lists) = state.lists_by_customer.get_mut(&owner) {
                    lists.retain(|id| *id != internal_id);
                }
                state
                    .lists_by_customer
                    .entry(customer_id.clone())
                    .or_default()
                    .push(internal_id.clone());
            }
            None => state
                .lists_by_customer
                .entry(customer_id.clone())
                .or_default()
                .push(internal_id.clone()),
        }

        let record = ShoppingListRecord {
            internal_id: internal_id.clone(),
            customer_id,
            products: shopping_list.products,
        };
        let stored = record.to_entity();
        state.shopping_lists.insert(internal_id, record);

        Ok(stored)
    }
}

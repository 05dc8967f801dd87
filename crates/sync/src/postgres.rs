//! `PostgreSQL` [`CustomerDataLayer`] backend.
//!
//! # Schema: `customer_sync`
//!
//! ## Tables
//!
//! - `customer` - Internal customer records. Unique indexes on `external_id`
//!   and `company_number`, plain index on `master_external_id`
//! - `shopping_list` - Shopping lists, each owned by one customer
//!
//! A CHECK constraint keeps `customer_type` consistent with `company_number`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/sync/migrations/` and run via:
//! ```bash
//! cargo run -p customer-sync-cli -- migrate
//! ```
//!
//! Queries are checked at runtime rather than with `query!` so the crate
//! builds without a live database.

use async_trait::async_trait;
use customer_sync_core::{
    Address, CompanyNumber, Customer, CustomerId, CustomerType, ExternalId, ShoppingList,
    ShoppingListId,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::data_layer::CustomerDataLayer;
use crate::error::StorageError;

/// Embedded migrations for the `customer_sync` schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

macro_rules! customer_columns {
    () => {
        "internal_id, external_id, master_external_id, street, city, postal_code, \
         preferred_store, name, customer_type, company_number"
    };
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &SyncConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    internal_id: CustomerId,
    external_id: Option<ExternalId>,
    master_external_id: Option<ExternalId>,
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    preferred_store: Option<String>,
    name: Option<String>,
    customer_type: Option<CustomerType>,
    company_number: Option<CompanyNumber>,
}

impl CustomerRow {
    fn into_customer(self, shopping_lists: Vec<ShoppingList>) -> Result<Customer, StorageError> {
        let address = match (self.street, self.city, self.postal_code) {
            (Some(street), Some(city), Some(postal_code)) => {
                Some(Address::new(street, city, postal_code))
            }
            (None, None, None) => None,
            _ => {
                return Err(StorageError::DataCorruption(format!(
                    "customer {} has a partial address",
                    self.internal_id
                )));
            }
        };

        Ok(Customer {
            external_id: self.external_id,
            master_external_id: self.master_external_id,
            address,
            preferred_store: self.preferred_store,
            internal_id: Some(self.internal_id),
            name: self.name,
            customer_type: self.customer_type,
            company_number: self.company_number,
            shopping_lists,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShoppingListRow {
    internal_id: ShoppingListId,
    customer_internal_id: CustomerId,
    products: Vec<String>,
}

impl From<ShoppingListRow> for ShoppingList {
    fn from(row: ShoppingListRow) -> Self {
        Self {
            internal_id: Some(row.internal_id),
            customer_internal_id: Some(row.customer_internal_id),
            products: row.products,
        }
    }
}

/// Map a write error, translating constraint violations.
fn map_write_error(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StorageError::Conflict(db_err.message().to_owned());
    }
    StorageError::Database(e)
}

/// A [`CustomerDataLayer`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCustomerDataLayer {
    pool: PgPool,
}

impl PgCustomerDataLayer {
    /// Create a data layer over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the connection cannot be established.
    pub async fn connect(config: &SyncConfig) -> Result<Self, StorageError> {
        Ok(Self::new(create_pool(config).await?))
    }

    /// Run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if a migration fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable(format!("migration failed: {e}")))
    }

    async fn shopping_lists_of(&self, id: &CustomerId) -> Result<Vec<ShoppingList>, StorageError> {
        let rows = sqlx::query_as::<_, ShoppingListRow>(
            r"
            SELECT internal_id, customer_internal_id, products
            FROM customer_sync.shopping_list
            WHERE customer_internal_id = $1
            ORDER BY created_seq
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShoppingList::from).collect())
    }

    async fn load(&self, row: Option<CustomerRow>) -> Result<Option<Customer>, StorageError> {
        match row {
            Some(row) => {
                let lists = self.shopping_lists_of(&row.internal_id).await?;
                Ok(Some(row.into_customer(lists)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CustomerDataLayer for PgCustomerDataLayer {
    #[instrument(skip_all, fields(external_id = %external_id))]
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Customer>, StorageError> {
        let row = sqlx::query_as::<_, CustomerRow>(concat!(
            "SELECT ",
            customer_columns!(),
            " FROM customer_sync.customer WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        self.load(row).await
    }

    #[instrument(skip_all, fields(company_number = %company_number))]
    async fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> Result<Option<Customer>, StorageError> {
        let row = sqlx::query_as::<_, CustomerRow>(concat!(
            "SELECT ",
            customer_columns!(),
            " FROM customer_sync.customer WHERE company_number = $1"
        ))
        .bind(company_number)
        .fetch_optional(&self.pool)
        .await?;

        self.load(row).await
    }

    #[instrument(skip_all, fields(master_external_id = %master_external_id))]
    async fn find_by_master_external_id(
        &self,
        master_external_id: &ExternalId,
    ) -> Result<Option<Customer>, StorageError> {
        let row = sqlx::query_as::<_, CustomerRow>(concat!(
            "SELECT ",
            customer_columns!(),
            " FROM customer_sync.customer WHERE master_external_id = $1",
            " ORDER BY created_seq LIMIT 1"
        ))
        .bind(master_external_id)
        .fetch_optional(&self.pool)
        .await?;

        self.load(row).await
    }

    #[instrument(skip_all)]
    async fn create_customer_record(&self, customer: Customer) -> Result<Customer, StorageError> {
        let internal_id = customer
            .internal_id
            .clone()
            .unwrap_or_else(|| CustomerId::new(Uuid::new_v4().to_string()));
        let address = customer.address.as_ref();

        let row = sqlx::query_as::<_, CustomerRow>(concat!(
            "INSERT INTO customer_sync.customer (",
            customer_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING ",
            customer_columns!()
        ))
        .bind(&internal_id)
        .bind(&customer.external_id)
        .bind(&customer.master_external_id)
        .bind(address.map(Address::street))
        .bind(address.map(Address::city))
        .bind(address.map(Address::postal_code))
        .bind(&customer.preferred_store)
        .bind(&customer.name)
        .bind(customer.customer_type)
        .bind(&customer.company_number)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        let lists = self.shopping_lists_of(&row.internal_id).await?;
        row.into_customer(lists)
    }

    #[instrument(skip_all, fields(internal_id = ?customer.internal_id))]
    async fn update_customer_record(
        &self,
        customer: Customer,
    ) -> Result<Option<Customer>, StorageError> {
        let Some(internal_id) = &customer.internal_id else {
            return Ok(None);
        };
        let address = customer.address.as_ref();

        let row = sqlx::query_as::<_, CustomerRow>(concat!(
            r"
            UPDATE customer_sync.customer
            SET external_id = $2,
                master_external_id = $3,
                street = $4,
                city = $5,
                postal_code = $6,
                preferred_store = $7,
                name = $8,
                customer_type = $9,
                company_number = $10
            WHERE internal_id = $1
            RETURNING ",
            customer_columns!()
        ))
        .bind(internal_id)
        .bind(&customer.external_id)
        .bind(&customer.master_external_id)
        .bind(address.map(Address::street))
        .bind(address.map(Address::city))
        .bind(address.map(Address::postal_code))
        .bind(&customer.preferred_store)
        .bind(&customer.name)
        .bind(customer.customer_type)
        .bind(&customer.company_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        self.load(row).await
    }

    #[instrument(skip_all, fields(internal_id = ?shopping_list.internal_id))]
    async fn update_shopping_list(
        &self,
        shopping_list: ShoppingList,
    ) -> Result<ShoppingList, StorageError> {
        let customer_id = shopping_list.customer_internal_id.ok_or_else(|| {
            StorageError::Conflict("shopping list has no owning customer".to_owned())
        })?;
        let internal_id = shopping_list
            .internal_id
            .unwrap_or_else(|| ShoppingListId::new(Uuid::new_v4().to_string()));

        let row = sqlx::query_as::<_, ShoppingListRow>(
            r"
            INSERT INTO customer_sync.shopping_list (internal_id, customer_internal_id, products)
            VALUES ($1, $2, $3)
            ON CONFLICT (internal_id) DO UPDATE
            SET customer_internal_id = EXCLUDED.customer_internal_id,
                products = EXCLUDED.products
            RETURNING internal_id, customer_internal_id, products
            ",
        )
        .bind(&internal_id)
        .bind(&customer_id)
        .bind(&shopping_list.products)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return StorageError::UnknownCustomer(customer_id.clone());
            }
            map_write_error(e)
        })?;

        Ok(row.into())
    }
}

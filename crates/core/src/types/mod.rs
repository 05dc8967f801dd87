//! Core types for customer sync.
//!
//! This module provides type-safe wrappers and records for the customer domain.

pub mod address;
pub mod company_number;
pub mod customer;
pub mod customer_type;
pub mod external;
pub mod id;
pub mod shopping_list;

pub use address::Address;
pub use company_number::{CompanyNumber, CompanyNumberError};
pub use customer::Customer;
pub use customer_type::CustomerType;
pub use external::ExternalCustomer;
pub use id::*;
pub use shopping_list::ShoppingList;

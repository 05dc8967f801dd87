//! Customer Sync Core - Shared types library.
//!
//! This crate provides the record shapes used across the customer sync
//! workspace:
//! - `customer-sync` - Identity resolution, merging, and shopping list sync
//! - `customer-sync-cli` - Command-line tools for migrations and one-off syncs
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! lookups. This keeps it lightweight and allows any storage backend to depend
//! on it.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, company numbers, addresses, shopping lists, and the
//!   internal/external customer records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

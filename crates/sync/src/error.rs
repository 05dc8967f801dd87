//! Error types for customer sync.
//!
//! [`StorageError`] is what a [`CustomerDataLayer`](crate::CustomerDataLayer)
//! backend reports. [`SyncError`] is what callers of
//! [`CustomerSync`](crate::CustomerSync) see; storage errors pass through it
//! unchanged.

use customer_sync_core::{CustomerId, ExternalId};
use thiserror::Error;

/// Errors that can occur inside a data layer backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from sqlx.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., duplicate external ID).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A shopping list referenced a customer that does not exist.
    #[error("unknown customer: {0}")]
    UnknownCustomer(CustomerId),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while syncing one external customer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Identity resolution found conflicting candidates. Nothing was written.
    #[error("ambiguous match for external customer {external_id}: {reason}")]
    AmbiguousMatch {
        external_id: ExternalId,
        reason: String,
    },

    /// The matched customer disappeared before it could be updated.
    #[error("customer {internal_id} vanished before it could be updated")]
    LostRecord { internal_id: CustomerId },

    /// The data layer failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// Create an ambiguous match error.
    pub fn ambiguous(external_id: &ExternalId, reason: impl Into<String>) -> Self {
        Self::AmbiguousMatch {
            external_id: external_id.clone(),
            reason: reason.into(),
        }
    }

    /// Whether this is an ambiguous identity match.
    #[must_use]
    pub const fn is_ambiguous_match(&self) -> bool {
        matches!(self, Self::AmbiguousMatch { .. })
    }

    /// Whether this is a lost record.
    #[must_use]
    pub const fn is_lost_record(&self) -> bool {
        matches!(self, Self::LostRecord { .. })
    }

    /// Whether this is a storage failure.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_names_external_id() {
        let err = SyncError::ambiguous(&ExternalId::new("12345"), "two candidates");
        assert!(err.is_ambiguous_match());
        assert_eq!(
            err.to_string(),
            "ambiguous match for external customer 12345: two candidates"
        );
    }

    #[test]
    fn test_storage_error_passes_through() {
        let err: SyncError = StorageError::Unavailable("connection reset".to_owned()).into();
        assert!(err.is_storage());
        assert_eq!(
            err.to_string(),
            "storage failure: storage unavailable: connection reset"
        );
    }

    #[test]
    fn test_lost_record() {
        let err = SyncError::LostRecord {
            internal_id: CustomerId::new("45435"),
        };
        assert!(err.is_lost_record());
        assert!(!err.is_storage());
    }
}

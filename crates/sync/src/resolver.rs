//! Identity resolution: which internal customer, if any, an external customer is.
//!
//! Lookups run in priority order and the first hit wins:
//!
//! 1. external ID (always)
//! 2. company number, for companies
//! 3. master external ID, for sub-accounts
//!
//! A hit is only accepted if it does not contradict the other identity data
//! carried by the external customer. Contradictions fail with
//! [`SyncError::AmbiguousMatch`] instead of picking one of the candidates.

use customer_sync_core::{CompanyNumber, Customer, ExternalCustomer, ExternalId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ResolutionPolicy;
use crate::data_layer::CustomerDataLayer;
use crate::error::{SyncError, SyncResult};

/// Which lookup produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    ExternalId,
    CompanyNumber,
    MasterExternalId,
}

impl std::fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExternalId => write!(f, "external_id"),
            Self::CompanyNumber => write!(f, "company_number"),
            Self::MasterExternalId => write!(f, "master_external_id"),
        }
    }
}

/// An internal customer matched to an external one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMatch {
    pub customer: Customer,
    pub matched_by: MatchedBy,
}

/// Resolves external customers against a data layer.
pub struct IdentityResolver<'a> {
    data_layer: &'a dyn CustomerDataLayer,
    policy: ResolutionPolicy,
}

impl<'a> IdentityResolver<'a> {
    /// Create a new resolver.
    #[must_use]
    pub const fn new(data_layer: &'a dyn CustomerDataLayer, policy: ResolutionPolicy) -> Self {
        Self { data_layer, policy }
    }

    /// Find the internal customer matching `external`.
    ///
    /// Returns `Ok(None)` when the external customer is new. Performs reads
    /// only, so repeating a resolution against unchanged data yields the same
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::AmbiguousMatch` if lookups disagree about the
    /// customer's identity, or `SyncError::Storage` if a lookup fails.
    pub async fn resolve(&self, external: &ExternalCustomer) -> SyncResult<Option<IdentityMatch>> {
        if let Some(customer) = self
            .data_layer
            .find_by_external_id(&external.external_id)
            .await?
        {
            self.verify_external_id_match(external, &customer).await?;
            debug!(internal_id = ?customer.internal_id, "matched by external id");
            return Ok(Some(IdentityMatch {
                customer,
                matched_by: MatchedBy::ExternalId,
            }));
        }

        if self.policy.match_company_number
            && let Some(company_number) = &external.company_number
            && let Some(customer) = self.find_company(external, company_number).await?
        {
            debug!(internal_id = ?customer.internal_id, "matched by company number");
            return Ok(Some(IdentityMatch {
                customer,
                matched_by: MatchedBy::CompanyNumber,
            }));
        }

        if self.policy.match_master_external_id
            && let Some(master_external_id) = &external.master_external_id
            && let Some(customer) = self.find_sub_account(master_external_id).await?
        {
            debug!(internal_id = ?customer.internal_id, "matched by master external id");
            return Ok(Some(IdentityMatch {
                customer,
                matched_by: MatchedBy::MasterExternalId,
            }));
        }

        debug!("no internal customer matches");
        Ok(None)
    }

    /// Reject an external ID match whose company identity disagrees with the
    /// incoming company number.
    async fn verify_external_id_match(
        &self,
        external: &ExternalCustomer,
        customer: &Customer,
    ) -> SyncResult<()> {
        let Some(incoming) = &external.company_number else {
            return Ok(());
        };

        if let Some(stored) = &customer.company_number
            && stored != incoming
        {
            warn!(
                internal_id = ?customer.internal_id,
                stored = %stored,
                incoming = %incoming,
                "company number mismatch on external id match"
            );
            return Err(SyncError::ambiguous(
                &external.external_id,
                format!(
                    "customer {} has company number {stored}, external customer has {incoming}",
                    display_id(customer)
                ),
            ));
        }

        if !self.policy.match_company_number {
            return Ok(());
        }

        if let Some(other) = self.find_company(external, incoming).await?
            && other.internal_id != customer.internal_id
        {
            warn!(
                by_external_id = ?customer.internal_id,
                by_company_number = ?other.internal_id,
                "external id and company number match different customers"
            );
            return Err(SyncError::ambiguous(
                &external.external_id,
                format!(
                    "external id matches customer {} but company number {incoming} matches customer {}",
                    display_id(customer),
                    display_id(&other)
                ),
            ));
        }

        Ok(())
    }

    async fn find_company(
        &self,
        external: &ExternalCustomer,
        company_number: &CompanyNumber,
    ) -> SyncResult<Option<Customer>> {
        let found = self
            .data_layer
            .find_by_company_number(company_number)
            .await?;

        if let Some(customer) = &found
            && customer.company_number.as_ref() != Some(company_number)
        {
            warn!(
                internal_id = ?customer.internal_id,
                "company number lookup returned a different company number"
            );
            return Err(SyncError::ambiguous(
                &external.external_id,
                format!(
                    "lookup by company number {company_number} returned customer {} with company number {}",
                    display_id(customer),
                    customer
                        .company_number
                        .as_ref()
                        .map_or("<none>", CompanyNumber::as_str)
                ),
            ));
        }

        Ok(found)
    }

    async fn find_sub_account(
        &self,
        master_external_id: &ExternalId,
    ) -> SyncResult<Option<Customer>> {
        Ok(self
            .data_layer
            .find_by_master_external_id(master_external_id)
            .await?)
    }
}

fn display_id(customer: &Customer) -> &str {
    customer
        .internal_id
        .as_ref()
        .map_or("<unsaved>", |id| id.as_str())
}

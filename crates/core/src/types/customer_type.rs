//! Customer classification.

use serde::{Deserialize, Serialize};

use super::CompanyNumber;

/// Whether a customer is a private person or a company.
///
/// Never stored independently of the company number: a customer is a
/// `Company` exactly when it has a [`CompanyNumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(
        type_name = "customer_sync.customer_type",
        rename_all = "SCREAMING_SNAKE_CASE"
    )
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    /// A private individual.
    Person,
    /// A registered business, identified by its company number.
    Company,
}

impl CustomerType {
    /// Derive the customer type from company number presence.
    #[must_use]
    pub const fn for_company_number(company_number: Option<&CompanyNumber>) -> Self {
        if company_number.is_some() {
            Self::Company
        } else {
            Self::Person
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person => write!(f, "PERSON"),
            Self::Company => write!(f, "COMPANY"),
        }
    }
}

impl std::str::FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSON" => Ok(Self::Person),
            "COMPANY" => Ok(Self::Company),
            _ => Err(format!("invalid customer type: {s}")),
        }
    }
}

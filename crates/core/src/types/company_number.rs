//! Business registry number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CompanyNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompanyNumberError {
    /// The input string is empty (after trimming).
    #[error("company number cannot be empty")]
    Empty,
}

/// A business registry number, present only for companies.
///
/// The presence of a company number is what makes a customer a
/// [`CustomerType::Company`](crate::CustomerType::Company). Registry formats
/// differ per country, so the value is otherwise opaque.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Must not be empty after trimming
///
/// ## Examples
///
/// ```
/// use customer_sync_core::CompanyNumber;
///
/// assert!(CompanyNumber::parse("470813-8895").is_ok());
/// assert!(CompanyNumber::parse("12.345.678/0001-90").is_ok());
/// assert_eq!(CompanyNumber::parse("  SE 5568 ").unwrap().as_str(), "SE 5568");
///
/// assert!(CompanyNumber::parse("").is_err());
/// assert!(CompanyNumber::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyNumber(String);

impl CompanyNumber {
    /// Parse a `CompanyNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNumberError::Empty` if the input is empty or only
    /// whitespace.
    pub fn parse(s: &str) -> Result<Self, CompanyNumberError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(CompanyNumberError::Empty);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the company number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CompanyNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CompanyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CompanyNumber {
    type Err = CompanyNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CompanyNumber {
    type Error = CompanyNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CompanyNumber> for String {
    fn from(value: CompanyNumber) -> Self {
        value.0
    }
}

impl AsRef<str> for CompanyNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CompanyNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CompanyNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CompanyNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

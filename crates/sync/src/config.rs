//! Customer sync configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (for the `PostgreSQL` backend)
//! - `CUSTOMER_SYNC_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CUSTOMER_SYNC_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `CUSTOMER_SYNC_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 10)
//! - `CUSTOMER_SYNC_MATCH_COMPANY_NUMBER` - Match companies by company number (default: true)
//! - `CUSTOMER_SYNC_MATCH_MASTER_EXTERNAL_ID` - Match sub-accounts by master external ID (default: true)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which lookups the identity resolver may use after an external ID miss.
///
/// The external ID lookup is always performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPolicy {
    /// Match companies by company number.
    pub match_company_number: bool,
    /// Match sub-accounts by master external ID.
    pub match_master_external_id: bool,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            match_company_number: true,
            match_master_external_id: true,
        }
    }
}

/// Customer sync configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct SyncConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
    /// Identity resolution lookups to enable
    pub resolution: ResolutionPolicy,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or a numeric or
    /// boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`SyncConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("CUSTOMER_SYNC_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("CUSTOMER_SYNC_DATABASE_URL".to_string()))?;

        let max_connections = parse_or_default(&lookup, "CUSTOMER_SYNC_MAX_CONNECTIONS", 10_u32)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CUSTOMER_SYNC_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let acquire_timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "CUSTOMER_SYNC_ACQUIRE_TIMEOUT_SECS",
            10_u64,
        )?);

        let resolution = ResolutionPolicy {
            match_company_number: parse_bool_or_default(
                &lookup,
                "CUSTOMER_SYNC_MATCH_COMPANY_NUMBER",
                true,
            )?,
            match_master_external_id: parse_bool_or_default(
                &lookup,
                "CUSTOMER_SYNC_MATCH_MASTER_EXTERNAL_ID",
                true,
            )?,
        };

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout,
            resolution,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable with `FromStr`, falling back to a default when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`).
fn parse_bool_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            SyncConfig::from_lookup(lookup_from(&[("CUSTOMER_SYNC_DATABASE_URL", "postgres://x")]))
                .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://x");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
        assert_eq!(config.resolution, ResolutionPolicy::default());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = SyncConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://fly")])).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly");
    }

    #[test]
    fn test_missing_database_url() {
        let err = SyncConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_policy_flags() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("CUSTOMER_SYNC_DATABASE_URL", "postgres://x"),
            ("CUSTOMER_SYNC_MATCH_COMPANY_NUMBER", "no"),
            ("CUSTOMER_SYNC_MATCH_MASTER_EXTERNAL_ID", "0"),
        ]))
        .unwrap();
        assert!(!config.resolution.match_company_number);
        assert!(!config.resolution.match_master_external_id);
    }

    #[test]
    fn test_invalid_values() {
        let err = SyncConfig::from_lookup(lookup_from(&[
            ("CUSTOMER_SYNC_DATABASE_URL", "postgres://x"),
            ("CUSTOMER_SYNC_MAX_CONNECTIONS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CUSTOMER_SYNC_MAX_CONNECTIONS"));

        let err = SyncConfig::from_lookup(lookup_from(&[
            ("CUSTOMER_SYNC_DATABASE_URL", "postgres://x"),
            ("CUSTOMER_SYNC_MATCH_COMPANY_NUMBER", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = SyncConfig::from_lookup(lookup_from(&[
            ("CUSTOMER_SYNC_DATABASE_URL", "postgres://x"),
            ("CUSTOMER_SYNC_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = SyncConfig::from_lookup(lookup_from(&[(
            "CUSTOMER_SYNC_DATABASE_URL",
            "postgres://user:hunter2@db",
        )]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}

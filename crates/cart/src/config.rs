//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROCKETSHOES_API_URL` - Base URL of the product/stock API (e.g., `http://localhost:3333`)
//!
//! ## Optional
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the API
//! - `ROCKETSHOES_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product metadata cache TTL (default: 60).
//!   Title, price and image are copied from the cache when a product gets a new
//!   line, so a product removed and re-added within the TTL keeps the metadata
//!   it had when first fetched. Set to 0 to always fetch fresh metadata.
//! - `ROCKETSHOES_STORAGE_PATH` - Snapshot storage file (default: `.rocketshoes/storage.json`)
//! - `ROCKETSHOES_STORAGE_KEY` - Key the cart snapshot is stored under (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_CURRENCY` - Display currency (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rocketshoes_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::store::DEFAULT_STORAGE_KEY;

const DEFAULT_API_TIMEOUT_SECS: &str = "10";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: &str = "60";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Product/stock API configuration
    pub api: StockApiConfig,
    /// File backing the persistent key-value store
    pub storage_path: PathBuf,
    /// Key the cart snapshot is stored under
    pub storage_key: String,
    /// Currency used when displaying prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Product/stock API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct StockApiConfig {
    /// Base URL; always ends with `/` so endpoint paths join beneath it
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product metadata stays cached (stock is never cached)
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for StockApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = StockApiConfig::from_env()?;
        let storage_path = PathBuf::from(get_env_or_default(
            "ROCKETSHOES_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let storage_key = get_env_or_default("ROCKETSHOES_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        let currency = parse_env::<CurrencyCode>(
            "ROCKETSHOES_CURRENCY",
            &get_env_or_default("ROCKETSHOES_CURRENCY", "USD"),
        )?;

        Ok(Self {
            api,
            storage_path,
            storage_key,
            currency,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl StockApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &get_required_env("ROCKETSHOES_API_URL")?,
        )?;
        let timeout = parse_secs(
            "ROCKETSHOES_API_TIMEOUT_SECS",
            &get_env_or_default("ROCKETSHOES_API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS),
        )?;
        let product_cache_ttl = parse_secs(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            &get_env_or_default(
                "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
                DEFAULT_PRODUCT_CACHE_TTL_SECS,
            ),
        )?;

        Ok(Self {
            base_url,
            token: get_optional_env("ROCKETSHOES_API_TOKEN").map(SecretString::from),
            timeout,
            product_cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a value with `FromStr`, naming the variable on failure.
fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    parse_env::<u64>(key, value.trim()).map(Duration::from_secs)
}

/// Parse the API base URL, forcing a trailing slash so `Url::join` keeps the path.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = parse_env::<Url>(key, value.trim())?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("TEST_URL", "http://localhost:3333").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/");

        let url = parse_base_url("TEST_URL", "https://api.example.com/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            url.join("stock/7").unwrap().as_str(),
            "https://api.example.com/v1/stock/7"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_invalid() {
        let result = parse_base_url("TEST_URL", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "TEST_URL"));

        let result = parse_base_url("TEST_URL", "mailto:shop@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(
            parse_secs("TEST_SECS", " 15 ").unwrap(),
            Duration::from_secs(15)
        );
        assert!(parse_secs("TEST_SECS", "-1").is_err());
        assert!(parse_secs("TEST_SECS", "soon").is_err());
    }

    #[test]
    fn test_default_product_cache_ttl_is_one_minute() {
        let ttl = parse_secs("TEST_TTL", DEFAULT_PRODUCT_CACHE_TTL_SECS).unwrap();
        assert_eq!(ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_currency() {
        let currency = parse_env::<CurrencyCode>("TEST_CURRENCY", "brl").unwrap();
        assert_eq!(currency, CurrencyCode::BRL);

        let err = parse_env::<CurrencyCode>("TEST_CURRENCY", "doubloons").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid environment variable TEST_CURRENCY: unsupported currency code: doubloons"
        );
    }

    #[test]
    fn test_missing_env_var_message() {
        let err = get_required_env("ROCKETSHOES_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: ROCKETSHOES_TEST_SURELY_UNSET_VARIABLE"
        );
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = StockApiConfig {
            base_url: Url::parse("http://localhost:3333/").unwrap(),
            token: Some(SecretString::from("super_secret_api_token")),
            timeout: Duration::from_secs(10),
            product_cache_ttl: Duration::from_secs(300),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:3333"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_token"));
    }
}

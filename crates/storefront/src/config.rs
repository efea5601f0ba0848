//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `VENDURE_REVALIDATION_SECRET` - Shared secret for the revalidation webhook (high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_SITE_NAME` - Store name shown in page titles (default: Vendure Store)
//! - `VENDURE_SHOP_API_URL` - Shop API endpoint (default: <https://readonlydemo.vendure.io/shop-api>)
//! - `VENDURE_CHANNEL_TOKEN` - Channel token sent as `vendure-token`
//! - `VENDURE_CHECKOUT_URL` - External checkout page; the order code is appended
//! - `VENDURE_CACHE_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SHOP_API_URL: &str = "https://readonlydemo.vendure.io/shop-api";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Store name shown in titles and the header
    pub site_name: String,
    /// Vendure Shop API configuration
    pub vendure: VendureConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Vendure Shop API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct VendureConfig {
    /// Shop API GraphQL endpoint
    pub shop_api_url: String,
    /// Channel token sent with every request (empty for the default channel)
    pub channel_token: String,
    /// External checkout page, if checkout is not handled by this site
    pub checkout_url: Option<String>,
    /// Shared secret expected on `/api/revalidate`
    pub revalidation_secret: SecretString,
    /// How long catalog reads stay cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for VendureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendureConfig")
            .field("shop_api_url", &self.shop_api_url)
            .field("channel_token", &self.channel_token)
            .field("checkout_url", &self.checkout_url)
            .field("revalidation_secret", &"[REDACTED]")
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let site_name = get_env_or_default("STOREFRONT_SITE_NAME", "Vendure Store");

        let vendure = VendureConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            site_name,
            vendure,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl VendureConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let shop_api_url = get_env_or_default("VENDURE_SHOP_API_URL", DEFAULT_SHOP_API_URL);
        url::Url::parse(&shop_api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("VENDURE_SHOP_API_URL".to_string(), e.to_string())
        })?;

        let cache_ttl_secs = get_env_or_default("VENDURE_CACHE_TTL_SECS", "300")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VENDURE_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            shop_api_url,
            channel_token: get_env_or_default("VENDURE_CHANNEL_TOKEN", ""),
            checkout_url: get_optional_env("VENDURE_CHECKOUT_URL").filter(|u| !u.is_empty()),
            revalidation_secret: get_validated_secret("VENDURE_REVALIDATION_SECRET")?,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    /// Host serving Shop API assets, for the image CSP.
    #[must_use]
    pub fn asset_origin(&self) -> Option<String> {
        let url = url::Url::parse(&self.shop_api_url).ok()?;
        Some(url.origin().ascii_serialization())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

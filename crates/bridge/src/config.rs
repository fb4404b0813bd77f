//! Bridge configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BRIDGE_DATABASE_URL` - `PostgreSQL` connection string
//! - `PARTNER_STORE` - Partner store domain (e.g., pelican-post.myshopify.com)
//! - `PARTNER_ACCESS_TOKEN` - Partner store Admin API access token
//! - `MERCHANT_STORE` - Merchant store domain
//! - `MERCHANT_ACCESS_TOKEN` - Merchant store Admin API access token
//! - `SIMPLE_VARIANT_ID` - Variant billed for simple forwarding
//! - `SIGNATURE_VARIANT_ID` - Variant billed for signature forwarding
//!
//! ## Optional
//! - `BRIDGE_HOST` - Bind address (default: 127.0.0.1)
//! - `BRIDGE_PORT` - Listen port (default: 3002)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `PARTNER_WEBHOOK_SECRET` - Partner webhook signing secret; signature
//!   verification is skipped (with a warning) when absent
//! - `MERCHANT_WEBHOOK_SECRET` - Merchant webhook signing secret
//! - `NOTIFY_URL` - Internal backend notified when codes are issued
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins for `/api` routes
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use pelican_core::CodeKind;
use secrecy::SecretString;
use thiserror::Error;

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
    "insert",
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

/// Bridge application configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Partner store (customers, draft orders) API configuration
    pub partner: StoreConfig,
    /// Merchant store (paid orders, fulfillment holds) API configuration
    pub merchant: StoreConfig,
    /// Code kind to forwarding-product variant mapping
    pub variants: VariantMap,
    /// Internal backend notified when codes are issued (optional)
    pub notify_url: Option<String>,
    /// Origins allowed to call the public `/api` routes
    pub cors_allowed_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Admin API configuration for one store.
///
/// Implements `Debug` manually to redact the access token and webhook
/// secret.
#[derive(Clone)]
pub struct StoreConfig {
    /// Store domain (e.g., pelican-post.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// Webhook signing secret; `None` disables signature verification
    pub webhook_secret: Option<SecretString>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl StoreConfig {
    /// Load one store's configuration using the given env-var prefix
    /// (`PARTNER` or `MERCHANT`).
    fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let webhook_secret = get_optional_env(&format!("{prefix}_WEBHOOK_SECRET"));
        if webhook_secret.is_none() {
            tracing::warn!(
                "{prefix}_WEBHOOK_SECRET not set - webhook signature verification disabled for this store"
            );
        }

        Ok(Self {
            store: get_required_env(&format!("{prefix}_STORE"))?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            access_token: get_validated_secret(&format!("{prefix}_ACCESS_TOKEN"))?,
            webhook_secret: webhook_secret.map(SecretString::from),
        })
    }
}

/// Maps which code kind was presented at checkout to the forwarding-product
/// variant billed on the partner store.
///
/// Catalog variant ids change when products are recreated, so these live in
/// configuration rather than in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantMap {
    /// Variant for simple forwarding.
    pub simple: i64,
    /// Variant for signature-required forwarding.
    pub signature: i64,
}

impl VariantMap {
    /// Resolve the variant billed for the given code kind.
    #[must_use]
    pub const fn variant_for(&self, kind: CodeKind) -> i64 {
        match kind {
            CodeKind::SimpleCode => self.simple,
            CodeKind::SignatureCode => self.signature,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            simple: get_env_i64("SIMPLE_VARIANT_ID")?,
            signature: get_env_i64("SIGNATURE_VARIANT_ID")?,
        })
    }
}

impl BridgeConfig {
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

        let database_url = get_database_url("BRIDGE_DATABASE_URL")?;
        let host = get_env_or_default("BRIDGE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BRIDGE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BRIDGE_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BRIDGE_PORT".to_string(), e.to_string()))?;

        let partner = StoreConfig::from_env("PARTNER")?;
        let merchant = StoreConfig::from_env("MERCHANT")?;
        let variants = VariantMap::from_env()?;
        let notify_url = get_optional_env("NOTIFY_URL");

        let cors_allowed_origins = get_optional_env("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            partner,
            merchant,
            variants,
            notify_url,
            cors_allowed_origins,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required environment variable parsed as `i64`.
fn get_env_i64(key: &str) -> Result<i64, ConfigError> {
    get_required_env(key)?
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_uniform() {
        // All same character = 0 entropy; two equally frequent = 1 bit/char.
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-access-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("shpat_aB3xY9mK2nL5pQ7rT0uW4zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_variant_map_resolution() {
        let variants = VariantMap {
            simple: 45_912_383_422_713,
            signature: 45_912_390_435_065,
        };
        assert_eq!(
            variants.variant_for(CodeKind::SimpleCode),
            45_912_383_422_713
        );
        assert_eq!(
            variants.variant_for(CodeKind::SignatureCode),
            45_912_390_435_065
        );
    }

    #[test]
    fn test_store_config_debug_redacts_secrets() {
        let config = StoreConfig {
            store: "pelican-post.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            access_token: SecretString::from("shpat_super_private_token"),
            webhook_secret: Some(SecretString::from("whsec_private")),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("pelican-post.myshopify.com"));
        assert!(debug_output.contains("2026-01"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_private_token"));
        assert!(!debug_output.contains("whsec_private"));
    }

    #[test]
    fn test_socket_addr() {
        let config = BridgeConfig {
            database_url: SecretString::from("postgres://localhost/pelican"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3002,
            partner: StoreConfig {
                store: "pelican-post.myshopify.com".to_string(),
                api_version: "2026-01".to_string(),
                access_token: SecretString::from("shpat_partner"),
                webhook_secret: None,
            },
            merchant: StoreConfig {
                store: "merchant.myshopify.com".to_string(),
                api_version: "2026-01".to_string(),
                access_token: SecretString::from("shpat_merchant"),
                webhook_secret: None,
            },
            variants: VariantMap {
                simple: 1,
                signature: 2,
            },
            notify_url: None,
            cors_allowed_origins: vec![],
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3002);
    }
}

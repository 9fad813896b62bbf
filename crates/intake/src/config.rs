//! Intake configuration loaded from environment variables.
//!
//! Loaded once at process start and never mutated afterwards. Handlers reach
//! it through [`crate::state::AppState`].
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_SHOP_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_API_ACCESS_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `INTAKE_HOST` - Bind address (default: 127.0.0.1)
//! - `INTAKE_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2026-01)
//! - `SHOPIFY_API_KEY` - App API key
//! - `SHOPIFY_API_SECRET` - App API secret
//! - `SHOPIFY_ADMIN_API_BASE_URL` - Override for the Admin REST base URL (proxies, staging)
//! - `INTAKE_REQUIRE_SHOP` - Reject cart submissions without `shop` (default: false)
//! - `INTAKE_REQUIRE_TOTAL_PRICE` - Reject cart submissions without `total_price` (default: false)
//! - `INTAKE_CORS_MAX_AGE` - Preflight cache lifetime in seconds, 0 to omit (default: 86400)
//! - `INTAKE_CORS_ALLOW_CREDENTIALS` - Send `Access-Control-Allow-Credentials: true` (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use egpc_core::ValidationRules;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2026-01";
const DEFAULT_CORS_MAX_AGE_SECS: &str = "86400";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Order intake configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Checkout validation switches
    pub checkout: ValidationRules,
    /// CORS response headers
    pub cors: CorsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token and app secret.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub shop_domain: String,
    /// Admin API version (e.g., 2026-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// App API key
    pub api_key: Option<String>,
    /// App API secret
    pub api_secret: Option<SecretString>,
    /// Overrides `https://{shop_domain}/admin/api/{api_version}`
    pub api_base_url: Option<String>,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("shop_domain", &self.shop_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl ShopifyAdminConfig {
    /// Base URL for Admin REST calls, without a trailing slash.
    #[must_use]
    pub fn admin_base_url(&self) -> String {
        self.api_base_url.as_ref().map_or_else(
            || {
                format!(
                    "https://{}/admin/api/{}",
                    self.shop_domain, self.api_version
                )
            },
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Whether `shop` names the configured store.
    #[must_use]
    pub fn is_own_shop(&self, shop: &str) -> bool {
        normalize_shop_domain(shop).eq_ignore_ascii_case(&self.shop_domain)
    }

    fn from_env() -> Result<Self, ConfigError> {
        let api_secret = get_optional_env("SHOPIFY_API_SECRET")
            .map(|secret| {
                validate_secret_strength(&secret, "SHOPIFY_API_SECRET")?;
                Ok::<_, ConfigError>(SecretString::from(secret))
            })
            .transpose()?;

        Ok(Self {
            shop_domain: normalize_shop_domain(&get_required_env("SHOPIFY_SHOP_DOMAIN")?),
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: get_validated_secret("SHOPIFY_ADMIN_API_ACCESS_TOKEN")?,
            api_key: get_optional_env("SHOPIFY_API_KEY"),
            api_secret,
            api_base_url: get_optional_env("SHOPIFY_ADMIN_API_BASE_URL"),
        })
    }
}

/// CORS headers sent on every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsConfig {
    /// `Access-Control-Max-Age` in seconds; `None` omits the header.
    pub max_age_secs: Option<u64>,
    /// Send `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: Some(86_400),
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_age_secs = get_env_or_default("INTAKE_CORS_MAX_AGE", DEFAULT_CORS_MAX_AGE_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("INTAKE_CORS_MAX_AGE".to_string(), e.to_string())
            })?;

        Ok(Self {
            max_age_secs: (max_age_secs > 0).then_some(max_age_secs),
            allow_credentials: get_bool_env("INTAKE_CORS_ALLOW_CREDENTIALS")?,
        })
    }
}

impl IntakeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("INTAKE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("INTAKE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("INTAKE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("INTAKE_PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyAdminConfig::from_env()?;
        let checkout = ValidationRules {
            require_shop: get_bool_env("INTAKE_REQUIRE_SHOP")?,
            require_total_price: get_bool_env("INTAKE_REQUIRE_TOTAL_PRICE")?,
        };
        let cors = CorsConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            shopify,
            checkout,
            cors,
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

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a boolean flag; unset means `false`.
fn get_bool_env(key: &str) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(false), |value| parse_bool(key, &value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Strip scheme and trailing slashes from a shop domain.
fn normalize_shop_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_ascii_lowercase()
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    // Admin tokens (shpat_ + 32 hex chars) sit around 3.5 bits/char
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
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

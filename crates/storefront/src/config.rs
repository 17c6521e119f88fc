//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 3000)
//! - `BAZAAR_TOKEN_TTL_HOURS` - Token lifetime in hours (default: 24)
//! - `BAZAAR_ITEMS_PER_PAGE` - Listing page size (default: 9)
//! - `BAZAAR_CATALOG_CACHE_TTL_SECS` - Catalog snapshot cache TTL (default: 300)
//! - `BAZAAR_SEARCH_CACHE_TTL_SECS` - Search result cache TTL (default: 30)
//! - `BAZAAR_ADMIN_EMAIL` - Super admin login (default: admin@bazaar.local)
//! - `BAZAAR_ADMIN_PASSWORD` - Super admin password; no admin account without it
//! - `BAZAAR_GUEST_EMAIL` - Guest account login (default: guest@bazaar.local)
//! - `BAZAAR_GUEST_PASSWORD` - Guest account password (default: guest1234)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "xxx"];

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
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// How long issued tokens stay valid
    pub token_ttl: Duration,
    /// Products per listing page
    pub items_per_page: usize,
    /// Cache lifetimes
    pub cache: CacheConfig,
    /// Seeded accounts
    pub accounts: AccountsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Time-to-live settings for the catalog caches.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Products + categories snapshot
    pub catalog_ttl: Duration,
    /// Per-query search results
    pub search_ttl: Duration,
    /// Maximum number of cached search queries
    pub search_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            catalog_ttl: Duration::from_secs(300),
            search_ttl: Duration::from_secs(30),
            search_capacity: 50,
        }
    }
}

/// Accounts created when the store is seeded.
///
/// Implements `Debug` manually to redact passwords.
#[derive(Clone)]
pub struct AccountsConfig {
    /// Super admin email
    pub admin_email: String,
    /// Super admin password; the admin account is only seeded when set
    pub admin_password: Option<SecretString>,
    /// Guest ("explore the store") email
    pub guest_email: String,
    /// Guest password
    pub guest_password: SecretString,
}

impl std::fmt::Debug for AccountsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountsConfig")
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("guest_email", &self.guest_email)
            .field("guest_password", &"[REDACTED]")
            .finish()
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@bazaar.local".to_string(),
            admin_password: None,
            guest_email: "guest@bazaar.local".to_string(),
            guest_password: SecretString::from("guest1234"),
        }
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
    /// if the signing secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("BAZAAR_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_env_or("BAZAAR_PORT", 3000_u16)?;

        let jwt_secret = get_required_env("BAZAAR_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "BAZAAR_JWT_SECRET")?;

        let token_ttl_hours = parse_env_or("BAZAAR_TOKEN_TTL_HOURS", 24_u64)?;
        let items_per_page = parse_env_or("BAZAAR_ITEMS_PER_PAGE", 9_usize)?;
        if items_per_page == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_ITEMS_PER_PAGE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let defaults = CacheConfig::default();
        let cache = CacheConfig {
            catalog_ttl: Duration::from_secs(parse_env_or(
                "BAZAAR_CATALOG_CACHE_TTL_SECS",
                defaults.catalog_ttl.as_secs(),
            )?),
            search_ttl: Duration::from_secs(parse_env_or(
                "BAZAAR_SEARCH_CACHE_TTL_SECS",
                defaults.search_ttl.as_secs(),
            )?),
            search_capacity: defaults.search_capacity,
        };

        let account_defaults = AccountsConfig::default();
        let accounts = AccountsConfig {
            admin_email: get_env_or_default("BAZAAR_ADMIN_EMAIL", &account_defaults.admin_email),
            admin_password: get_optional_env("BAZAAR_ADMIN_PASSWORD").map(SecretString::from),
            guest_email: get_env_or_default("BAZAAR_GUEST_EMAIL", &account_defaults.guest_email),
            guest_password: get_optional_env("BAZAAR_GUEST_PASSWORD")
                .map_or(account_defaults.guest_password, SecretString::from),
        };

        Ok(Self {
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl: Duration::from_secs(token_ttl_hours * 3600),
            items_per_page,
            cache,
            accounts,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration with defaults and the given signing secret.
    ///
    /// Used by tests and tools that run the storefront in-process.
    #[must_use]
    pub fn with_secret(jwt_secret: &str) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            jwt_secret: SecretString::from(jwt_secret.to_string()),
            token_ttl: Duration::from_secs(24 * 3600),
            items_per_page: 9,
            cache: CacheConfig::default(),
            accounts: AccountsConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The signing secret as bytes.
    #[must_use]
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
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

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
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

    #[allow(clippy::cast_precision_loss)] // secret lengths are tiny
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject short, placeholder-looking or low-entropy signing secrets.
fn validate_jwt_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

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

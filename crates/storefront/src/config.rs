//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `OPEN_MARKET_API_URL` - Base URL of the Open Market REST API
//!   (default: `https://api.wenivops.co.kr/services/open-market`)
//! - `OPEN_MARKET_HOME` - Directory holding `session.json`
//!   (default: `$HOME/.open-market`)
//! - `OPEN_MARKET_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `OPEN_MARKET_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.wenivops.co.kr/services/open-market";

const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Directory for persisted client state
    pub home_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product reads stay cached
    pub product_cache_ttl: Duration,
}

impl ApiConfig {
    /// Settings for the given base URL with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("OPEN_MARKET_API_URL", base_url)?,
            timeout: Duration::from_secs(10),
            product_cache_ttl: Duration::from_secs(300),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("OPEN_MARKET_API_URL", DEFAULT_API_URL);
        Ok(Self {
            base_url: parse_base_url("OPEN_MARKET_API_URL", &base_url)?,
            timeout: Duration::from_secs(get_u64_or_default("OPEN_MARKET_TIMEOUT_SECS", 10)?),
            product_cache_ttl: Duration::from_secs(get_u64_or_default(
                "OPEN_MARKET_PRODUCT_CACHE_TTL_SECS",
                300,
            )?),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, or if neither
    /// `OPEN_MARKET_HOME` nor `HOME` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let home_dir = get_home_dir()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api,
            home_dir,
            sentry_dsn,
        })
    }

    /// Path of the persisted session file.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.home_dir.join(SESSION_FILE)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a numeric environment variable with a default value.
fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |v| {
        v.parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Resolve the state directory, falling back to `$HOME/.open-market`.
fn get_home_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = get_optional_env("OPEN_MARKET_HOME") {
        return Ok(PathBuf::from(dir));
    }
    get_optional_env("HOME")
        .map(|home| PathBuf::from(home).join(".open-market"))
        .ok_or_else(|| ConfigError::MissingEnvVar("OPEN_MARKET_HOME".to_string()))
}

/// Parse a base URL and make sure its path ends in `/`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

//! Open Market REST API client.
//!
//! # Architecture
//!
//! - Authenticated calls go through [`OpenMarketClient::authorized_request`],
//!   which attaches the bearer token and performs at most one token refresh.
//! - Public product reads use plain requests and are cached with `moka`.
//! - Credentials live in the [`Session`]; the client never holds tokens itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use open_market_storefront::api::OpenMarketClient;
//! use open_market_storefront::session::Session;
//!
//! let client = OpenMarketClient::new(&config.api, Session::in_memory())?;
//! let page = client.products(1).await?;
//! ```

mod accounts;
mod cache;
mod cart;
mod gateway;
mod products;

pub use accounts::UsernameAvailability;
pub use gateway::RequestOptions;

use std::sync::Arc;

use moka::future::Cache;
use open_market_core::SignupErrors;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ErrorKind;
use crate::session::{Session, StoreError};

use cache::{CacheKey, CacheValue};

/// Characters of a response body kept in errors and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Errors that can occur when talking to the Open Market API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No usable session; the caller must log in.
    #[error("Authentication required")]
    Unauthenticated,

    /// Login rejected.
    #[error("Username or password does not match")]
    InvalidCredentials,

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Signup rejected with field-keyed messages.
    #[error("Signup rejected: {0}")]
    FieldErrors(SignupErrors),

    /// Session store could not be read or written.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Category used to pick a user-facing message.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) => ErrorKind::Network,
            Self::Unauthenticated | Self::InvalidCredentials => ErrorKind::Authorization,
            Self::FieldErrors(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Parse(_) | Self::Status { .. } | Self::Store(_) | Self::Url(_) => {
                ErrorKind::Internal
            }
        }
    }
}

// =============================================================================
// OpenMarketClient
// =============================================================================

/// Client for the Open Market API.
///
/// Cloning is cheap; clones share the HTTP pool, the product cache and the
/// session.
#[derive(Clone)]
pub struct OpenMarketClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for OpenMarketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenMarketClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl OpenMarketClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("open-market/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.clone(),
                session,
                cache,
            }),
        })
    }

    /// The session this client reads credentials from.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Resolve an API path such as `/cart/3/` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not form a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Drop every cached product read. Called after a successful
    /// add-to-cart.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}

// =============================================================================
// Response handling
// =============================================================================

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Map a non-success response to an error, consuming it.
async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let path = response.url().path().to_string();
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(path),
        StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
        _ => {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                path = %path,
                body = %preview(&body),
                "Open Market API returned non-success status"
            );
            ApiError::Status {
                status: status.as_u16(),
                body: preview(&body),
            }
        }
    }
}

/// Require a success status and decode the body.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        error!(
            error = %e,
            body = %preview(&text),
            "Failed to parse Open Market API response"
        );
        ApiError::Parse(e)
    })
}

/// Require a success status and discard the body.
async fn expect_success(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(status_error(response).await)
    }
}

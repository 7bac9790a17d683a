//! Session credential access.
//!
//! All reads and writes of the login state go through [`Session`], which sits
//! over two stores: a persistent one holding the credential and a scoped one
//! holding navigation state that should not outlive the process (the
//! post-login return URL).
//!
//! # Keys
//!
//! | Store      | Key          | Value                          |
//! |------------|--------------|--------------------------------|
//! | persistent | `access`     | bearer token                   |
//! | persistent | `refresh`    | refresh token                  |
//! | persistent | `user`       | [`UserProfile`] as JSON        |
//! | persistent | `isLoggedIn` | `"true"` while logged in       |
//! | scoped     | `returnUrl`  | page to resume after login     |

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

use std::sync::Arc;

use open_market_core::{SessionCredential, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

/// Persistent key holding the access token.
pub const ACCESS_KEY: &str = "access";
/// Persistent key holding the refresh token.
pub const REFRESH_KEY: &str = "refresh";
/// Persistent key holding the cached profile.
pub const USER_KEY: &str = "user";
/// Persistent login flag.
pub const LOGGED_IN_KEY: &str = "isLoggedIn";
/// Scoped key holding the post-login return URL.
pub const RETURN_URL_KEY: &str = "returnUrl";

const CREDENTIAL_KEYS: [&str; 4] = [ACCESS_KEY, REFRESH_KEY, USER_KEY, LOGGED_IN_KEY];

/// Handle over the session stores. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Session {
    persistent: Arc<dyn KeyValueStore>,
    scoped: Arc<dyn KeyValueStore>,
}

impl Session {
    /// Create a session over the given stores.
    #[must_use]
    pub fn new(persistent: Arc<dyn KeyValueStore>, scoped: Arc<dyn KeyValueStore>) -> Self {
        Self { persistent, scoped }
    }

    /// A session backed entirely by memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// A session persisted to `store`, with process-scoped navigation state.
    #[must_use]
    pub fn persistent(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Arc::new(MemoryStore::new()))
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.persistent.get(key).filter(|v| !v.is_empty())
    }

    /// Stored access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.non_empty(ACCESS_KEY).map(SecretString::from)
    }

    /// Stored refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.non_empty(REFRESH_KEY).map(SecretString::from)
    }

    /// Cached profile of the logged-in user.
    ///
    /// A malformed profile is logged and treated as absent.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.non_empty(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed cached user profile");
                None
            }
        }
    }

    /// The full credential, when every part is present.
    #[must_use]
    pub fn credential(&self) -> Option<SessionCredential> {
        Some(SessionCredential {
            access: self.access_token()?,
            refresh: self.refresh_token()?,
            user: self.user()?,
        })
    }

    /// Whether the login flag is set.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.persistent.get(LOGGED_IN_KEY).as_deref() == Some("true")
    }

    /// Store a freshly issued credential and set the login flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn begin(&self, credential: &SessionCredential) -> Result<(), StoreError> {
        let user = serde_json::to_string(&credential.user).map_err(|source| {
            StoreError::Serialize {
                key: USER_KEY.to_string(),
                source,
            }
        })?;
        self.persistent
            .set(ACCESS_KEY, credential.access.expose_secret())?;
        self.persistent
            .set(REFRESH_KEY, credential.refresh.expose_secret())?;
        self.persistent.set(USER_KEY, &user)?;
        self.persistent.set(LOGGED_IN_KEY, "true")
    }

    /// Replace the access token after a refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_access_token(&self, access: &SecretString) -> Result<(), StoreError> {
        self.persistent.set(ACCESS_KEY, access.expose_secret())
    }

    /// Remove every credential key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.persistent.remove_all(&CREDENTIAL_KEYS)
    }

    /// Remember where to go after logging in.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn remember_return_url(&self, url: &str) -> Result<(), StoreError> {
        self.scoped.set(RETURN_URL_KEY, url)
    }

    /// The remembered return URL, left in place.
    #[must_use]
    pub fn peek_return_url(&self) -> Option<String> {
        self.scoped.get(RETURN_URL_KEY).filter(|v| !v.is_empty())
    }

    /// The remembered return URL, removed from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn take_return_url(&self) -> Result<Option<String>, StoreError> {
        let url = self.peek_return_url();
        self.scoped.remove(RETURN_URL_KEY)?;
        Ok(url)
    }
}

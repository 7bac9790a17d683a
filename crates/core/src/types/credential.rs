//! Session credential types.
//!
//! A logged-in session is an access/refresh token pair plus the cached user
//! profile returned by the login endpoint.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Account kind reported by the Open Market API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    /// A shopper account.
    Buyer,
    /// A store account.
    Seller,
}

/// Cached profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone number as submitted at signup (digits only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Buyer or seller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Access/refresh token pair plus cached profile.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone)]
pub struct SessionCredential {
    /// Short-lived bearer token.
    pub access: SecretString,
    /// Long-lived token used to obtain a new access token.
    pub refresh: SecretString,
    /// Cached profile.
    pub user: UserProfile,
}

impl SessionCredential {
    /// Create a credential from raw token strings.
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>, user: UserProfile) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: SecretString::from(refresh.into()),
            user,
        }
    }

    /// Whether both tokens are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access.expose_secret().is_empty() && !self.refresh.expose_secret().is_empty()
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            username: "buyer1".to_string(),
            name: Some("Kim".to_string()),
            phone_number: None,
            user_type: Some(UserType::Buyer),
        }
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let cred = SessionCredential::new("access-token-value", "refresh-token-value", profile());
        let debug_output = format!("{cred:?}");

        assert!(debug_output.contains("buyer1"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("access-token-value"));
        assert!(!debug_output.contains("refresh-token-value"));
    }

    #[test]
    fn test_profile_ignores_unknown_fields() {
        let json = r#"{"username":"seller9","name":"Store","user_type":"SELLER","id":3,"company":"x"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "seller9");
        assert_eq!(user.user_type, Some(UserType::Seller));
        assert_eq!(user.phone_number, None);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = profile();
        assert_eq!(user.display_name(), "Kim");
        user.name = Some("  ".to_string());
        assert_eq!(user.display_name(), "buyer1");
    }

    #[test]
    fn test_is_complete() {
        assert!(SessionCredential::new("a", "r", profile()).is_complete());
        assert!(!SessionCredential::new("a", "", profile()).is_complete());
    }
}

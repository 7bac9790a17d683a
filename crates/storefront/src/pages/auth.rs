//! Login and signup flows.

use open_market_core::{
    LoginForm, LoginFormError, SignupErrors, SignupForm, UserProfile, UsernameError,
    validate_username,
};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::api::{ApiError, OpenMarketClient, UsernameAvailability};
use crate::error::{ErrorKind, set_sentry_user};
use crate::session::{Session, StoreError};

/// Where to go when nothing better is known.
pub const HOME_PATH: &str = "/";

/// Targets that would bounce the user straight back into an auth page.
fn is_auth_page(target: &str) -> bool {
    target.contains("login") || target.contains("signup")
}

/// Pick the page to show after a successful login.
///
/// In order: the remembered return URL (consumed), a same-host referrer,
/// then [`HOME_PATH`]. Login and signup pages are never chosen.
///
/// # Errors
///
/// Returns an error if the return URL cannot be removed from the store.
pub fn resolve_post_login_target(
    session: &Session,
    referrer: Option<&str>,
    site_host: &str,
) -> Result<String, StoreError> {
    if let Some(url) = session.peek_return_url()
        && !is_auth_page(&url)
    {
        session.take_return_url()?;
        return Ok(url);
    }

    if let Some(referrer) = referrer
        && !is_auth_page(referrer)
        && Url::parse(referrer)
            .ok()
            .is_some_and(|url| url.host_str() == Some(site_host))
    {
        return Ok(referrer.to_string());
    }

    Ok(HOME_PATH.to_string())
}

/// Result of submitting the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Logged in; navigate to `redirect`.
    Success { user: UserProfile, redirect: String },
    /// A field is blank; nothing was sent.
    Invalid(LoginFormError),
    /// The server rejected the pair. The password has been cleared.
    Rejected,
}

/// Validate and submit the login form.
///
/// # Errors
///
/// Network and store failures. Blank fields and rejected credentials are
/// outcomes, not errors.
#[instrument(skip(client, form, referrer), fields(username = %form.username))]
pub async fn submit_login(
    client: &OpenMarketClient,
    form: &mut LoginForm,
    referrer: Option<&str>,
    site_host: &str,
) -> Result<LoginOutcome, ApiError> {
    if let Err(e) = form.validate() {
        debug!(error = %e, "Login form incomplete");
        return Ok(LoginOutcome::Invalid(e));
    }

    match client.login(form).await {
        Ok(user) => {
            set_sentry_user(&user.username);
            let redirect = resolve_post_login_target(client.session(), referrer, site_host)?;
            Ok(LoginOutcome::Success { user, redirect })
        }
        Err(ApiError::InvalidCredentials) => {
            form.reset_password();
            Ok(LoginOutcome::Rejected)
        }
        Err(e) => Err(e),
    }
}

/// Result of the "check availability" button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameCheck {
    Available,
    /// Taken, with the server's message.
    Taken(String),
    /// Fails local rules; nothing was sent.
    Invalid(UsernameError),
}

/// Check the form's username and record the result on the form.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip(client, form), fields(username = %form.username()))]
pub async fn check_username(
    client: &OpenMarketClient,
    form: &mut SignupForm,
) -> Result<UsernameCheck, ApiError> {
    if let Err(e) = validate_username(form.username()) {
        form.mark_username_checked(false);
        return Ok(UsernameCheck::Invalid(e));
    }

    let check = match client.validate_username(form.username()).await? {
        UsernameAvailability::Available => UsernameCheck::Available,
        UsernameAvailability::Taken(message) => UsernameCheck::Taken(message),
    };
    form.mark_username_checked(check == UsernameCheck::Available);
    Ok(check)
}

/// Signup submission failures.
#[derive(Debug, Error)]
pub enum SignupError {
    /// The form is not ready; nothing was sent.
    #[error("{0}")]
    Invalid(SignupErrors),

    /// The request failed or the server rejected a field.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SignupError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Validation,
            Self::Api(err) => err.kind(),
        }
    }
}

/// Submit a complete signup form.
///
/// # Errors
///
/// `SignupError::Invalid` when a local rule fails, `SignupError::Api` when
/// the request fails or the server rejects a field.
#[instrument(skip(client, form), fields(username = %form.username()))]
pub async fn submit_signup(client: &OpenMarketClient, form: &SignupForm) -> Result<(), SignupError> {
    let request = form.to_request().map_err(SignupError::Invalid)?;
    client.signup(&request).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    const HOST: &str = "shop.example.com";

    #[test]
    fn test_return_url_wins_and_is_consumed() {
        let session = Session::in_memory();
        session.remember_return_url("/products/3").unwrap();

        let target =
            resolve_post_login_target(&session, Some("https://shop.example.com/cart"), HOST)
                .unwrap();
        assert_eq!(target, "/products/3");
        assert_eq!(session.peek_return_url(), None);
    }

    #[test]
    fn test_auth_return_url_is_skipped() {
        let session = Session::in_memory();
        session.remember_return_url("/login?next=x").unwrap();

        let target =
            resolve_post_login_target(&session, Some("https://shop.example.com/cart"), HOST)
                .unwrap();
        assert_eq!(target, "https://shop.example.com/cart");
    }

    #[test]
    fn test_foreign_or_auth_referrer_goes_home() {
        let session = Session::in_memory();
        assert_eq!(
            resolve_post_login_target(&session, Some("https://evil.example.net/"), HOST).unwrap(),
            HOME_PATH
        );
        assert_eq!(
            resolve_post_login_target(&session, Some("https://shop.example.com/signup"), HOST)
                .unwrap(),
            HOME_PATH
        );
        assert_eq!(
            resolve_post_login_target(&session, None, HOST).unwrap(),
            HOME_PATH
        );
    }

    fn offline_client() -> OpenMarketClient {
        let config = ApiConfig::new("http://127.0.0.1:9/").unwrap();
        OpenMarketClient::new(&config, Session::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn test_blank_login_is_not_sent() {
        let client = offline_client();
        let mut form = LoginForm::new("", "");
        let outcome = submit_login(&client, &mut form, None, HOST).await.unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::Invalid(LoginFormError::MissingUsername {
                password_blank: true
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_username_is_not_sent() {
        let client = offline_client();
        let mut form = SignupForm::new();
        form.set_username("bad name!");
        let check = check_username(&client, &mut form).await.unwrap();
        assert_eq!(check, UsernameCheck::Invalid(UsernameError::InvalidCharacter));
        assert!(!form.username_checked());
    }

    #[tokio::test]
    async fn test_incomplete_signup_is_not_sent() {
        let client = offline_client();
        let form = SignupForm::new();
        let err = submit_signup(&client, &form).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, SignupError::Invalid(errors) if errors.terms_not_accepted));
    }
}

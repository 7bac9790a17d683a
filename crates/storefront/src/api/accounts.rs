//! Account endpoints: login, signup and username availability.

use std::collections::BTreeMap;

use open_market_core::{LoginForm, SessionCredential, SignupErrors, SignupRequest, UserProfile};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{ApiError, OpenMarketClient, expect_success, read_json, status_error};

const LOGIN_PATH: &str = "accounts/login/";
const SIGNUP_PATH: &str = "accounts/buyer/signup/";
const VALIDATE_USERNAME_PATH: &str = "accounts/validate-username/";

/// Result of the username availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameAvailability {
    Available,
    /// Taken, with the server's explanation.
    Taken(String),
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: UserProfile,
}

#[derive(Serialize)]
struct UsernameRequest<'a> {
    username: &'a str,
}

/// A field's messages, sent either as a list or a single string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Messages {
    Many(Vec<String>),
    One(String),
}

impl Messages {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(v) => v,
            Self::One(s) => vec![s],
        }
    }
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl MessageBody {
    fn text(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.is_empty())
    }
}

/// Parse a `{ field: [messages] }` body, tolerating single-string values.
fn parse_field_errors(body: &str) -> BTreeMap<String, Vec<String>> {
    serde_json::from_str::<BTreeMap<String, Messages>>(body)
        .map(|map| {
            map.into_iter()
                .map(|(field, messages)| (field, messages.into_vec()))
                .collect()
        })
        .unwrap_or_default()
}

impl OpenMarketClient {
    /// Log in and store the issued credential.
    ///
    /// # Errors
    ///
    /// - `ApiError::InvalidCredentials` when the server rejects the pair
    ///   (400 or 401).
    /// - `ApiError::Http` on network failure, `ApiError::Store` when the
    ///   credential cannot be saved.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<UserProfile, ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest {
                username: &form.username,
                password: &form.password,
            })
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            warn!("Login rejected");
            return Err(ApiError::InvalidCredentials);
        }

        let body: LoginResponse = read_json(response).await?;
        let credential = SessionCredential::new(body.access, body.refresh, body.user);
        if !credential.is_complete() {
            warn!("Login response carried an empty token");
            return Err(ApiError::InvalidCredentials);
        }

        self.session().begin(&credential)?;
        info!("Logged in");
        Ok(credential.user)
    }

    /// Forget the stored credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Register a buyer account.
    ///
    /// # Errors
    ///
    /// - `ApiError::FieldErrors` with the server's per-field messages on 400.
    /// - `ApiError::Status` or `ApiError::Http` otherwise.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(SIGNUP_PATH)?)
            .json(request)
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await?;
            let errors = SignupErrors::from_api(&parse_field_errors(&body));
            warn!(errors = %errors, "Signup rejected");
            return Err(ApiError::FieldErrors(errors));
        }

        expect_success(response).await?;
        info!("Signed up");
        Ok(())
    }

    /// Ask the server whether a username is free.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on network failure, `ApiError::Status` for
    /// statuses other than 200 and 400.
    #[instrument(skip(self))]
    pub async fn validate_username(
        &self,
        username: &str,
    ) -> Result<UsernameAvailability, ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(VALIDATE_USERNAME_PATH)?)
            .json(&UsernameRequest { username })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let _: serde_json::Value = read_json(response).await?;
                Ok(UsernameAvailability::Available)
            }
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                let body = response.text().await?;
                let message = serde_json::from_str::<MessageBody>(&body)
                    .ok()
                    .and_then(MessageBody::text)
                    .or_else(|| {
                        parse_field_errors(&body)
                            .into_values()
                            .flatten()
                            .next()
                    })
                    .unwrap_or_else(|| "This username is already taken".to_string());
                Ok(UsernameAvailability::Taken(message))
            }
            _ => Err(status_error(response).await),
        }
    }
}

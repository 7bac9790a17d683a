//! Authenticated request gateway.
//!
//! Every call that needs a logged-in user goes through
//! [`OpenMarketClient::authorized_request`]:
//!
//! ```text
//! AUTHENTICATED --401--> REFRESHING --ok--> AUTHENTICATED (retry once)
//!                                   \--fail--> UNAUTHENTICATED (session cleared)
//! ```
//!
//! A refresh is attempted at most once per request. The retried response is
//! returned as-is, even when it is another 401.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{ApiError, OpenMarketClient};

const TOKEN_REFRESH_PATH: &str = "accounts/token/refresh/";

/// Method, body and extra headers for an authenticated request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// JSON body, serialized as-is.
    pub body: Option<Value>,
    /// Headers sent in addition to `Authorization`.
    pub headers: HeaderMap,
}

impl RequestOptions {
    fn with_method(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// A `GET` request.
    #[must_use]
    pub fn get() -> Self {
        Self::with_method(Method::GET)
    }

    /// A `POST` request with a JSON body.
    #[must_use]
    pub fn post(body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::with_method(Method::POST)
        }
    }

    /// A `PUT` request with a JSON body.
    #[must_use]
    pub fn put(body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::with_method(Method::PUT)
        }
    }

    /// A `DELETE` request.
    #[must_use]
    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    /// Add or replace a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: String,
}

impl OpenMarketClient {
    /// Send a request with the stored bearer token, refreshing it once on 401.
    ///
    /// Returns the server's response for any status, including a 401 on the
    /// retried request.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthenticated` when there is no access token, or when
    ///   the refresh is rejected. The session is cleared in both cases.
    /// - `ApiError::Http` on network failure. Nothing is retried and the
    ///   session is left untouched.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn authorized_request(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Response, ApiError> {
        let Some(access) = self.session().access_token() else {
            debug!("No access token, clearing session");
            self.session().clear()?;
            return Err(ApiError::Unauthenticated);
        };

        let response = self.send_authorized(path, options, &access).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!("Access token rejected, refreshing");
        let Some(access) = self.refresh_access_token().await? else {
            warn!("Token refresh failed, logging out");
            self.session().clear()?;
            return Err(ApiError::Unauthenticated);
        };
        self.session().set_access_token(&access)?;

        self.send_authorized(path, options, &access).await
    }

    async fn send_authorized(
        &self,
        path: &str,
        options: &RequestOptions,
        access: &SecretString,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(path)?;

        let mut headers = options.headers.clone();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url)
            .headers(headers)
            .bearer_auth(access.expose_secret());
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), "Authorized request completed");
        Ok(response)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// `Ok(None)` means the refresh was refused: no refresh token, a
    /// non-200 status, or a body without a usable `access` field.
    async fn refresh_access_token(&self) -> Result<Option<SecretString>, ApiError> {
        let Some(refresh) = self.session().refresh_token() else {
            debug!("No refresh token stored");
            return Ok(None);
        };

        let response = self
            .inner
            .http
            .post(self.endpoint(TOKEN_REFRESH_PATH)?)
            .json(&RefreshRequest {
                refresh: refresh.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = %status, "Refresh endpoint refused the token");
            return Ok(None);
        }

        let text = response.text().await?;
        match serde_json::from_str::<RefreshResponse>(&text) {
            Ok(body) if !body.access.is_empty() => Ok(Some(SecretString::from(body.access))),
            Ok(_) => {
                debug!("Refresh response carried no access token");
                Ok(None)
            }
            Err(e) => {
                debug!(error = %e, "Refresh response was not valid JSON");
                Ok(None)
            }
        }
    }
}

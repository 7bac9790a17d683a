//! Integration tests for the authenticated request gateway.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use open_market_core::SessionCredential;
use open_market_integration_tests::{ACCESS, REFRESH, TestContext, credential};
use open_market_storefront::api::{ApiError, RequestOptions};
use open_market_storefront::session::{ACCESS_KEY, LOGGED_IN_KEY, REFRESH_KEY, USER_KEY};
use open_market_storefront::{ApiConfig, OpenMarketClient};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_401_refreshes_once_and_retries() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .and(header("authorization", format!("Bearer {ACCESS}").as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .and(body_json(json!({"refresh": REFRESH})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        ctx.client
            .session()
            .access_token()
            .unwrap()
            .expose_secret(),
        "access-2"
    );
    assert_eq!(ctx.stored(ACCESS_KEY).as_deref(), Some("access-2"));
    assert_eq!(ctx.stored(REFRESH_KEY).as_deref(), Some(REFRESH));
}

#[tokio::test]
async fn test_second_401_is_returned_as_is() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert!(ctx.client.session().is_logged_in());
}

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is invalid"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx
        .client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    for key in [ACCESS_KEY, REFRESH_KEY, USER_KEY, LOGGED_IN_KEY] {
        assert_eq!(ctx.stored(key), None, "{key} should be cleared");
    }
}

#[tokio::test]
async fn test_refresh_without_access_field_clears_session() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": ""})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx
        .client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(!ctx.client.session().is_logged_in());
}

#[tokio::test]
async fn test_401_without_refresh_token_clears_session() {
    let ctx = TestContext::new().await;
    let without_refresh = SessionCredential {
        refresh: SecretString::from(""),
        ..credential()
    };
    ctx.client.session().begin(&without_refresh).unwrap();

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = ctx
        .client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    assert_eq!(ctx.stored(ACCESS_KEY), None);
    assert_eq!(ctx.stored(REFRESH_KEY), None);
    assert_eq!(ctx.stored(LOGGED_IN_KEY), None);
}

#[tokio::test]
async fn test_refresh_network_error_keeps_session() {
    let ctx = TestContext::logged_in().await;
    let mut config = ApiConfig::new(&ctx.server.uri()).unwrap();
    config.timeout = Duration::from_millis(200);
    let client = OpenMarketClient::new(&config, ctx.client.session().clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "access-2"}))
                .set_delay(Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Http(_)));
    assert!(client.session().is_logged_in());
    assert_eq!(ctx.stored(ACCESS_KEY).as_deref(), Some(ACCESS));
    assert_eq!(ctx.stored(REFRESH_KEY).as_deref(), Some(REFRESH));
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = ctx
        .client
        .authorized_request("/cart/", &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn test_json_content_type_by_default() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/cart/3/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"quantity": 2})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .authorized_request("/cart/3/", &RequestOptions::put(json!({"quantity": 2})))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_caller_content_type_is_kept() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("POST"))
        .and(path("/cart/"))
        .and(header("content-type", "application/vnd.open-market+json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let options = RequestOptions::post(json!({"product_id": 1, "quantity": 1})).with_header(
        "content-type".parse().unwrap(),
        "application/vnd.open-market+json".parse().unwrap(),
    );
    let response = ctx
        .client
        .authorized_request("/cart/", &options)
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_typed_call_maps_persistent_401_to_unauthenticated() {
    let ctx = TestContext::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.cart_items().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    // The refresh itself succeeded, so the session survives.
    assert!(ctx.client.session().is_logged_in());
}

//! Integration tests for the cart page.

#![allow(clippy::unwrap_used)]

use open_market_core::{CartItemId, Won};
use open_market_integration_tests::{TestContext, cart_line_json, cart_page_json, product_json};
use open_market_storefront::api::ApiError;
use open_market_storefront::pages::{CartError, CartPage, CartView};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_cart(ctx: &TestContext, lines: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_page_json(lines)))
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_load_and_summarize() {
    let ctx = TestContext::logged_in().await;
    mount_cart(
        &ctx,
        vec![
            cart_line_json(1, product_json(10, 10_000, 5, 0), 2),
            cart_line_json(2, product_json(20, 10_000, 5, 3_000), 1),
        ],
    )
    .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();
    assert!(page.state().all_selected());

    let summary = page.state().summary();
    assert_eq!(summary.product_total, Won::new(30_000));
    assert_eq!(summary.shipping_fee, Won::new(3_000));
    assert_eq!(summary.total, Won::new(33_000));

    page.state_mut().select(CartItemId::new(2), false).unwrap();
    assert_eq!(page.state().summary().total, Won::new(20_000));

    page.state_mut().select(CartItemId::new(2), true).unwrap();
    page.state_mut().select(CartItemId::new(1), false).unwrap();
    let summary = page.state().summary();
    assert_eq!(summary.shipping_fee, Won::new(3_000));
    assert_eq!(summary.total, Won::new(13_000));
}

#[tokio::test]
async fn test_load_without_session_requires_login() {
    let ctx = TestContext::new().await;
    let err = CartPage::load(ctx.client.clone()).await.unwrap_err();
    assert!(matches!(err, CartError::Api(ApiError::Unauthenticated)));
}

#[tokio::test]
async fn test_increment_updates_server_then_state() {
    let ctx = TestContext::logged_in().await;
    mount_cart(&ctx, vec![cart_line_json(7, product_json(1, 4_000, 3, 0), 1)]).await;

    Mock::given(method("PUT"))
        .and(path("/cart/7/"))
        .and(body_json(json!({"quantity": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "quantity": 2})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();
    assert_eq!(page.increment(CartItemId::new(7)).await.unwrap(), 2);
    assert_eq!(
        page.state().line(CartItemId::new(7)).unwrap().item.quantity,
        2
    );
    assert_eq!(page.state().summary().total, Won::new(8_000));
}

#[tokio::test]
async fn test_bounds_are_enforced_without_requests() {
    let ctx = TestContext::logged_in().await;
    mount_cart(
        &ctx,
        vec![
            cart_line_json(1, product_json(1, 1_000, 2, 0), 2),
            cart_line_json(2, product_json(2, 1_000, 9, 0), 1),
        ],
    )
    .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();

    let err = page.increment(CartItemId::new(1)).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { stock: 2, .. }));

    let err = page.decrement(CartItemId::new(2)).await.unwrap_err();
    assert!(matches!(err, CartError::AtMinimum(_)));

    assert_eq!(
        page.state().line(CartItemId::new(1)).unwrap().item.quantity,
        2
    );
    assert_eq!(
        page.state().line(CartItemId::new(2)).unwrap().item.quantity,
        1
    );
}

#[tokio::test]
async fn test_failed_update_keeps_quantity() {
    let ctx = TestContext::logged_in().await;
    mount_cart(&ctx, vec![cart_line_json(4, product_json(1, 1_000, 5, 0), 3)]).await;

    Mock::given(method("PUT"))
        .and(path("/cart/4/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();
    let err = page.decrement(CartItemId::new(4)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Api(ApiError::Status { status: 500, .. })
    ));
    assert_eq!(
        page.state().line(CartItemId::new(4)).unwrap().item.quantity,
        3
    );
}

#[tokio::test]
async fn test_decrement_below_stale_stock_is_recorded() {
    let ctx = TestContext::logged_in().await;
    mount_cart(&ctx, vec![cart_line_json(7, product_json(1, 1_000, 3, 0), 5)]).await;

    Mock::given(method("PUT"))
        .and(path("/cart/7/"))
        .and(body_json(json!({"quantity": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "quantity": 4})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();
    assert_eq!(page.decrement(CartItemId::new(7)).await.unwrap(), 4);
    assert_eq!(
        page.state().line(CartItemId::new(7)).unwrap().item.quantity,
        4
    );
}

#[tokio::test]
async fn test_confirmed_delete_removes_exactly_one_line() {
    let ctx = TestContext::logged_in().await;
    mount_cart(
        &ctx,
        vec![
            cart_line_json(1, product_json(1, 1_000, 5, 0), 1),
            cart_line_json(2, product_json(2, 2_000, 5, 0), 1),
        ],
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path("/cart/1/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cart/2/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();

    page.state_mut().request_delete(CartItemId::new(1)).unwrap();
    assert_eq!(page.confirm_delete().await.unwrap(), CartItemId::new(1));
    assert_eq!(page.state().lines().len(), 1);
    assert_eq!(page.state().lines()[0].item.cart_id, CartItemId::new(2));
    assert_eq!(page.state().summary().total, Won::new(2_000));

    page.state_mut().request_delete(CartItemId::new(2)).unwrap();
    page.confirm_delete().await.unwrap();
    assert_eq!(page.state().view(), CartView::Empty);
    assert!(!page.state().summary().can_order);
}

#[tokio::test]
async fn test_cancelled_delete_sends_nothing() {
    let ctx = TestContext::logged_in().await;
    mount_cart(&ctx, vec![cart_line_json(1, product_json(1, 1_000, 5, 0), 1)]).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let mut page = CartPage::load(ctx.client.clone()).await.unwrap();
    page.state_mut().request_delete(CartItemId::new(1)).unwrap();
    page.state_mut().cancel_delete();

    let err = page.confirm_delete().await.unwrap_err();
    assert!(matches!(err, CartError::NoPendingDelete));
    assert_eq!(page.state().lines().len(), 1);
}

#[tokio::test]
async fn test_bare_list_response() {
    let ctx = TestContext::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([cart_line_json(3, product_json(1, 500, 5, 0), 2)])),
        )
        .mount(&ctx.server)
        .await;

    let items = ctx.client.cart_items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].line_total(), Won::new(1_000));
}

//! Integration tests for the Open Market storefront client.
//!
//! Every test runs the real client against a `wiremock` server standing in
//! for the Open Market API, with the session persisted to a temporary
//! directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p open-market-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `gateway_refresh` - bearer token and one-shot refresh behavior
//! - `cart_flow` - cart page quantity, summary and deletion
//! - `accounts` - login, signup and username checks
//! - `products` - product reads, caching and add-to-cart

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::PathBuf;
use std::sync::Arc;

use open_market_core::{SessionCredential, UserProfile, UserType};
use open_market_storefront::session::{FileStore, KeyValueStore};
use open_market_storefront::{ApiConfig, OpenMarketClient, Session};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

/// Access token stored by [`TestContext::logged_in`].
pub const ACCESS: &str = "access-1";
/// Refresh token stored by [`TestContext::logged_in`].
pub const REFRESH: &str = "refresh-1";

/// Session file name inside the temp directory.
const SESSION_FILE: &str = "session.json";

/// A mock API plus a client whose session lives in a temp directory.
pub struct TestContext {
    pub server: MockServer,
    pub client: OpenMarketClient,
    dir: TempDir,
}

impl TestContext {
    /// Start a mock server and a logged-out client.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join(SESSION_FILE)).unwrap();
        let session = Session::persistent(Arc::new(store));
        let config = ApiConfig::new(&server.uri()).unwrap();
        let client = OpenMarketClient::new(&config, session).unwrap();
        Self {
            server,
            client,
            dir,
        }
    }

    /// Start a mock server and a client logged in as `buyer1`.
    pub async fn logged_in() -> Self {
        let ctx = Self::new().await;
        ctx.client.session().begin(&credential()).unwrap();
        ctx
    }

    /// Path of the persisted session file.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.dir.path().join(SESSION_FILE)
    }

    /// Re-read the session file from disk.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<String> {
        FileStore::open(self.session_path()).unwrap().get(key)
    }
}

/// The credential [`TestContext::logged_in`] starts with.
#[must_use]
pub fn credential() -> SessionCredential {
    SessionCredential::new(
        ACCESS,
        REFRESH,
        UserProfile {
            username: "buyer1".to_string(),
            name: Some("Kim Hodu".to_string()),
            phone_number: Some("01012345678".to_string()),
            user_type: Some(UserType::Buyer),
        },
    )
}

/// A product as the API returns it.
#[must_use]
pub fn product_json(id: i64, price: i64, stock: u32, shipping_fee: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "info": "Test product",
        "image": format!("https://img.example.com/{id}.png"),
        "price": price,
        "shipping_method": "PARCEL",
        "shipping_fee": shipping_fee,
        "stock": stock,
        "seller": {"username": "seller1", "name": "Seller", "store_name": "Hodu Store"}
    })
}

/// A cart line as the API returns it.
#[must_use]
pub fn cart_line_json(cart_id: i64, product: Value, quantity: u32) -> Value {
    json!({
        "id": cart_id,
        "product": product,
        "quantity": quantity
    })
}

/// A `GET /cart/` body in the paginated shape.
#[must_use]
pub fn cart_page_json(lines: Vec<Value>) -> Value {
    json!({
        "count": lines.len(),
        "next": null,
        "previous": null,
        "results": lines
    })
}

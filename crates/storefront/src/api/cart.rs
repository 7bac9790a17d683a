//! Server-side cart endpoints. All of them require a session.

use open_market_core::{CartItemId, CartLineItem, ProductId};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::gateway::RequestOptions;
use super::{ApiError, OpenMarketClient, expect_success, read_json};

const CART_PATH: &str = "cart/";

/// `GET /cart/` answers either with a paginated object or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum CartListing {
    Paged { results: Vec<CartLineItem> },
    Bare(Vec<CartLineItem>),
}

impl CartListing {
    fn into_items(self) -> Vec<CartLineItem> {
        match self {
            Self::Paged { results } => results,
            Self::Bare(items) => items,
        }
    }
}

fn cart_item_path(cart_id: CartItemId) -> String {
    format!("{CART_PATH}{cart_id}/")
}

impl OpenMarketClient {
    /// List the current user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid session, or
    /// another error if the request fails.
    #[instrument(skip(self))]
    pub async fn cart_items(&self) -> Result<Vec<CartLineItem>, ApiError> {
        let response = self
            .authorized_request(CART_PATH, &RequestOptions::get())
            .await?;
        let listing: CartListing = read_json(response).await?;
        Ok(listing.into_items())
    }

    /// Put `quantity` units of a product in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid session, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = json!({
            "product_id": product_id,
            "quantity": quantity,
        });
        let response = self
            .authorized_request(CART_PATH, &RequestOptions::post(body))
            .await?;
        expect_success(response).await?;
        // Cached snapshots may now show stale stock.
        self.invalidate_cache();
        info!(quantity, "Added to cart");
        Ok(())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid session, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn update_cart_quantity(
        &self,
        cart_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let response = self
            .authorized_request(
                &cart_item_path(cart_id),
                &RequestOptions::put(json!({ "quantity": quantity })),
            )
            .await?;
        expect_success(response).await
    }

    /// Delete a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid session, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn remove_cart_item(&self, cart_id: CartItemId) -> Result<(), ApiError> {
        let response = self
            .authorized_request(&cart_item_path(cart_id), &RequestOptions::delete())
            .await?;
        expect_success(response).await?;
        info!("Removed cart line");
        Ok(())
    }

    /// Whether the cart already holds a product.
    ///
    /// # Errors
    ///
    /// Same as [`Self::cart_items`].
    pub async fn cart_contains(&self, product_id: ProductId) -> Result<bool, ApiError> {
        Ok(self
            .cart_items()
            .await?
            .iter()
            .any(|item| item.product.id == product_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LINE: &str = r#"{
        "id": 7,
        "quantity": 2,
        "product": {"id": 1, "name": "Pen", "price": 10000, "stock": 5, "shipping_fee": 0}
    }"#;

    #[test]
    fn test_cart_listing_accepts_both_shapes() {
        let paged: CartListing =
            serde_json::from_str(&format!(r#"{{"count": 1, "results": [{LINE}]}}"#)).unwrap();
        let bare: CartListing = serde_json::from_str(&format!("[{LINE}]")).unwrap();

        let paged = paged.into_items();
        let bare = bare.into_items();
        assert_eq!(paged, bare);
        assert_eq!(paged[0].cart_id, CartItemId::new(7));
        assert_eq!(paged[0].quantity, 2);
    }

    #[test]
    fn test_cart_item_path() {
        assert_eq!(cart_item_path(CartItemId::new(12)), "cart/12/");
    }
}

//! Product detail page model.

use open_market_core::{ProductId, ProductSnapshot, Won};
use tracing::{debug, instrument};

use crate::api::{ApiError, OpenMarketClient};

/// Quantity stepper on the detail page.
///
/// Starts at one unit. With no stock the selector is sold out: quantity and
/// total are zero and both steppers are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantitySelector {
    quantity: u32,
    stock: u32,
    unit_price: Won,
}

impl QuantitySelector {
    /// Selector for a product with `stock` units at `unit_price`.
    #[must_use]
    pub fn new(stock: u32, unit_price: Won) -> Self {
        Self {
            quantity: stock.min(1),
            stock,
            unit_price,
        }
    }

    /// Selected quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Units available.
    #[must_use]
    pub const fn stock(&self) -> u32 {
        self.stock
    }

    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.stock == 0
    }

    /// Whether `+` is enabled.
    #[must_use]
    pub const fn can_increase(&self) -> bool {
        self.quantity < self.stock
    }

    /// Whether `-` is enabled.
    #[must_use]
    pub const fn can_decrease(&self) -> bool {
        self.quantity > 1
    }

    /// Add one unit if stock allows. Returns whether anything changed.
    pub const fn increase(&mut self) -> bool {
        if self.can_increase() {
            self.quantity += 1;
            true
        } else {
            false
        }
    }

    /// Remove one unit, keeping at least one. Returns whether anything changed.
    pub const fn decrease(&mut self) -> bool {
        if self.can_decrease() {
            self.quantity -= 1;
            true
        } else {
            false
        }
    }

    /// Set the quantity directly, clamped to `1..=stock`.
    ///
    /// Returns `false` when the value had to be clamped.
    pub fn set_quantity(&mut self, quantity: u32) -> bool {
        self.quantity = if self.is_sold_out() {
            0
        } else {
            quantity.clamp(1, self.stock)
        };
        self.quantity == quantity
    }

    /// Price of the selected quantity.
    #[must_use]
    pub fn total(&self) -> Won {
        self.unit_price.times(self.quantity)
    }
}

/// Result of pressing "add to cart".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddToCartOutcome {
    /// Not logged in; the login prompt should be shown.
    LoginRequired,
    /// The product is already in the cart; offer to go there.
    AlreadyInCart,
    /// Nothing to add.
    SoldOut,
    /// Added; offer to go to the cart.
    Added,
}

/// Product detail page bound to the API.
#[derive(Debug, Clone)]
pub struct ProductDetailPage {
    client: OpenMarketClient,
    product: ProductSnapshot,
    selector: QuantitySelector,
}

impl ProductDetailPage {
    /// Load the product named by a raw `id` query value.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` when the id is missing, malformed or unknown;
    /// the caller should show the not-found page.
    #[instrument(skip(client))]
    pub async fn load(client: OpenMarketClient, id: Option<&str>) -> Result<Self, ApiError> {
        let raw = id.map(str::trim).filter(|s| !s.is_empty()).unwrap_or_default();
        let product_id: ProductId = raw
            .parse()
            .map_err(|_| ApiError::NotFound(format!("product {raw:?}")))?;

        let product = client.product(product_id).await?;
        let selector = QuantitySelector::new(product.stock, product.price);
        Ok(Self {
            client,
            product,
            selector,
        })
    }

    #[must_use]
    pub const fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    #[must_use]
    pub const fn selector(&self) -> &QuantitySelector {
        &self.selector
    }

    pub const fn selector_mut(&mut self) -> &mut QuantitySelector {
        &mut self.selector
    }

    /// Page path used as the post-login return URL.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/products/{}", self.product.id)
    }

    /// Put the selected quantity in the cart.
    ///
    /// When the user is not logged in, the page path is remembered so login
    /// can return here.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart request fails for a reason other than
    /// a missing session.
    #[instrument(skip(self), fields(product_id = %self.product.id))]
    pub async fn add_to_cart(&self) -> Result<AddToCartOutcome, ApiError> {
        if self.selector.is_sold_out() {
            return Ok(AddToCartOutcome::SoldOut);
        }
        if !self.client.session().is_logged_in() {
            self.client.session().remember_return_url(&self.path())?;
            return Ok(AddToCartOutcome::LoginRequired);
        }

        let outcome = match self.client.cart_contains(self.product.id).await {
            Ok(true) => AddToCartOutcome::AlreadyInCart,
            Ok(false) => {
                self.client
                    .add_to_cart(self.product.id, self.selector.quantity())
                    .await?;
                AddToCartOutcome::Added
            }
            Err(ApiError::Unauthenticated) => {
                self.client.session().remember_return_url(&self.path())?;
                AddToCartOutcome::LoginRequired
            }
            Err(e) => return Err(e),
        };
        debug!(?outcome, "Add to cart finished");
        Ok(outcome)
    }
}

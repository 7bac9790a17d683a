//! Cart page model.
//!
//! [`CartState`] is the pure part: selection, quantity bounds, the order
//! summary and the two-step delete. [`CartPage`] couples it to the API so the
//! local state only changes after the server has accepted the change.

use open_market_core::{CartItemId, CartLineItem, Won};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{ApiError, OpenMarketClient};
use crate::error::ErrorKind;

/// Cart actions that were refused or failed.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line with this id.
    #[error("cart line {0} does not exist")]
    UnknownItem(CartItemId),

    /// Increment would exceed stock.
    #[error("only {stock} in stock")]
    OutOfStock { cart_id: CartItemId, stock: u32 },

    /// Decrement would go below one.
    #[error("quantity cannot go below 1")]
    AtMinimum(CartItemId),

    /// `confirm_delete` called without a pending request.
    #[error("no deletion is awaiting confirmation")]
    NoPendingDelete,

    /// The API call behind the action failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CartError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(err) => err.kind(),
            Self::UnknownItem(_) => ErrorKind::NotFound,
            Self::OutOfStock { .. } | Self::AtMinimum(_) | Self::NoPendingDelete => {
                ErrorKind::Validation
            }
        }
    }
}

/// Quantity stepper direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment,
    Decrement,
}

/// A cart line plus its checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: CartLineItem,
    pub selected: bool,
}

/// What the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartView<'a> {
    /// The "your cart is empty" view.
    Empty,
    Items(&'a [CartLine]),
}

/// Totals over the selected lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub product_total: Won,
    pub discount: Won,
    pub shipping_fee: Won,
    pub total: Won,
    /// At least one line is selected.
    pub can_order: bool,
}

/// Local cart state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    lines: Vec<CartLine>,
    pending_delete: Option<CartItemId>,
}

impl CartState {
    /// State for freshly loaded items, all selected.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Self {
            lines: items
                .into_iter()
                .map(|item| CartLine {
                    item,
                    selected: true,
                })
                .collect(),
            pending_delete: None,
        }
    }

    /// All lines in server order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line with this id.
    #[must_use]
    pub fn line(&self, cart_id: CartItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item.cart_id == cart_id)
    }

    fn line_mut(&mut self, cart_id: CartItemId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|l| l.item.cart_id == cart_id)
            .ok_or(CartError::UnknownItem(cart_id))
    }

    /// Quantity after one step, if the step is allowed.
    ///
    /// # Errors
    ///
    /// `OutOfStock` at the stock limit, `AtMinimum` at one, `UnknownItem`
    /// for a missing line.
    pub fn next_quantity(&self, cart_id: CartItemId, step: Step) -> Result<u32, CartError> {
        let item = &self
            .line(cart_id)
            .ok_or(CartError::UnknownItem(cart_id))?
            .item;
        match step {
            Step::Increment if item.can_increment() => Ok(item.quantity + 1),
            Step::Increment => Err(CartError::OutOfStock {
                cart_id,
                stock: item.product.stock,
            }),
            Step::Decrement if item.can_decrement() => Ok(item.quantity - 1),
            Step::Decrement => Err(CartError::AtMinimum(cart_id)),
        }
    }

    /// Record a quantity the server has accepted.
    ///
    /// # Errors
    ///
    /// Rejects zero, unknown lines, and increases past stock. A line already
    /// above stock (stock fell after it was carted) may still shrink.
    pub fn set_quantity(&mut self, cart_id: CartItemId, quantity: u32) -> Result<(), CartError> {
        let line = self.line_mut(cart_id)?;
        if quantity < 1 {
            return Err(CartError::AtMinimum(cart_id));
        }
        if quantity > line.item.product.stock && quantity > line.item.quantity {
            return Err(CartError::OutOfStock {
                cart_id,
                stock: line.item.product.stock,
            });
        }
        line.item.quantity = quantity;
        Ok(())
    }

    /// Tick or untick one line.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` for a missing line.
    pub fn select(&mut self, cart_id: CartItemId, selected: bool) -> Result<(), CartError> {
        self.line_mut(cart_id)?.selected = selected;
        Ok(())
    }

    /// Tick or untick every line.
    pub fn select_all(&mut self, selected: bool) {
        for line in &mut self.lines {
            line.selected = selected;
        }
    }

    /// Whether the "select all" box is ticked.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(|l| l.selected)
    }

    /// Totals over the selected lines.
    ///
    /// Shipping is charged once per line. No discounts are applied.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        let selected = || self.lines.iter().filter(|l| l.selected);

        let product_total: Won = selected().map(|l| l.item.line_total()).sum();
        let shipping_fee: Won = selected().map(|l| l.item.product.shipping_fee).sum();
        let discount = Won::ZERO;

        OrderSummary {
            product_total,
            discount,
            shipping_fee,
            total: product_total - discount + shipping_fee,
            can_order: selected().next().is_some(),
        }
    }

    /// Ask for confirmation before deleting a line.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` for a missing line.
    pub fn request_delete(&mut self, cart_id: CartItemId) -> Result<(), CartError> {
        if self.line(cart_id).is_none() {
            return Err(CartError::UnknownItem(cart_id));
        }
        self.pending_delete = Some(cart_id);
        Ok(())
    }

    /// Dismiss the confirmation.
    pub const fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Line awaiting delete confirmation.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<CartItemId> {
        self.pending_delete
    }

    /// Drop a line the server has deleted. Returns whether it was present.
    pub fn remove(&mut self, cart_id: CartItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.item.cart_id != cart_id);
        if self.pending_delete == Some(cart_id) {
            self.pending_delete = None;
        }
        self.lines.len() != before
    }

    /// Empty view or the item list.
    #[must_use]
    pub fn view(&self) -> CartView<'_> {
        if self.lines.is_empty() {
            CartView::Empty
        } else {
            CartView::Items(&self.lines)
        }
    }
}

/// Cart page bound to the API.
#[derive(Debug, Clone)]
pub struct CartPage {
    client: OpenMarketClient,
    state: CartState,
}

impl CartPage {
    /// Load the current user's cart.
    ///
    /// # Errors
    ///
    /// `CartError::Api(ApiError::Unauthenticated)` when the user must log in.
    #[instrument(skip(client))]
    pub async fn load(client: OpenMarketClient) -> Result<Self, CartError> {
        let items = client.cart_items().await?;
        debug!(lines = items.len(), "Loaded cart");
        Ok(Self {
            client,
            state: CartState::from_items(items),
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Mutable state for selection and delete confirmation.
    pub const fn state_mut(&mut self) -> &mut CartState {
        &mut self.state
    }

    /// Step a line's quantity, updating the server first.
    ///
    /// # Errors
    ///
    /// Bounds violations are rejected without a request. API failures leave
    /// the local quantity unchanged.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn change_quantity(
        &mut self,
        cart_id: CartItemId,
        step: Step,
    ) -> Result<u32, CartError> {
        let quantity = self.state.next_quantity(cart_id, step)?;
        self.client.update_cart_quantity(cart_id, quantity).await?;
        self.state.set_quantity(cart_id, quantity)?;
        Ok(quantity)
    }

    /// Add one unit.
    ///
    /// # Errors
    ///
    /// See [`Self::change_quantity`].
    pub async fn increment(&mut self, cart_id: CartItemId) -> Result<u32, CartError> {
        self.change_quantity(cart_id, Step::Increment).await
    }

    /// Remove one unit.
    ///
    /// # Errors
    ///
    /// See [`Self::change_quantity`].
    pub async fn decrement(&mut self, cart_id: CartItemId) -> Result<u32, CartError> {
        self.change_quantity(cart_id, Step::Decrement).await
    }

    /// Delete the line awaiting confirmation.
    ///
    /// The confirmation is dismissed whether or not the request succeeds.
    ///
    /// # Errors
    ///
    /// `NoPendingDelete` without a pending request; API failures keep the
    /// line.
    #[instrument(skip(self))]
    pub async fn confirm_delete(&mut self) -> Result<CartItemId, CartError> {
        let cart_id = self
            .state
            .pending_delete
            .take()
            .ok_or(CartError::NoPendingDelete)?;
        self.client.remove_cart_item(cart_id).await?;
        self.state.remove(cart_id);
        Ok(cart_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use open_market_core::{ProductId, ProductSnapshot, SellerSummary, ShippingMethod};

    fn line(cart_id: i64, price: i64, quantity: u32, stock: u32, shipping_fee: i64) -> CartLineItem {
        CartLineItem {
            cart_id: CartItemId::new(cart_id),
            product: ProductSnapshot {
                id: ProductId::new(cart_id * 10),
                name: format!("Product {cart_id}"),
                info: None,
                image: String::new(),
                price: Won::new(price),
                shipping_method: ShippingMethod::Parcel,
                shipping_fee: Won::new(shipping_fee),
                stock,
                seller: SellerSummary::default(),
            },
            quantity,
        }
    }

    #[test]
    fn test_summary_without_shipping() {
        let state = CartState::from_items(vec![line(1, 10_000, 2, 5, 0)]);
        let summary = state.summary();
        assert_eq!(summary.product_total, Won::new(20_000));
        assert_eq!(summary.shipping_fee, Won::ZERO);
        assert_eq!(summary.discount, Won::ZERO);
        assert_eq!(summary.total, Won::new(20_000));
        assert!(summary.can_order);
    }

    #[test]
    fn test_summary_with_shipping() {
        let state = CartState::from_items(vec![line(1, 10_000, 1, 5, 3_000)]);
        let summary = state.summary();
        assert_eq!(summary.shipping_fee, Won::new(3_000));
        assert_eq!(summary.total, Won::new(13_000));
    }

    #[test]
    fn test_summary_counts_only_selected_lines() {
        let mut state = CartState::from_items(vec![
            line(1, 10_000, 1, 5, 3_000),
            line(2, 5_000, 2, 5, 2_500),
        ]);
        assert!(state.all_selected());

        state.select(CartItemId::new(2), false).unwrap();
        assert!(!state.all_selected());
        assert_eq!(state.summary().total, Won::new(13_000));

        state.select_all(false);
        let summary = state.summary();
        assert_eq!(summary.total, Won::ZERO);
        assert!(!summary.can_order);
    }

    #[test]
    fn test_quantity_bounds() {
        let state = CartState::from_items(vec![line(1, 1_000, 1, 2, 0), line(2, 1_000, 2, 2, 0)]);

        assert!(matches!(
            state.next_quantity(CartItemId::new(1), Step::Decrement),
            Err(CartError::AtMinimum(_))
        ));
        assert_eq!(
            state
                .next_quantity(CartItemId::new(1), Step::Increment)
                .unwrap(),
            2
        );
        assert!(matches!(
            state.next_quantity(CartItemId::new(2), Step::Increment),
            Err(CartError::OutOfStock { stock: 2, .. })
        ));
        assert!(matches!(
            state.next_quantity(CartItemId::new(9), Step::Increment),
            Err(CartError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_set_quantity_rejects_out_of_range() {
        let mut state = CartState::from_items(vec![line(1, 1_000, 1, 3, 0)]);
        assert!(state.set_quantity(CartItemId::new(1), 0).is_err());
        assert!(state.set_quantity(CartItemId::new(1), 4).is_err());
        state.set_quantity(CartItemId::new(1), 3).unwrap();
        assert_eq!(state.line(CartItemId::new(1)).unwrap().item.quantity, 3);
    }

    #[test]
    fn test_over_stock_line_can_still_shrink() {
        let mut state = CartState::from_items(vec![line(7, 1_000, 5, 3, 0)]);
        let cart_id = CartItemId::new(7);

        assert!(matches!(
            state.next_quantity(cart_id, Step::Increment),
            Err(CartError::OutOfStock { stock: 3, .. })
        ));
        assert_eq!(state.next_quantity(cart_id, Step::Decrement).unwrap(), 4);

        state.set_quantity(cart_id, 4).unwrap();
        assert_eq!(state.line(cart_id).unwrap().item.quantity, 4);
        assert!(state.set_quantity(cart_id, 5).is_err());
    }

    #[test]
    fn test_delete_removes_exactly_one_line() {
        let mut state = CartState::from_items(vec![line(1, 1_000, 1, 3, 0), line(2, 1_000, 1, 3, 0)]);

        state.request_delete(CartItemId::new(1)).unwrap();
        assert_eq!(state.pending_delete(), Some(CartItemId::new(1)));
        state.cancel_delete();
        assert_eq!(state.pending_delete(), None);

        state.request_delete(CartItemId::new(1)).unwrap();
        assert!(state.remove(CartItemId::new(1)));
        assert_eq!(state.pending_delete(), None);
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.lines()[0].item.cart_id, CartItemId::new(2));

        assert!(state.remove(CartItemId::new(2)));
        assert_eq!(state.view(), CartView::Empty);
        assert!(!state.all_selected());
    }

    #[test]
    fn test_request_delete_unknown_line() {
        let mut state = CartState::default();
        assert!(matches!(
            state.request_delete(CartItemId::new(1)),
            Err(CartError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CartError::AtMinimum(CartItemId::new(1)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CartError::Api(ApiError::Unauthenticated).kind(),
            ErrorKind::Authorization
        );
    }
}

//! Cart commands.
//!
//! Quantities and deletions go through the cart page model, so the same
//! bounds apply as on the web page: at least one unit, at most the stock.

use open_market_core::CartItemId;
use open_market_storefront::api::ApiError;
use open_market_storefront::pages::{
    AddToCartOutcome, CartPage, CartState, CartView, ProductDetailPage, Step,
};
use open_market_storefront::OpenMarketClient;
use open_market_storefront::error::Result;

fn print_summary(state: &CartState) {
    let summary = state.summary();
    println!("  Products:  {}", summary.product_total);
    println!("  Discount: -{}", summary.discount);
    println!("  Shipping:  {}", summary.shipping_fee);
    println!("  Total:     {}", summary.total);
}

fn print_state(state: &CartState) {
    match state.view() {
        CartView::Empty => println!("Your cart is empty."),
        CartView::Items(lines) => {
            for line in lines {
                let item = &line.item;
                println!(
                    "[{}] cart #{:<5} {} / {} x{} = {} ({})",
                    if line.selected { "x" } else { " " },
                    item.cart_id,
                    item.product.store_label(),
                    item.product.name,
                    item.quantity,
                    item.line_total(),
                    item.product.shipping_fee_label(),
                );
            }
            print_summary(state);
        }
    }
}

pub async fn list(client: OpenMarketClient) -> Result<()> {
    let page = CartPage::load(client).await?;
    print_state(page.state());
    Ok(())
}

pub async fn add(client: OpenMarketClient, product_id: &str, quantity: u32) -> Result<()> {
    let mut page = ProductDetailPage::load(client, Some(product_id)).await?;
    if !page.selector_mut().set_quantity(quantity) && !page.selector().is_sold_out() {
        eprintln!(
            "Only {} in stock; adding {} instead of {quantity}.",
            page.selector().stock(),
            page.selector().quantity()
        );
    }

    match page.add_to_cart().await? {
        AddToCartOutcome::Added => {
            println!(
                "Added {} x {} ({}).",
                page.selector().quantity(),
                page.product().name,
                page.selector().total()
            );
        }
        AddToCartOutcome::AlreadyInCart => {
            println!("{} is already in your cart. See `om cart list`.", page.product().name);
        }
        AddToCartOutcome::SoldOut => println!("{} is sold out.", page.product().name),
        AddToCartOutcome::LoginRequired => return Err(ApiError::Unauthenticated.into()),
    }
    Ok(())
}

pub async fn step(client: OpenMarketClient, cart_id: i64, step: Step) -> Result<()> {
    let mut page = CartPage::load(client).await?;
    let quantity = page.change_quantity(CartItemId::new(cart_id), step).await?;
    println!("Cart #{cart_id} now holds {quantity}.");
    print_summary(page.state());
    Ok(())
}

pub async fn remove(client: OpenMarketClient, cart_id: i64, confirmed: bool) -> Result<()> {
    let mut page = CartPage::load(client).await?;
    let cart_id = CartItemId::new(cart_id);
    page.state_mut().request_delete(cart_id)?;

    if !confirmed {
        page.state_mut().cancel_delete();
        println!("Delete cart #{cart_id}? Re-run with --yes to confirm.");
        return Ok(());
    }

    page.confirm_delete().await?;
    println!("Removed cart #{cart_id}.");
    print_state(page.state());
    Ok(())
}

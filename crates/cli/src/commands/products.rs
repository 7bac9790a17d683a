//! Catalog commands.

use open_market_storefront::pages::ProductDetailPage;
use open_market_storefront::OpenMarketClient;
use open_market_storefront::error::Result;

pub async fn list(client: &OpenMarketClient, page: u32) -> Result<()> {
    let products = client.products(page).await?;

    if products.results.is_empty() {
        println!("No products on page {page}.");
        return Ok(());
    }

    for product in &products.results {
        let stock = if product.is_sold_out() {
            "sold out".to_string()
        } else {
            format!("{} left", product.stock)
        };
        println!(
            "#{:<6} {:<40} {:>12}  {} ({stock})",
            product.id,
            product.name,
            product.price.to_string(),
            product.store_label(),
        );
    }

    println!(
        "Page {page}, {} products total{}",
        products.count,
        if products.next.is_some() {
            format!(". Next: om products list --page {}", page.max(1) + 1)
        } else {
            String::new()
        }
    );
    Ok(())
}

pub async fn show(client: &OpenMarketClient, id: &str) -> Result<()> {
    let page = ProductDetailPage::load(client.clone(), Some(id)).await?;
    let product = page.product();
    let selector = page.selector();

    println!("{}", product.name);
    println!("  Store:    {}", product.store_label());
    println!("  Price:    {}", product.price);
    println!("  Delivery: {}", product.delivery_label());
    if selector.is_sold_out() {
        println!("  Stock:    sold out");
    } else {
        println!("  Stock:    {}", selector.stock());
    }
    if let Some(info) = product.info.as_deref().filter(|i| !i.trim().is_empty()) {
        println!();
        println!("{info}");
    }
    Ok(())
}

//! Public product reads, cached.

use open_market_core::{ProductId, ProductPage, ProductSnapshot};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, OpenMarketClient, read_json};

impl OpenMarketClient {
    /// Fetch one page of the product listing. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let page = page.max(1);
        let cache_key = CacheKey::Products { page };

        if let Some(CacheValue::Products(cached)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(cached);
        }

        let mut url = self.endpoint("products/")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());

        let response = self.inner.http.get(url).send().await?;
        let products: ProductPage = read_json(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<ProductSnapshot, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(cached)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*cached);
        }

        let url = self.endpoint(&format!("products/{id}/"))?;
        let response = self.inner.http.get(url).send().await?;
        let product: ProductSnapshot = read_json(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

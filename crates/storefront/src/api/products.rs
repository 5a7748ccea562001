//! Product catalog client.
//!
//! Catalog reads are cached with `moka` (5-minute TTL) since the catalog
//! changes rarely; search queries bypass the cache.

use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use spice_pantry_core::{Price, ProductId};

use crate::cart::CartLine;
use crate::config::StorefrontConfig;

use super::{ApiError, check_response};

/// Default page size requested from the catalog (the service defaults to
/// 10, which hides most of the range).
const DEFAULT_PAGE_LIMIT: u32 = 100;

/// A product as returned by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Convert this product into a cart line with quantity 1, carrying the
    /// reported stock across as the quantity bound.
    #[must_use]
    pub fn to_cart_line(&self) -> CartLine {
        CartLine {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity: 1,
            stock: self.stock,
            image: self.image_url.clone(),
            weight: self.weight.clone(),
            category: self.category.clone(),
        }
    }
}

/// Pagination metadata on a catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Query parameters for a catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    /// Cache key for this query, or `None` when the query carries a search
    /// term (search results are not cached).
    fn cache_key(&self) -> Option<String> {
        if self.search.is_some() {
            return None;
        }
        Some(format!(
            "products:{}:{}:{}",
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            self.category.as_deref().unwrap_or("")
        ))
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![(
            "limit",
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).to_string(),
        )];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// The two shapes the single-product endpoint returns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductPayload {
    Wrapped { product: Product },
    Bare(Product),
}

/// Client for the product catalog service.
#[derive(Clone)]
pub struct ProductClient {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, ProductPage>,
}

impl ProductClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            cache,
        }
    }

    /// Fetch a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = query.cache_key();

        if let Some(key) = &cache_key
            && let Some(page) = self.cache.get(key).await
        {
            debug!("cache hit for products");
            return Ok(page);
        }

        let url = self.endpoint("api/products")?;
        let response = self
            .client
            .get(url)
            .query(&query.to_params())
            .send()
            .await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        let page: ProductPage = serde_json::from_str(&body)?;

        if let Some(key) = cache_key {
            self.cache.insert(key, page.clone()).await;
        }

        Ok(page)
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, and
    /// transport/server errors otherwise.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&format!("api/products/{product_id}"))?;
        let response = check_response(self.client.get(url).send().await?).await?;
        let body = response.text().await?;
        let payload: ProductPayload = serde_json::from_str(&body)?;
        Ok(match payload {
            ProductPayload::Wrapped { product } | ProductPayload::Bare(product) => product,
        })
    }

    /// Invalidate all cached catalog pages.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::Server {
            status: 0,
            message: format!("invalid endpoint {path}: {e}"),
        })
    }
}

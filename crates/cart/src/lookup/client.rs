//! Catalog API client implementation.
//!
//! Uses `reqwest` for HTTP. Product metadata is cached with `moka` for the
//! configured TTL; stock levels always go to the network.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Response, StatusCode};
use rocketshoes_core::{Price, ProductDetails, ProductId, StockInfo};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{LookupError, StockLookupService};
use crate::config::StockApiConfig;

/// Upper bound on cached product entries.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Stock endpoint payload.
#[derive(Debug, Deserialize)]
struct StockResponse {
    amount: u32,
}

/// Product endpoint payload.
#[derive(Debug, Deserialize)]
struct ProductResponse {
    title: String,
    price: Price,
    image: String,
}

impl TryFrom<ProductResponse> for ProductDetails {
    type Error = LookupError;

    fn try_from(product: ProductResponse) -> Result<Self, Self::Error> {
        if product.price.is_negative() {
            return Err(LookupError::Parse(format!(
                "negative price for {:?}",
                product.title
            )));
        }

        Ok(Self {
            title: product.title,
            price: product.price,
            image: product.image,
        })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the catalog's `/stock` and `/products` endpoints.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    // None when the TTL is zero
    products: Option<Cache<ProductId, ProductDetails>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field(
                "cached_products",
                &self.inner.products.as_ref().map(Cache::entry_count),
            )
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StockApiConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let products = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(PRODUCT_CACHE_CAPACITY)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                products,
            }),
        })
    }

    /// Build the URL of `resource/{id}` beneath the base URL.
    fn endpoint(&self, resource: &str, product_id: ProductId) -> Result<Url, LookupError> {
        Ok(self.inner.base_url.join(&format!("{resource}/{product_id}"))?)
    }

    /// GET a JSON document for a product.
    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        product_id: ProductId,
    ) -> Result<T, LookupError> {
        let url = self.endpoint(resource, product_id)?;

        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = check_status(request.send().await?, product_id).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            LookupError::Parse(e.to_string())
        })
    }
}

/// Map non-success statuses onto `LookupError`.
async fn check_status(response: Response, product_id: ProductId) -> Result<Response, LookupError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(LookupError::NotFound(product_id));
    }

    // Check for rate limiting
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(LookupError::RateLimited(retry_after));
    }

    let message = response.text().await.unwrap_or_default();
    tracing::error!(
        status = %status,
        body = %message.chars().take(500).collect::<String>(),
        "Catalog API returned non-success status"
    );

    Err(LookupError::Api {
        status: status.as_u16(),
        message: message.chars().take(200).collect(),
    })
}

#[async_trait]
impl StockLookupService for ApiClient {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_stock(&self, product_id: ProductId) -> Result<StockInfo, LookupError> {
        let stock: StockResponse = self.fetch("stock", product_id).await?;
        debug!(amount = stock.amount, "Fetched stock");

        Ok(StockInfo {
            amount: stock.amount,
        })
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_product(&self, product_id: ProductId) -> Result<ProductDetails, LookupError> {
        let cache = self.inner.products.as_ref();

        // Check cache
        if let Some(cache) = cache
            && let Some(details) = cache.get(&product_id).await
        {
            debug!("Cache hit for product");
            return Ok(details);
        }

        let product: ProductResponse = self.fetch("products", product_id).await?;
        let details = ProductDetails::try_from(product)?;

        // Cache the result
        if let Some(cache) = cache {
            cache.insert(product_id, details.clone()).await;
        }

        Ok(details)
    }
}

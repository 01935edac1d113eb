//! Remote stock and product lookups.
//!
//! # Architecture
//!
//! - The catalog API is the source of truth for stock; the cart never caches it
//! - Product display metadata (title, price, image) is cached via `moka`
//! - [`StockLookupService`] is the seam the cart store depends on, so tests and
//!   alternative backends can stand in for [`ApiClient`]

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use mockall::automock;
use rocketshoes_core::{ProductDetails, ProductId, StockInfo};
use thiserror::Error;

/// Errors that can occur when querying the catalog API.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API has no record of the product.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned an unexpected status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only queries against the product catalog.
#[automock]
#[async_trait]
pub trait StockLookupService: Send + Sync {
    /// Current available stock for a product.
    async fn get_stock(&self, product_id: ProductId) -> Result<StockInfo, LookupError>;

    /// Display metadata for a product being added to the cart.
    async fn get_product(&self, product_id: ProductId) -> Result<ProductDetails, LookupError>;
}

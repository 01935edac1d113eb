//! Integration test support for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart operations against an in-process catalog
//! - `cart_persistence` - Sessions restored from a storage file
//!
//! The fakes here stand in for the network and the UI so tests can drive a
//! real `CartStore` end to end.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rocketshoes_cart::{CartStore, LookupError, MemoryStore, Notifier, StockLookupService};
use rocketshoes_core::{Price, ProductDetails, ProductId, StockInfo};

/// In-process catalog with adjustable stock levels.
///
/// Products without a stock entry are reported as not found.
#[derive(Debug, Default)]
pub struct StubCatalog {
    stock: Mutex<HashMap<ProductId, u32>>,
    unavailable: Mutex<bool>,
}

impl StubCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog where each `(id, stock)` pair is a known product.
    #[must_use]
    pub fn with_stock(levels: &[(u64, u32)]) -> Self {
        let catalog = Self::new();
        for &(id, amount) in levels {
            catalog.set_stock(ProductId::new(id), amount);
        }
        catalog
    }

    pub fn set_stock(&self, product_id: ProductId, amount: u32) {
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product_id, amount);
    }

    /// Make every lookup fail, as if the catalog API were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap_or_else(PoisonError::into_inner) = unavailable;
    }

    fn check(&self, product_id: ProductId) -> Result<u32, LookupError> {
        if *self.unavailable.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(LookupError::Api {
                status: 503,
                message: "catalog unavailable".to_string(),
            });
        }
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id)
            .copied()
            .ok_or(LookupError::NotFound(product_id))
    }
}

#[async_trait]
impl StockLookupService for StubCatalog {
    async fn get_stock(&self, product_id: ProductId) -> Result<StockInfo, LookupError> {
        let amount = self.check(product_id)?;
        Ok(StockInfo { amount })
    }

    async fn get_product(&self, product_id: ProductId) -> Result<ProductDetails, LookupError> {
        self.check(product_id)?;
        Ok(catalog_details(product_id))
    }
}

/// Metadata the stub catalog reports for `product_id`.
#[must_use]
pub fn catalog_details(product_id: ProductId) -> ProductDetails {
    let id = product_id.as_u64();
    ProductDetails {
        title: format!("Tenis {id}"),
        price: Price::from_cents(i64::try_from(id).unwrap_or(0) * 1000 + 990),
        image: format!("https://cdn.rocketshoes.test/{id}.jpg"),
    }
}

/// Records every notice instead of showing it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// A cart store wired to fakes, with handles to each of them.
pub struct Harness {
    pub store: CartStore,
    pub catalog: Arc<StubCatalog>,
    pub storage: Arc<MemoryStore>,
    pub notices: Arc<RecordingNotifier>,
}

impl Harness {
    /// Open an empty cart over `catalog`.
    #[must_use]
    pub fn new(catalog: StubCatalog) -> Self {
        Self::with_storage(catalog, MemoryStore::new())
    }

    /// Open whatever cart `storage` holds over `catalog`.
    #[must_use]
    pub fn with_storage(catalog: StubCatalog, storage: MemoryStore) -> Self {
        let catalog = Arc::new(catalog);
        let storage = Arc::new(storage);
        let notices = Arc::new(RecordingNotifier::new());

        let store = CartStore::open(
            catalog.clone(),
            storage.clone(),
            notices.clone(),
            rocketshoes_cart::DEFAULT_STORAGE_KEY,
        );

        Self {
            store,
            catalog,
            storage,
            notices,
        }
    }

    /// Amount of `id` in the cart, zero if absent.
    #[must_use]
    pub fn amount(&self, id: u64) -> u32 {
        self.store
            .cart()
            .get(ProductId::new(id))
            .map_or(0, |item| item.amount)
    }
}

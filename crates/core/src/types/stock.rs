//! Values reported by the remote product catalog.

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Available stock for a product.
///
/// Always fetched fresh before a cart mutation; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Units available for purchase.
    pub amount: u32,
}

impl StockInfo {
    /// Whether `quantity` units can be held in a cart.
    #[must_use]
    pub fn covers(&self, quantity: u64) -> bool {
        quantity <= u64::from(self.amount)
    }
}

/// Display metadata copied into a new cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
}

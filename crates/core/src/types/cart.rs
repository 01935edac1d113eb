//! Cart and line item types.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, one per product, in the
//! order the products were first added. Its JSON form (a bare array of line
//! items) is the snapshot written to persistent storage, so field names here
//! are part of the storage format.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductDetails, ProductId};

/// Reasons a stored snapshot is rejected.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("line item for product {0} has zero amount")]
    ZeroAmount(ProductId),
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    #[error("line item for product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// One distinct product in the cart plus the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Requested quantity, always at least 1.
    pub amount: u32,
}

impl LineItem {
    /// Create a line item holding a single unit of a product.
    #[must_use]
    pub fn first_unit(id: ProductId, details: ProductDetails) -> Self {
        Self {
            id,
            title: details.title,
            price: details.price,
            image: details.image,
            amount: 1,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// The ordered collection of line items for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Parse and validate a stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the text is not a JSON array of line items,
    /// if any line has a zero amount or a negative price, or if a product
    /// appears twice.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, SnapshotError> {
        let cart: Self = serde_json::from_str(snapshot)?;
        cart.validate()?;
        Ok(cart)
    }

    /// Serialize to the stored snapshot format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Check the one-line-per-product, non-zero amount and non-negative price invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.amount == 0 {
                return Err(SnapshotError::ZeroAmount(item.id));
            }
            if item.price.is_negative() {
                return Err(SnapshotError::NegativePrice(item.id));
            }
            if !seen.insert(item.id) {
                return Err(SnapshotError::DuplicateProduct(item.id));
            }
        }
        Ok(())
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the product has a line in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Append a line for a product that is not yet in the cart.
    ///
    /// Returns `false` (and leaves the cart untouched) if the product already
    /// has a line or the item's amount is zero.
    pub fn push(&mut self, item: LineItem) -> bool {
        if item.amount == 0 || self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Set the amount of an existing line.
    ///
    /// Returns `false` if the product has no line or `amount` is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove the whole line for a product.
    pub fn remove(&mut self, id: ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details(title: &str, cents: i64) -> ProductDetails {
        ProductDetails {
            title: title.to_string(),
            price: Price::from_cents(cents),
            image: format!("https://cdn.example.com/{title}.jpg"),
        }
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.push(LineItem::first_unit(ProductId::new(1), details("sneaker", 17990)));
        cart.push(LineItem::first_unit(ProductId::new(2), details("runner", 13900)));
        cart.set_amount(ProductId::new(2), 2);
        cart
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let cart = sample_cart();
        let snapshot = cart.to_snapshot().unwrap();
        let restored = Cart::from_snapshot(&snapshot).unwrap();

        assert_eq!(restored, cart);
        let ids: Vec<_> = restored.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2)]);
    }

    #[test]
    fn test_snapshot_is_bare_array_with_storage_field_names() {
        let mut cart = Cart::new();
        cart.push(LineItem::first_unit(ProductId::new(7), details("boot", 5000)));

        let value: serde_json::Value = serde_json::from_str(&cart.to_snapshot().unwrap()).unwrap();
        let expected = serde_json::json!([{
            "id": 7,
            "title": "boot",
            "price": 50.0,
            "image": "https://cdn.example.com/boot.jpg",
            "amount": 1
        }]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_from_snapshot_rejects_garbage() {
        assert!(matches!(
            Cart::from_snapshot("{not json"),
            Err(SnapshotError::Malformed(_))
        ));
        assert!(matches!(
            Cart::from_snapshot(r#"{"id": 1}"#),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_snapshot_rejects_zero_amount() {
        let snapshot = r#"[{"id":1,"title":"a","price":1,"image":"x","amount":0}]"#;
        assert!(matches!(
            Cart::from_snapshot(snapshot),
            Err(SnapshotError::ZeroAmount(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_from_snapshot_rejects_duplicates() {
        let snapshot = r#"[
            {"id":1,"title":"a","price":1,"image":"x","amount":1},
            {"id":1,"title":"a","price":1,"image":"x","amount":2}
        ]"#;
        assert!(matches!(
            Cart::from_snapshot(snapshot),
            Err(SnapshotError::DuplicateProduct(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_from_snapshot_rejects_negative_price() {
        let snapshot = r#"[{"id":3,"title":"a","price":-10.5,"image":"x","amount":1}]"#;
        assert!(matches!(
            Cart::from_snapshot(snapshot),
            Err(SnapshotError::NegativePrice(id)) if id == ProductId::new(3)
        ));
    }

    #[test]
    fn test_totals_of_huge_prices_do_not_overflow() {
        let snapshot = r#"[
            {"id":1,"title":"a","price":50000000000000000000000000000,"image":"x","amount":2},
            {"id":2,"title":"b","price":50000000000000000000000000000,"image":"x","amount":1}
        ]"#;
        let cart = Cart::from_snapshot(snapshot).unwrap();

        let first = cart.get(ProductId::new(1)).unwrap();
        assert!(first.subtotal() > first.price);
        assert_eq!(cart.total(), first.subtotal());
    }

    #[test]
    fn test_push_refuses_duplicate_line() {
        let mut cart = sample_cart();
        let pushed = cart.push(LineItem::first_unit(ProductId::new(1), details("again", 1)));

        assert!(!pushed);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().title, "sneaker");
    }

    #[test]
    fn test_set_amount_refuses_zero_and_missing() {
        let mut cart = sample_cart();

        assert!(!cart.set_amount(ProductId::new(1), 0));
        assert!(!cart.set_amount(ProductId::new(99), 4));
        assert!(cart.set_amount(ProductId::new(1), 4));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 4);
    }

    #[test]
    fn test_remove_drops_whole_line() {
        let mut cart = sample_cart();

        let removed = cart.remove(ProductId::new(2)).unwrap();
        assert_eq!(removed.amount, 2);
        assert!(!cart.contains(ProductId::new(2)));
        assert!(cart.remove(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart = sample_cart();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total(), Price::from_cents(17990 + 2 * 13900));
    }
}

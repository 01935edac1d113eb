//! The cart store.
//!
//! [`CartStore`] owns the session's [`Cart`] and is the only thing that
//! mutates it. Each operation is a read-validate-write transaction:
//!
//! 1. Validate the request against the current cart
//! 2. Ask the catalog for live stock (and metadata, for new lines)
//! 3. Build the candidate cart and save its snapshot
//! 4. Only then replace the in-memory cart and notify subscribers
//!
//! A failure at any step leaves both the cart and the stored snapshot
//! untouched, and the failure is reported to the [`Notifier`] before the error
//! is returned. Mutations take `&mut self`, so a caller cannot start a second
//! operation on the same store while one is suspended on the network.

use std::sync::Arc;

use rocketshoes_core::{Cart, LineItem, ProductId};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::{CartError, CartOperation};
use crate::lookup::StockLookupService;
use crate::notify::Notifier;
use crate::storage::PersistentStore;

/// Storage key the cart snapshot is kept under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Request to set a line's quantity.
///
/// `amount` is caller-supplied and may be zero or negative, in which case the
/// request is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Stock-validated, write-through owner of a session cart.
pub struct CartStore {
    cart: Cart,
    storage_key: String,
    lookup: Arc<dyn StockLookupService>,
    storage: Arc<dyn PersistentStore>,
    notifier: Arc<dyn Notifier>,
    updates: watch::Sender<Cart>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the session cart stored under `storage_key`.
    ///
    /// A missing snapshot yields an empty cart. A snapshot that cannot be read
    /// or fails validation is discarded with a warning and also yields an
    /// empty cart; it is overwritten by the first successful mutation.
    pub fn open(
        lookup: Arc<dyn StockLookupService>,
        storage: Arc<dyn PersistentStore>,
        notifier: Arc<dyn Notifier>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let cart = restore(storage.as_ref(), &storage_key);
        let (updates, _) = watch::channel(cart.clone());

        Self {
            cart,
            storage_key,
            lookup,
            storage,
            notifier,
            updates,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Key the snapshot is stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Watch the cart. The receiver sees every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.updates.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart gets a new line with amount 1, using
    /// metadata from the catalog. A product already in the cart has its amount
    /// incremented, provided the current amount is below available stock.
    ///
    /// # Errors
    ///
    /// - `InsufficientStock` if stock cannot cover one more unit
    /// - `AddFailed` if the catalog lookup or the snapshot save fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_add_product(product_id).await;
        self.report(result)
    }

    /// Remove a product's line entirely, whatever its amount.
    ///
    /// # Errors
    ///
    /// - `ProductNotInCart` if the product has no line
    /// - `RemoveFailed` if the snapshot save fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_remove_product(product_id);
        self.report(result)
    }

    /// Set a line's amount to an absolute value.
    ///
    /// Amounts of zero or less are ignored without error.
    ///
    /// # Errors
    ///
    /// - `ProductNotInCart` if the product has no line
    /// - `InsufficientStock` if the amount exceeds available stock
    /// - `UpdateFailed` if the catalog lookup or the snapshot save fails
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let result = self.try_update_product_amount(update).await;
        self.report(result)
    }

    async fn try_add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let stock = self
            .lookup
            .get_stock(product_id)
            .await
            .map_err(|e| CartError::failed(CartOperation::Add, product_id, e))?;

        let current = self.cart.get(product_id).map_or(0, |item| item.amount);
        if current >= stock.amount {
            return Err(CartError::InsufficientStock {
                product_id,
                requested: u64::from(current) + 1,
                available: stock.amount,
            });
        }

        let mut next = self.cart.clone();
        if current == 0 {
            let details = self
                .lookup
                .get_product(product_id)
                .await
                .map_err(|e| CartError::failed(CartOperation::Add, product_id, e))?;
            next.push(LineItem::first_unit(product_id, details));
        } else {
            next.set_amount(product_id, current + 1);
        }

        self.commit(next, CartOperation::Add, product_id)
    }

    fn try_remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let mut next = self.cart.clone();
        if next.remove(product_id).is_none() {
            return Err(CartError::ProductNotInCart {
                operation: CartOperation::Remove,
                product_id,
            });
        }

        self.commit(next, CartOperation::Remove, product_id)
    }

    async fn try_update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = update;

        let Ok(requested) = u64::try_from(amount) else {
            debug!("Ignoring negative amount");
            return Ok(());
        };
        if requested == 0 {
            debug!("Ignoring zero amount");
            return Ok(());
        }

        if !self.cart.contains(product_id) {
            return Err(CartError::ProductNotInCart {
                operation: CartOperation::Update,
                product_id,
            });
        }

        let stock = self
            .lookup
            .get_stock(product_id)
            .await
            .map_err(|e| CartError::failed(CartOperation::Update, product_id, e))?;

        let insufficient = || CartError::InsufficientStock {
            product_id,
            requested,
            available: stock.amount,
        };
        if !stock.covers(requested) {
            return Err(insufficient());
        }
        // Covered by a u32 stock level, so this always fits
        let amount = u32::try_from(requested).map_err(|_| insufficient())?;

        let mut next = self.cart.clone();
        next.set_amount(product_id, amount);

        self.commit(next, CartOperation::Update, product_id)
    }

    /// Save `next` and, once durable, make it the current cart.
    fn commit(
        &mut self,
        next: Cart,
        operation: CartOperation,
        product_id: ProductId,
    ) -> Result<(), CartError> {
        let snapshot = next
            .to_snapshot()
            .map_err(|e| CartError::failed(operation, product_id, e))?;

        self.storage
            .save(&self.storage_key, &snapshot)
            .map_err(|e| CartError::failed(operation, product_id, e))?;

        self.cart = next;
        self.updates.send_replace(self.cart.clone());

        debug!(
            %operation,
            lines = self.cart.len(),
            quantity = self.cart.total_quantity(),
            "Cart committed"
        );
        Ok(())
    }

    /// Log and notify the user of a failed operation.
    fn report(&self, result: Result<(), CartError>) -> Result<(), CartError> {
        if let Err(e) = &result {
            if e.is_rejection() {
                warn!(error = %e, "Cart operation rejected");
            } else {
                tracing::error!(
                    error = %e,
                    cause = %std::error::Error::source(e).map(ToString::to_string).unwrap_or_default(),
                    "Cart operation failed"
                );
            }
            self.notifier.notify(e.user_message());
        }
        result
    }
}

/// Load the stored snapshot, falling back to an empty cart.
fn restore(storage: &dyn PersistentStore, key: &str) -> Cart {
    let snapshot = match storage.load(key) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, key, "Could not read cart snapshot, starting empty");
            return Cart::new();
        }
    };

    match Cart::from_snapshot(&snapshot) {
        Ok(cart) => {
            debug!(lines = cart.len(), key, "Restored cart snapshot");
            cart
        }
        Err(e) => {
            warn!(error = %e, key, "Discarding invalid cart snapshot");
            Cart::new()
        }
    }
}

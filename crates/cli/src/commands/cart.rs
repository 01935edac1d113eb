//! Cart commands.
//!
//! # Environment Variables
//!
//! - `ROCKETSHOES_API_URL` - Catalog API base URL (required)
//! - `ROCKETSHOES_STORAGE_PATH` - Storage file holding the cart snapshot
//! - `ROCKETSHOES_CURRENCY` - Currency used when printing prices

use std::io::{self, Write};
use std::sync::Arc;

use rocketshoes_cart::{
    ApiClient, CartConfig, CartStore, FileStore, Notifier, UpdateProductAmount,
};
use rocketshoes_core::{Cart, CurrencyCode, ProductId};

use super::CommandError;

/// Prints notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        // Nowhere left to report a failed write to the terminal
        let _ = writeln!(io::stderr().lock(), "{message}");
    }
}

/// Open the session cart described by `config`.
fn open_store(config: &CartConfig) -> Result<CartStore, CommandError> {
    let lookup = ApiClient::new(&config.api)?;
    let storage = FileStore::new(&config.storage_path);

    let path = storage.path().to_path_buf();
    let store = CartStore::open(
        Arc::new(lookup),
        Arc::new(storage),
        Arc::new(ConsoleNotifier),
        config.storage_key.clone(),
    );

    tracing::debug!(
        path = %path.display(),
        key = store.storage_key(),
        lines = store.cart().len(),
        "Opened cart"
    );
    Ok(store)
}

/// Print the cart.
pub fn show(config: &CartConfig) -> Result<(), CommandError> {
    let store = open_store(config)?;
    render(&mut io::stdout().lock(), store.cart(), config.currency)?;
    Ok(())
}

/// Add one unit of `product_id` and print the resulting cart.
pub async fn add(config: &CartConfig, product_id: ProductId) -> Result<(), CommandError> {
    let mut store = open_store(config)?;
    store.add_product(product_id).await?;

    tracing::info!(%product_id, "Product added to cart");
    render(&mut io::stdout().lock(), store.cart(), config.currency)?;
    Ok(())
}

/// Remove `product_id` and print the resulting cart.
pub fn remove(config: &CartConfig, product_id: ProductId) -> Result<(), CommandError> {
    let mut store = open_store(config)?;
    store.remove_product(product_id)?;

    tracing::info!(%product_id, "Product removed from cart");
    render(&mut io::stdout().lock(), store.cart(), config.currency)?;
    Ok(())
}

/// Set the amount of `product_id` and print the resulting cart.
pub async fn update(
    config: &CartConfig,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CommandError> {
    let mut store = open_store(config)?;
    store
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await?;

    render(&mut io::stdout().lock(), store.cart(), config.currency)?;
    Ok(())
}

/// Write a human-readable listing of `cart`.
fn render(out: &mut impl Write, cart: &Cart, currency: CurrencyCode) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty");
    }

    for item in cart.items() {
        writeln!(
            out,
            "{:>6}  {:<32} {:>4} x {:>10} = {:>10}",
            item.id.as_u64(),
            item.title,
            item.amount,
            item.price.format(currency),
            item.subtotal().format(currency),
        )?;
    }

    // Distinct products, like the cart badge
    let count = cart.len();
    writeln!(
        out,
        "{} {} | Total: {}",
        count,
        if count == 1 { "item" } else { "items" },
        cart.total().format(currency),
    )
}

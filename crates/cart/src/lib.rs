//! RocketShoes cart library.
//!
//! Owns the session's shopping cart: every mutation is validated against live
//! stock levels and written through to durable storage before it becomes
//! visible.
//!
//! # Modules
//!
//! - [`store`] - `CartStore`, the only way to mutate a cart
//! - [`lookup`] - Stock and product lookups (`StockLookupService`, HTTP `ApiClient`)
//! - [`storage`] - Key-value snapshot storage (`PersistentStore`, `FileStore`, `MemoryStore`)
//! - [`notify`] - User-facing outcome messages (`Notifier`)
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Cart operation errors
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocketshoes_cart::{ApiClient, CartConfig, CartStore, FileStore, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let mut store = CartStore::open(
//!     Arc::new(ApiClient::new(&config.api)?),
//!     Arc::new(FileStore::new(&config.storage_path)),
//!     Arc::new(TracingNotifier),
//!     config.storage_key.clone(),
//! );
//!
//! store.add_product(ProductId::new(7)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod lookup;
pub mod notify;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, StockApiConfig};
pub use error::{CartError, CartOperation, FailureCause};
pub use lookup::{ApiClient, LookupError, StockLookupService};
pub use notify::{Notifier, TracingNotifier};
pub use storage::{FileStore, MemoryStore, PersistentStore, StorageError};
pub use store::{CartStore, DEFAULT_STORAGE_KEY, UpdateProductAmount};

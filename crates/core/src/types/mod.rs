//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod stock;

pub use cart::{Cart, LineItem, SnapshotError};
pub use id::*;
pub use price::{CurrencyCode, CurrencyCodeError, Price};
pub use stock::{ProductDetails, StockInfo};

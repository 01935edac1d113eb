//! RocketShoes Core - Shared cart domain types.
//!
//! This crate provides the types used across all RocketShoes components:
//! - `cart` - The cart store and its collaborators (stock API, storage, notices)
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, line items, carts, and stock levels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

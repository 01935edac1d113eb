//! CLI command implementations.

pub mod cart;

use rocketshoes_cart::{CartError, ConfigError, LookupError};
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog client could not be built.
    #[error("Catalog client error: {0}")]
    Client(#[from] LookupError),

    /// A cart operation was rejected or failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Writing to the terminal failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl CommandError {
    /// Whether the error has already been logged and shown to the user.
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Cart(_))
    }
}

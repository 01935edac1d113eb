//! Cart operation errors.
//!
//! Business-rule rejections (`InsufficientStock`, `ProductNotInCart`) are kept
//! apart from infrastructure failures, which are wrapped per operation
//! (`AddFailed`, `RemoveFailed`, `UpdateFailed`) with the underlying cause.
//! Every variant maps to a short message suitable for showing the user.

use std::fmt;

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::lookup::LookupError;
use crate::storage::StorageError;

/// The three cart mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        })
    }
}

/// Why an operation failed for reasons other than a business rule.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The catalog could not be queried.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// The snapshot could not be written.
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error returned by a cart operation.
///
/// Whatever the variant, the cart and its stored snapshot are left exactly as
/// they were before the call.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity exceeds available stock.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The operation targets a product with no line in the cart.
    #[error("cannot {operation} product {product_id}: not in cart")]
    ProductNotInCart {
        operation: CartOperation,
        product_id: ProductId,
    },

    #[error("failed to add product {product_id}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    #[error("failed to remove product {product_id}")]
    RemoveFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    #[error("failed to update product {product_id}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },
}

impl CartError {
    /// Wrap an infrastructure failure for the given operation.
    pub(crate) fn failed(
        operation: CartOperation,
        product_id: ProductId,
        cause: impl Into<FailureCause>,
    ) -> Self {
        let cause = cause.into();
        match operation {
            CartOperation::Add => Self::AddFailed { product_id, cause },
            CartOperation::Remove => Self::RemoveFailed { product_id, cause },
            CartOperation::Update => Self::UpdateFailed { product_id, cause },
        }
    }

    /// Whether this is a business-rule rejection rather than a failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InsufficientStock { .. } | Self::ProductNotInCart { .. }
        )
    }

    /// The catalog error behind a failed lookup, if that is what went wrong.
    #[must_use]
    pub const fn lookup_error(&self) -> Option<&LookupError> {
        match self {
            Self::AddFailed {
                cause: FailureCause::Lookup(e),
                ..
            }
            | Self::RemoveFailed {
                cause: FailureCause::Lookup(e),
                ..
            }
            | Self::UpdateFailed {
                cause: FailureCause::Lookup(e),
                ..
            } => Some(e),
            _ => None,
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "Requested quantity is out of stock",
            // Adding never requires an existing line; the pattern keeps the match exhaustive
            Self::AddFailed { .. }
            | Self::ProductNotInCart {
                operation: CartOperation::Add,
                ..
            } => "Failed to add product",
            Self::RemoveFailed { .. }
            | Self::ProductNotInCart {
                operation: CartOperation::Remove,
                ..
            } => "Failed to remove product",
            Self::UpdateFailed { .. }
            | Self::ProductNotInCart {
                operation: CartOperation::Update,
                ..
            } => "Failed to change product quantity",
        }
    }
}

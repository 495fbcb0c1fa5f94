//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in commerce operations outside the cart reducer.
///
/// The reducer itself never fails; it reports rejections through
/// [`crate::pos::Outcome`]. These errors cover checkout and catalog access.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Checkout attempted with no lines.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Cash tendered does not cover the total.
    #[error("Insufficient tender: total {total}, tendered {tendered}")]
    InsufficientTender { total: String, tendered: String },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// The external order service refused or failed.
    #[error("Order service error: {0}")]
    OrderService(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

//! Checkout and account error types.

use domain::{OrderError, OrderId, ValidationError};
use store::StoreError;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors that can occur while placing or managing orders.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request was rejected before anything was changed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A line could not be covered under the strict stock policy.
    #[error("Insufficient stock for {product}")]
    OutOfStock { product: String },

    /// Resolving or creating the customer's account failed.
    #[error("Error creating user account: {0}")]
    Account(#[source] AccountError),

    /// Order not found.
    #[error("Order not found")]
    OrderNotFound(OrderId),

    /// Another request changed the order's status first.
    #[error("Order status was changed by another request")]
    StatusConflict(OrderId),

    /// An order rule was broken (e.g. an illegal status change).
    #[error("{0}")]
    Order(#[from] OrderError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CheckoutError {
    pub fn validation(message: impl Into<String>) -> Self {
        CheckoutError::Validation(ValidationError::new(message))
    }

    /// True when the underlying cause is an unreachable database.
    pub fn is_unavailable(&self) -> bool {
        match self {
            CheckoutError::Store(e) => e.is_unavailable(),
            CheckoutError::Account(e) => e.is_unavailable(),
            _ => false,
        }
    }

    /// Short label used on the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            CheckoutError::Validation(_) => "validation",
            CheckoutError::OutOfStock { .. } => "out_of_stock",
            CheckoutError::Account(_) => "account",
            CheckoutError::OrderNotFound(_) => "not_found",
            CheckoutError::StatusConflict(_) => "conflict",
            CheckoutError::Order(_) => "order",
            CheckoutError::Store(_) => "store",
        }
    }
}

/// Errors from the account service.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("User with this email already exists")]
    EmailExists,

    #[error("Email is already taken by another account")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AccountError {
    pub fn validation(message: impl Into<String>) -> Self {
        AccountError::Validation(ValidationError::new(message))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, AccountError::Store(e) if e.is_unavailable())
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

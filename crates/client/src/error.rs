//! Client error types.

use domain::ValidationError;
use thiserror::Error;

/// Shown when the order could not be placed and the server gave no reason.
pub const GENERIC_FAILURE: &str = "An error occurred while placing your order. Please try again.";

/// Shown when checkout is attempted with nothing in the cart.
pub const EMPTY_CART: &str = "Your cart is empty!";

/// Cart mutation and storage errors.
#[derive(Debug, Error)]
pub enum CartError {
    /// The item has no usable price; the cart was not changed.
    #[error("Invalid price for {name}")]
    InvalidPrice { name: String },

    #[error("Cart storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored cart state could not be parsed.
    #[error("Stored cart is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Cart storage error: {0}")]
    Storage(String),
}

/// Transport-level checkout failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Checkout rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// The server's own explanation, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// Why a checkout did not go through. The display text is meant for the
/// shopper.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{}", EMPTY_CART)]
    EmptyCart,

    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// The server refused the order and said why.
    #[error("{0}")]
    Rejected(String),

    /// Transport failure or an unexplained refusal.
    #[error("{}", GENERIC_FAILURE)]
    Failed(#[source] GatewayError),
}

impl From<GatewayError> for SubmitError {
    fn from(err: GatewayError) -> Self {
        match err.server_message() {
            Some(message) => SubmitError::Rejected(message.to_string()),
            None => SubmitError::Failed(err),
        }
    }
}

//! Placed orders and their status.

mod model;
mod state;

pub use model::{Order, OrderLine, PaymentMethod};
pub use state::OrderStatus;

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The requested status change is not allowed.
    #[error("Invalid status transition: cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Order has no items.
    #[error("Order has no items")]
    NoItems,
}

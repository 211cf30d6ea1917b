//! HTTP route handlers.

pub mod auth;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use serde::Serialize;

/// Wraps a payload in the `{ success: true, ... }` envelope.
#[derive(Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

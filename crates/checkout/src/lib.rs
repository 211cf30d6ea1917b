//! Server-side checkout for the storefront.
//!
//! [`OrderReconciler`] turns a checkout submission into a customer account,
//! a persisted order and stock decrements. Stock is taken with one
//! conditional decrement per line; under [`StockPolicy::Strict`] a shortfall
//! gives back everything already taken, line by line.
//!
//! [`AccountService`] covers registration, login and profile changes, and
//! [`OrderService`] the lookups and status changes after placement.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod orders;
pub mod reconciler;

pub use accounts::{
    AccountService, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest,
    ResolvedCustomer, Session,
};
pub use auth::{AuthError, Claims, PasswordHashing, TokenIssuer};
pub use error::{AccountError, CheckoutError, Result};
pub use orders::{OrderDetail, OrderService};
pub use reconciler::{OrderReconciler, Placement, StockPolicy};

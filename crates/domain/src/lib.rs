//! Domain layer for the storefront.
//!
//! This crate holds the types and rules shared by the server and the client:
//! - `Money` and the pricing rules (shipping threshold, tax)
//! - Catalog items, customer accounts and addresses
//! - Orders and their status state machine
//! - The checkout wire payload and payment-detail validation

pub mod account;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod pricing;

pub use account::{Address, CustomerAccount, PublicUser, Role, normalize_email};
pub use catalog::{CatalogItem, Category, GrindOption, RoastLevel};
pub use checkout::{CheckoutItem, CheckoutRequest, CustomerInfo, DEFAULT_COUNTRY};
pub use common::{CustomerId, OrderId, ProductId};
pub use error::ValidationError;
pub use money::Money;
pub use order::{Order, OrderError, OrderLine, OrderStatus, PaymentMethod};
pub use payment::{PaymentDetails, validate_card, validate_payment};
pub use pricing::{PricingPolicy, Totals, quote};

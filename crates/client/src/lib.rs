//! Storefront client: the cart and the checkout submitter.
//!
//! [`Cart`] keeps line items and derives totals with the same pricing rules
//! the server uses. It mirrors itself to a [`CartStorage`] after every
//! change. [`CheckoutSubmitter`] validates, sends one request through a
//! [`CheckoutGateway`] and empties the cart only when the order is placed.

pub mod cart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod storage;
pub mod submitter;

pub use cart::{Cart, LineItem};
pub use config::ClientConfig;
pub use error::{CartError, GatewayError, SubmitError};
pub use gateway::{CheckoutGateway, HttpGateway};
pub use storage::{CartStorage, FileCartStorage, MemoryCartStorage};
pub use submitter::{CheckoutSubmitter, Payment, build_request};

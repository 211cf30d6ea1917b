//! Persistence for the storefront.
//!
//! Three narrow traits ([`CatalogStore`], [`AccountStore`], [`OrderStore`])
//! are combined under [`Store`]. [`InMemoryStore`] backs tests and the
//! no-database mode; [`PostgresStore`] is the production implementation.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod seed;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{OrderFilter, ProductQuery};
pub use store::{AccountChanges, AccountStore, CatalogStore, OrderStore, StockUpdate, Store};

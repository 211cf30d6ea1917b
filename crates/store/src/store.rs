use async_trait::async_trait;

use domain::{
    Address, CatalogItem, CustomerAccount, CustomerId, Order, OrderId, OrderStatus, ProductId,
};

use crate::{OrderFilter, ProductQuery, Result};

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// Stock was decremented; `remaining` is what is left.
    Applied { remaining: u32 },
    /// Not enough on hand; nothing changed.
    Insufficient { available: u32 },
    /// No such product.
    NotFound,
}

impl StockUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, StockUpdate::Applied { .. })
    }
}

/// Profile fields to overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    /// Must already be normalized.
    pub email: Option<String>,
    pub addresses: Option<Vec<Address>>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.addresses.is_none()
    }
}

/// Product catalog persistence.
///
/// Stock is only ever changed through `decrement_stock` and `restock`, and
/// never goes negative.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists products matching the query, newest first.
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<CatalogItem>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<CatalogItem>>;

    async fn insert_product(&self, item: &CatalogItem) -> Result<()>;

    /// Atomically removes `quantity` units if at least that many are on hand.
    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<StockUpdate>;

    /// Puts `quantity` units back.
    async fn restock(&self, id: ProductId, quantity: u32) -> Result<()>;
}

/// Customer account persistence. Emails are unique case-insensitively.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<CustomerAccount>>;

    async fn get_account(&self, id: CustomerId) -> Result<Option<CustomerAccount>>;

    /// Fails with `DuplicateEmail` when the email is taken.
    async fn insert_account(&self, account: &CustomerAccount) -> Result<()>;

    /// Writes only the fields set in `changes` and returns the stored
    /// account. Fails with `DuplicateEmail` when the new email is taken.
    async fn update_account(
        &self,
        id: CustomerId,
        changes: &AccountChanges,
    ) -> Result<CustomerAccount>;

    async fn set_password_hash(&self, id: CustomerId, password_hash: &str) -> Result<()>;

    /// Appends `address` unless one at the same (street, city) is already on
    /// file, as a single atomic step. Returns whether it was appended.
    async fn append_address(&self, id: CustomerId, address: &Address) -> Result<bool>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<()>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders matching the filter, newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// Persists a status change and the line flags that go with it, but only
    /// if the stored status is still `expected`. Otherwise fails with
    /// `ConcurrencyConflict` and writes nothing.
    async fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<()>;
}

/// Everything the storefront persists, behind one handle.
#[async_trait]
pub trait Store: CatalogStore + AccountStore + OrderStore {
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

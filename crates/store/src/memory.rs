use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::{
    Address, CatalogItem, CustomerAccount, CustomerId, Order, OrderId, OrderStatus, ProductId,
    normalize_email,
};

use crate::{
    OrderFilter, ProductQuery, Result, StoreError,
    store::{AccountChanges, AccountStore, CatalogStore, OrderStore, StockUpdate, Store},
};

/// In-memory store implementation.
///
/// Used when no database is configured and in tests. Each collection sits
/// behind its own lock; a stock decrement is a single write-lock critical
/// section, which makes it as atomic as the conditional SQL update.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<RwLock<HashMap<ProductId, CatalogItem>>>,
    accounts: Arc<RwLock<HashMap<CustomerId, CustomerAccount>>>,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all collections.
    pub async fn clear(&self) {
        self.products.write().await.clear();
        self.accounts.write().await.clear();
        self.orders.write().await.clear();
    }
}

fn email_taken(
    accounts: &HashMap<CustomerId, CustomerAccount>,
    email: &str,
    except: Option<CustomerId>,
) -> bool {
    let email = normalize_email(email);
    accounts
        .values()
        .any(|a| a.email == email && Some(a.id) != except)
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<CatalogItem>> {
        let products = self.products.read().await;
        let mut items: Vec<_> = products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<CatalogItem>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn insert_product(&self, item: &CatalogItem) -> Result<()> {
        self.products.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<StockUpdate> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(StockUpdate::NotFound);
        };
        if product.stock < quantity {
            return Ok(StockUpdate::Insufficient {
                available: product.stock,
            });
        }
        product.stock -= quantity;
        Ok(StockUpdate::Applied {
            remaining: product.stock,
        })
    }

    async fn restock(&self, id: ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.stock = product.stock.saturating_add(quantity);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<CustomerAccount>> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn get_account(&self, id: CustomerId) -> Result<Option<CustomerAccount>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn insert_account(&self, account: &CustomerAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if email_taken(&accounts, &account.email, None) {
            return Err(StoreError::DuplicateEmail(account.email.clone()));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_account(
        &self,
        id: CustomerId,
        changes: &AccountChanges,
    ) -> Result<CustomerAccount> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&id) {
            return Err(StoreError::not_found("Account", id));
        }
        if let Some(email) = &changes.email
            && email_taken(&accounts, email, Some(id))
        {
            return Err(StoreError::DuplicateEmail(email.clone()));
        }
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Account", id))?;
        if let Some(name) = &changes.name {
            account.name = name.clone();
        }
        if let Some(email) = &changes.email {
            account.email = email.clone();
        }
        if let Some(addresses) = &changes.addresses {
            account.addresses = addresses.clone();
        }
        Ok(account.clone())
    }

    async fn set_password_hash(&self, id: CustomerId, password_hash: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Account", id))?;
        account.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn append_address(&self, id: CustomerId, address: &Address) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Account", id))?;
        Ok(account.remember_address(address.clone()))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<_> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let mut orders = self.orders.write().await;
        let slot = orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::not_found("Order", order.id))?;
        if slot.status != expected {
            return Err(StoreError::ConcurrencyConflict {
                entity: "Order",
                id: order.id.to_string(),
                expected: expected.to_string(),
            });
        }
        *slot = order.clone();
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

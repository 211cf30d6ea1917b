//! Order lookups and status changes after placement.

use serde::Serialize;

use domain::{Money, Order, OrderId, OrderStatus, ProductId};
use store::{OrderFilter, Store, StoreError};

use crate::error::{CheckoutError, Result};

/// Who placed an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
}

/// The catalog's current view of an ordered product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
}

/// An order together with its customer and the products as they are now.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<CustomerSummary>,
    /// Products still in the catalog, in line order.
    pub products: Vec<ProductSummary>,
}

#[derive(Clone)]
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.store
            .get_order(id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn order_detail(&self, id: OrderId) -> Result<OrderDetail> {
        let order = self.get_order(id).await?;

        let customer = self
            .store
            .get_account(order.customer_id)
            .await?
            .map(|account| CustomerSummary {
                name: account.name,
                email: account.email,
            });

        let mut products = Vec::with_capacity(order.items.len());
        for line in &order.items {
            if let Some(product) = self.store.get_product(line.product_id).await? {
                products.push(ProductSummary {
                    product_id: product.id,
                    name: product.name,
                    price: product.price,
                });
            }
        }

        Ok(OrderDetail {
            order,
            customer,
            products,
        })
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        Ok(self.store.list_orders(filter).await?)
    }

    /// Moves an order along the status state machine. Cancelling gives back
    /// the stock its committed lines took.
    ///
    /// The write only lands if the stored status is still the one read
    /// here, and stock is given back only after it lands, so concurrent
    /// cancels restock once.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self.get_order(id).await?;
        let previous = order.status;
        order.transition_to(status)?;

        let mut released = Vec::new();
        if status == OrderStatus::Cancelled {
            for line in order.items.iter_mut().filter(|l| l.stock_committed) {
                line.stock_committed = false;
                released.push((line.product_id, line.quantity));
            }
        }

        self.store
            .update_order(&order, previous)
            .await
            .map_err(|e| match e {
                StoreError::ConcurrencyConflict { .. } => CheckoutError::StatusConflict(id),
                StoreError::NotFound { .. } => CheckoutError::OrderNotFound(id),
                other => other.into(),
            })?;

        // The order no longer claims this stock, so a failed restock is
        // logged for manual correction rather than retried.
        for (product_id, quantity) in released {
            if let Err(e) = self.store.restock(product_id, quantity).await {
                tracing::error!(
                    order_id = %id,
                    %product_id,
                    quantity,
                    "failed to restock cancelled order line: {e}"
                );
            }
        }

        tracing::info!(order_id = %id, %status, "order status updated");
        Ok(order)
    }
}

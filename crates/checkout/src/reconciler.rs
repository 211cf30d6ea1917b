//! Turns a checkout submission into an account, an order and stock updates.

use std::str::FromStr;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use domain::{
    CatalogItem, CheckoutItem, CheckoutRequest, Order, OrderLine, PricingPolicy,
};
use store::{StockUpdate, Store};

use crate::accounts::AccountService;
use crate::error::{CheckoutError, Result};

/// What to do when a line cannot be covered by stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockPolicy {
    /// Reject the checkout and put back whatever was already taken.
    #[default]
    Strict,
    /// Place the order anyway and flag the line as uncommitted.
    BestEffort,
}

impl StockPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::Strict => "strict",
            StockPolicy::BestEffort => "best-effort",
        }
    }
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(StockPolicy::Strict),
            "best-effort" | "best_effort" => Ok(StockPolicy::BestEffort),
            other => Err(format!("unknown stock policy: {other}")),
        }
    }
}

impl std::fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully placed order.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order: Order,
    /// The customer had no account before this checkout.
    pub account_created: bool,
}

/// Runs checkouts against a [`Store`].
#[derive(Clone)]
pub struct OrderReconciler<S: Store> {
    store: S,
    accounts: AccountService<S>,
    pricing: PricingPolicy,
    policy: StockPolicy,
}

impl<S> OrderReconciler<S>
where
    S: Store + Clone,
{
    pub fn new(store: S, accounts: AccountService<S>) -> Self {
        Self {
            store,
            accounts,
            pricing: PricingPolicy::default(),
            policy: StockPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingPolicy) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Places an order for the request, validating card expiry against today.
    pub async fn reconcile(&self, request: CheckoutRequest) -> Result<Placement> {
        self.reconcile_on(request, Utc::now().date_naive()).await
    }

    #[tracing::instrument(skip(self, request), fields(policy = %self.policy, items = request.items.len()))]
    pub async fn reconcile_on(&self, request: CheckoutRequest, today: NaiveDate) -> Result<Placement> {
        metrics::counter!("checkout_requests_total").increment(1);
        let start = Instant::now();

        let result = self.place(request, today).await;

        match &result {
            Ok(placement) => {
                metrics::counter!("checkout_orders_created_total").increment(1);
                tracing::info!(
                    order_id = %placement.order.id,
                    customer_id = %placement.order.customer_id,
                    total = %placement.order.total,
                    "order placed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_rejected_total", "reason" => e.reason()).increment(1);
                if matches!(e, CheckoutError::Validation(_) | CheckoutError::OutOfStock { .. }) {
                    tracing::info!(reason = e.reason(), "checkout rejected: {e}");
                } else {
                    tracing::error!(reason = e.reason(), "checkout failed: {e}");
                }
            }
        }
        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());

        result
    }

    async fn place(&self, request: CheckoutRequest, today: NaiveDate) -> Result<Placement> {
        // 1. Structural validation
        let info = request.validate(today)?;

        // 2. Resolve every line against the catalog (read-only)
        let products = self.resolve_items(&request.items).await?;

        // 3. Price from catalog figures
        let mut lines: Vec<OrderLine> = request
            .items
            .iter()
            .zip(&products)
            .map(|(item, product)| OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price,
                grind_option: item.grind_option,
                stock_committed: false,
            })
            .collect();

        // 4. Take stock. A shortfall rejects before any account is touched.
        self.commit_stock(&mut lines).await?;

        // 5. Find or create the customer
        let customer = match self.accounts.resolve_for_checkout(info).await {
            Ok(customer) => customer,
            Err(e) => {
                self.release(&lines).await;
                return Err(CheckoutError::Account(e));
            }
        };

        let order = Order::place(
            customer.account.id,
            lines,
            info.shipping_address(),
            request.payment_method,
            &self.pricing,
        )?
        .with_quoted_totals(request.quoted_totals())
        .with_card_last4(request.card_last4());

        if order.quoted_totals != Some(order.totals()) {
            tracing::warn!(
                quoted = %request.total,
                computed = %order.total,
                "client totals differ from server pricing"
            );
        }

        // 6. Persist, giving stock back if that fails
        if let Err(e) = self.store.insert_order(&order).await {
            self.release(&order.items).await;
            return Err(e.into());
        }

        Ok(Placement {
            order,
            account_created: customer.created,
        })
    }

    /// Looks every submitted line up by id. Nothing is changed here, so a
    /// rejection leaves the store untouched.
    async fn resolve_items(&self, items: &[CheckoutItem]) -> Result<Vec<CatalogItem>> {
        let mut products = Vec::with_capacity(items.len());
        let mut first_unknown: Option<&CheckoutItem> = None;

        for item in items {
            match self.store.get_product(item.product_id).await? {
                Some(product) => {
                    if !product.offers_grind(item.grind_option) {
                        let grind = item.grind_option.map(|g| g.as_str()).unwrap_or_default();
                        return Err(CheckoutError::validation(format!(
                            "{} is not available with grind option {grind}",
                            product.name
                        )));
                    }
                    products.push(product);
                }
                None if first_unknown.is_none() => first_unknown = Some(item),
                None => {}
            }
        }

        if products.is_empty() {
            return Err(CheckoutError::validation("No valid items in cart"));
        }
        if let Some(item) = first_unknown {
            return Err(CheckoutError::validation(format!(
                "Product not found: {}",
                item.display_name()
            )));
        }
        Ok(products)
    }

    async fn commit_stock(&self, lines: &mut [OrderLine]) -> Result<()> {
        for idx in 0..lines.len() {
            let (product_id, quantity) = (lines[idx].product_id, lines[idx].quantity);

            let update = match self.store.decrement_stock(product_id, quantity).await {
                Ok(update) => update,
                Err(e) => {
                    self.release(lines).await;
                    return Err(e.into());
                }
            };

            match update {
                StockUpdate::Applied { remaining } => {
                    lines[idx].stock_committed = true;
                    tracing::debug!(%product_id, quantity, remaining, "stock committed");
                }
                shortfall => {
                    metrics::counter!("checkout_stock_shortfalls_total").increment(1);
                    let available = match shortfall {
                        StockUpdate::Insufficient { available } => available,
                        _ => 0,
                    };
                    match self.policy {
                        StockPolicy::Strict => {
                            let product = lines[idx].name.clone();
                            self.release(lines).await;
                            return Err(CheckoutError::OutOfStock { product });
                        }
                        StockPolicy::BestEffort => {
                            tracing::warn!(
                                %product_id,
                                product = %lines[idx].name,
                                requested = quantity,
                                available,
                                "stock shortfall, line left uncommitted"
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Compensation: restocks every committed line. Failures are logged and
    /// the remaining lines are still attempted.
    async fn release(&self, lines: &[OrderLine]) {
        for line in lines.iter().filter(|l| l.stock_committed) {
            if let Err(e) = self.store.restock(line.product_id, line.quantity).await {
                tracing::error!(
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    "failed to restock after aborted checkout: {e}"
                );
            }
        }
    }
}

//! The client-held cart.

use serde::{Deserialize, Serialize};

use domain::{CheckoutItem, GrindOption, Money, PricingPolicy, ProductId, Totals};

use crate::error::CartError;
use crate::storage::CartStorage;

/// One cart entry. `(product_id, grind_option)` is unique within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub grind_option: Option<GrindOption>,
}

impl LineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    fn is_same(&self, product_id: ProductId, grind: Option<GrindOption>) -> bool {
        self.product_id == product_id && self.grind_option == grind
    }
}

impl From<&LineItem> for CheckoutItem {
    fn from(item: &LineItem) -> Self {
        CheckoutItem {
            product_id: item.product_id,
            name: item.name.clone(),
            price: item.unit_price,
            quantity: item.quantity,
            grind_option: item.grind_option,
        }
    }
}

/// Line items plus the storage they are mirrored to.
///
/// Every mutation is followed by a save. A failed save is logged and the
/// in-memory change stands.
#[derive(Debug)]
pub struct Cart<S: CartStorage> {
    items: Vec<LineItem>,
    storage: S,
    pricing: PricingPolicy,
}

impl<S: CartStorage> Cart<S> {
    /// Restores the cart from storage. Unreadable state gives an empty cart.
    pub fn load(storage: S) -> Self {
        let items = match storage.load() {
            Ok(items) => sanitize(items),
            Err(e) => {
                tracing::warn!("discarding stored cart: {e}");
                Vec::new()
            }
        };
        Self {
            items,
            storage,
            pricing: PricingPolicy::default(),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Adds one unit. A line with the same product and grind is bumped,
    /// anything else is appended. A missing or negative price is refused.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        price: Option<Money>,
        grind_option: Option<GrindOption>,
    ) -> Result<(), CartError> {
        let name = name.into();
        let Some(price) = price.filter(|p| !p.is_negative()) else {
            return Err(CartError::InvalidPrice { name });
        };

        match self
            .items
            .iter_mut()
            .find(|i| i.is_same(product_id, grind_option))
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => self.items.push(LineItem {
                product_id,
                name,
                unit_price: price,
                quantity: 1,
                grind_option,
            }),
        }
        self.persist();
        Ok(())
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
            self.persist();
        }
    }

    /// A quantity of zero or less removes the line.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) {
        if index >= self.items.len() {
            return;
        }
        if quantity <= 0 {
            self.remove_item(index);
            return;
        }
        self.items[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn shipping_cost(&self) -> Money {
        self.pricing.shipping_for(self.subtotal())
    }

    pub fn tax(&self) -> Money {
        self.pricing.tax_for(self.subtotal(), self.shipping_cost())
    }

    pub fn total(&self) -> Money {
        self.totals().total
    }

    pub fn totals(&self) -> Totals {
        self.pricing.quote(self.subtotal())
    }

    /// Units across all lines, as shown on the cart badge.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.items) {
            tracing::warn!(items = self.items.len(), "failed to save cart: {e}");
        }
    }
}

/// Drops lines that could not have been produced by the cart itself and
/// merges duplicates, keeping first-seen order.
fn sanitize(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut clean: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 || item.unit_price.is_negative() {
            tracing::warn!(product_id = %item.product_id, "dropping invalid stored cart line");
            continue;
        }
        match clean
            .iter_mut()
            .find(|c| c.is_same(item.product_id, item.grind_option))
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => clean.push(item),
        }
    }
    clean
}

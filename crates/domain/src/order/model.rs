use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{CustomerId, OrderId, ProductId};

use super::{OrderError, OrderStatus};
use crate::account::Address;
use crate::catalog::GrindOption;
use crate::money::Money;
use crate::pricing::{PricingPolicy, Totals};

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    Paypal,
}

impl PaymentMethod {
    /// Card methods require card details.
    pub fn is_card(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::DebitCard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::DebitCard => "debit-card",
            PaymentMethod::Paypal => "paypal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit-card" => Some(PaymentMethod::CreditCard),
            "debit-card" => Some(PaymentMethod::DebitCard),
            "paypal" => Some(PaymentMethod::Paypal),
            _ => None,
        }
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    /// Catalog name at the time of purchase.
    pub name: String,
    pub quantity: u32,
    /// Catalog price at the time of purchase.
    pub unit_price: Money,
    pub grind_option: Option<GrindOption>,
    /// Whether stock was actually decremented for this line.
    pub stock_committed: bool,
}

impl OrderLine {
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    /// Figures the client displayed when submitting; informational only.
    pub quoted_totals: Option<Totals>,
    /// Snapshot, not a reference to the account's address book.
    pub shipping_address: Address,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub card_last4: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order priced from its own lines.
    pub fn place(
        customer_id: CustomerId,
        items: Vec<OrderLine>,
        shipping_address: Address,
        payment_method: PaymentMethod,
        policy: &PricingPolicy,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let totals = policy.quote_lines(items.iter().map(|l| (l.unit_price, l.quantity)));
        let now = Utc::now();

        Ok(Self {
            id: OrderId::new(),
            customer_id,
            items,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            total: totals.total,
            quoted_totals: None,
            shipping_address,
            status: OrderStatus::Pending,
            payment_method,
            card_last4: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_quoted_totals(mut self, quoted: Totals) -> Self {
        self.quoted_totals = Some(quoted);
        self
    }

    pub fn with_card_last4(mut self, last4: Option<String>) -> Self {
        self.card_last4 = last4;
        self
    }

    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            shipping: self.shipping,
            tax: self.tax,
            total: self.total,
        }
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Lines whose stock was decremented when the order was placed.
    pub fn committed_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.items.iter().filter(|l| l.stock_committed)
    }

    /// Moves the order to `next`, enforcing the status state machine.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

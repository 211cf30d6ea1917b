//! Cart and order pricing rules.
//!
//! Shipping is free from $50.00 upward (the boundary itself is free) and a
//! flat $5.99 below it. Tax is 10% of subtotal plus shipping, so it is always
//! computed after shipping is known.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// The amounts derived from a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// Pricing parameters. `Default` is the storefront's standard policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub free_shipping_threshold: Money,
    pub flat_shipping: Money,
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_cents(5000),
            flat_shipping: Money::from_cents(599),
            tax_rate: Decimal::new(10, 2),
        }
    }
}

impl PricingPolicy {
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_shipping
        }
    }

    pub fn tax_for(&self, subtotal: Money, shipping: Money) -> Money {
        (subtotal + shipping).scale(self.tax_rate)
    }

    /// Derives shipping, tax and total from a subtotal.
    pub fn quote(&self, subtotal: Money) -> Totals {
        let shipping = self.shipping_for(subtotal);
        let tax = self.tax_for(subtotal, shipping);
        Totals {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Prices a set of `(unit price, quantity)` lines.
    pub fn quote_lines<I>(&self, lines: I) -> Totals
    where
        I: IntoIterator<Item = (Money, u32)>,
    {
        let subtotal = lines
            .into_iter()
            .map(|(price, quantity)| price.multiply(quantity))
            .sum();
        self.quote(subtotal)
    }
}

/// Quotes a subtotal under the standard policy.
pub fn quote(subtotal: Money) -> Totals {
    PricingPolicy::default().quote(subtotal)
}

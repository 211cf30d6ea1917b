//! The checkout request exchanged between the submitter and the reconciler.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use common::ProductId;

use crate::account::{Address, normalize_email};
use crate::catalog::GrindOption;
use crate::error::ValidationError;
use crate::money::Money;
use crate::order::PaymentMethod;
use crate::payment::{PaymentDetails, validate_card};
use crate::pricing::Totals;

/// Country used when the customer leaves it blank.
pub const DEFAULT_COUNTRY: &str = "USA";

const MISSING_FIELDS: &str = "Missing required fields: customerInfo and items are required";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// Contact and shipping details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl CustomerInfo {
    /// Every field must be non-blank and the email must look like one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::new(format!(
                "Missing required field: {field}"
            )));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::new("Please provide a valid email address"));
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    /// The shipping address, with the default country filled in.
    pub fn shipping_address(&self) -> Address {
        let country = self.country.trim();
        Address {
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: if country.is_empty() {
                DEFAULT_COUNTRY.to_string()
            } else {
                country.to_string()
            },
        }
    }
}

/// One submitted line. `name` and `price` are what the client displayed;
/// the server prices from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub grind_option: Option<GrindOption>,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}

impl CheckoutRequest {
    /// Structural validation done before touching any store.
    ///
    /// Card details are checked only when present; the submitter is the
    /// one that insists on them for card methods.
    pub fn validate(&self, today: NaiveDate) -> Result<&CustomerInfo, ValidationError> {
        let info = match &self.customer_info {
            Some(info) if !self.items.is_empty() => info,
            _ => return Err(ValidationError::new(MISSING_FIELDS)),
        };
        info.validate()?;

        if let Some(item) = self.items.iter().find(|i| i.quantity < 1) {
            return Err(ValidationError::new(format!(
                "Invalid quantity for {}",
                item.display_name()
            )));
        }

        if let Some(details) = self.payment_details.as_ref().filter(|_| self.payment_method.is_card()) {
            validate_card(details, today)?;
        }

        Ok(info)
    }

    /// The figures the client showed the customer.
    pub fn quoted_totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            shipping: self.shipping,
            tax: self.tax,
            total: self.total,
        }
    }

    /// Last four card digits, kept on the order for card payments.
    pub fn card_last4(&self) -> Option<String> {
        match &self.payment_details {
            Some(details) if self.payment_method.is_card() => Some(details.last4()),
            _ => None,
        }
    }
}

impl CheckoutItem {
    /// The submitted name, or the product id when the name is blank.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            self.product_id.to_string()
        } else {
            self.name.clone()
        }
    }
}

//! Turns the cart into a checkout request and applies the outcome.

use chrono::{Local, NaiveDate};

use domain::{
    CheckoutItem, CheckoutRequest, CustomerInfo, OrderId, PaymentDetails, PaymentMethod,
    validate_payment,
};

use crate::cart::Cart;
use crate::error::SubmitError;
use crate::gateway::CheckoutGateway;
use crate::storage::CartStorage;

/// Payment choice made at checkout.
#[derive(Debug, Clone, Default)]
pub struct Payment {
    pub method: PaymentMethod,
    pub details: Option<PaymentDetails>,
}

impl Payment {
    pub fn paypal() -> Self {
        Self {
            method: PaymentMethod::Paypal,
            details: None,
        }
    }

    pub fn card(method: PaymentMethod, details: PaymentDetails) -> Self {
        Self {
            method,
            details: Some(details),
        }
    }
}

pub struct CheckoutSubmitter<G: CheckoutGateway> {
    gateway: G,
}

impl<G: CheckoutGateway> CheckoutSubmitter<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Submits the cart, checking card expiry against the local date.
    pub async fn submit<S: CartStorage>(
        &self,
        cart: &mut Cart<S>,
        info: &CustomerInfo,
        payment: &Payment,
    ) -> Result<OrderId, SubmitError> {
        self.submit_on(cart, info, payment, Local::now().date_naive())
            .await
    }

    /// On success the cart is emptied; on any failure it is left as it was.
    pub async fn submit_on<S: CartStorage>(
        &self,
        cart: &mut Cart<S>,
        info: &CustomerInfo,
        payment: &Payment,
        today: NaiveDate,
    ) -> Result<OrderId, SubmitError> {
        let request = build_request(cart, info, payment, today)?;

        match self.gateway.submit(&request).await {
            Ok(order_id) => {
                tracing::info!(%order_id, total = %request.total, "order placed");
                cart.clear();
                Ok(order_id)
            }
            Err(e) => {
                tracing::warn!("checkout failed: {e}");
                Err(e.into())
            }
        }
    }
}

/// Validates locally and builds the wire request. Nothing is sent here.
pub fn build_request<S: CartStorage>(
    cart: &Cart<S>,
    info: &CustomerInfo,
    payment: &Payment,
    today: NaiveDate,
) -> Result<CheckoutRequest, SubmitError> {
    if cart.is_empty() {
        return Err(SubmitError::EmptyCart);
    }
    info.validate()?;
    validate_payment(payment.method, payment.details.as_ref(), today)?;

    let totals = cart.totals();
    Ok(CheckoutRequest {
        customer_info: Some(info.clone()),
        items: cart.items().iter().map(CheckoutItem::from).collect(),
        subtotal: totals.subtotal,
        shipping: totals.shipping,
        tax: totals.tax,
        total: totals.total,
        payment_method: payment.method,
        payment_details: payment
            .details
            .clone()
            .filter(|_| payment.method.is_card()),
    })
}

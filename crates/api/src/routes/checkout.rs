//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use domain::{CheckoutRequest, Order, OrderId};
use serde::Serialize;
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::Success;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order_id: OrderId,
    pub order: Order,
}

/// POST /api/checkout: place an order from a submitted cart.
#[tracing::instrument(skip(state, payload))]
pub async fn submit<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Success<CheckoutResponse>>), ApiError> {
    let Json(request) = payload?;
    let placement = state.reconciler.reconcile(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(Success::new(CheckoutResponse {
            message: "Order placed successfully",
            order_id: placement.order.id,
            order: placement.order,
        })),
    ))
}

//! Order lookup, listing and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use checkout::OrderDetail;
use domain::{Order, OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{OrderFilter, Store};

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{AdminUser, AuthUser};
use crate::routes::Success;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListParams {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Serialize)]
pub struct OrderBody<T: Serialize> {
    pub order: T,
}

#[derive(Serialize)]
pub struct OrdersBody {
    pub orders: Vec<Order>,
}

#[derive(Serialize)]
pub struct StatusBody {
    pub message: &'static str,
    pub order: Order,
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::NotFound("Order not found".to_string()))
}

/// GET /api/orders/{id}: an order with its customer and current products.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Success<OrderBody<OrderDetail>>>, ApiError> {
    let id = parse_order_id(&id)?;
    let order = state.orders.order_detail(id).await?;
    Ok(Json(Success::new(OrderBody { order })))
}

/// GET /api/orders: the caller's orders, or every order for admins.
#[tracing::instrument(skip(state, user, params), fields(customer_id = %user.0.id))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Success<OrdersBody>>, ApiError> {
    let Query(params) = params?;
    let AuthUser(account) = user;

    let mut filter = if account.is_admin() {
        OrderFilter::all()
    } else {
        OrderFilter::for_customer(account.id)
    };
    if let Some(status) = params.status {
        filter = filter.status(status);
    }

    let orders = state.orders.list_orders(&filter).await?;
    Ok(Json(Success::new(OrdersBody { orders })))
}

/// PATCH /api/orders/{id}/status: admin-only status change.
#[tracing::instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_status<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    admin: AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Success<StatusBody>>, ApiError> {
    let Json(update) = payload?;
    let id = parse_order_id(&id)?;
    let order = state.orders.update_status(id, update.status).await?;
    metrics::counter!("order_status_updates_total", "status" => order.status.as_str())
        .increment(1);
    Ok(Json(Success::new(StatusBody {
        message: "Order status updated",
        order,
    })))
}

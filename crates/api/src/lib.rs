//! HTTP API server for the storefront.
//!
//! Provides the checkout, order, catalog and account endpoints, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use checkout::{
    AccountError, AccountService, OrderReconciler, OrderService, PasswordHashing, TokenIssuer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub store: S,
    pub reconciler: OrderReconciler<S>,
    pub accounts: AccountService<S>,
    pub orders: OrderService<S>,
}

impl<S: Store + Clone> AppState<S> {
    /// Wires the services over `store` using the configured secret and
    /// stock policy.
    pub fn new(store: S, config: &Config) -> Self {
        Self::with_hashing(store, config, PasswordHashing::new())
    }

    pub fn with_hashing(store: S, config: &Config, hashing: PasswordHashing) -> Self {
        let accounts = AccountService::new(
            store.clone(),
            hashing,
            TokenIssuer::new(&config.jwt_secret),
        );
        let reconciler =
            OrderReconciler::new(store.clone(), accounts.clone()).with_policy(config.stock_policy);

        Self {
            reconciler,
            accounts,
            orders: OrderService::new(store.clone()),
            store,
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/checkout", post(routes::checkout::submit::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", patch(routes::orders::update_status::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/featured", get(routes::products::featured::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/auth/register", post(routes::auth::register::<S>))
        .route("/auth/login", post(routes::auth::login::<S>))
        .route(
            "/auth/me",
            get(routes::auth::me).put(routes::auth::update_me::<S>),
        )
        .route("/auth/change-password", post(routes::auth::change_password::<S>));

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Loads the demo catalog and users. Returns how many products were added.
pub async fn seed_demo_data<S: Store + Clone>(
    state: &AppState<S>,
) -> Result<usize, AccountError> {
    let products = store::seed::seed_catalog(&state.store).await?;
    state
        .accounts
        .seed_users(&store::seed::demo_users())
        .await?;
    Ok(products)
}

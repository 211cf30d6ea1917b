//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use domain::{CatalogItem, Category, Money, ProductId, RoastLevel};
use serde::{Deserialize, Serialize};
use store::{ProductQuery, Store};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::Success;

/// Query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductParams {
    pub category: Option<Category>,
    pub roast_level: Option<RoastLevel>,
    pub featured: Option<bool>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub search: Option<String>,
}

impl ProductParams {
    fn into_query(self) -> ProductQuery {
        let mut query = ProductQuery::new();
        if let Some(category) = self.category {
            query = query.category(category);
        }
        if let Some(level) = self.roast_level {
            query = query.roast_level(level);
        }
        if let Some(featured) = self.featured {
            query = query.featured(featured);
        }
        if let Some(min) = self.min_price {
            query = query.min_price(min);
        }
        if let Some(max) = self.max_price {
            query = query.max_price(max);
        }
        if let Some(term) = self.search {
            query = query.search(term);
        }
        query
    }
}

#[derive(Serialize)]
pub struct ProductsBody {
    pub products: Vec<CatalogItem>,
}

#[derive(Serialize)]
pub struct ProductBody {
    pub product: CatalogItem,
}

/// GET /api/products
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<ProductParams>, QueryRejection>,
) -> Result<Json<Success<ProductsBody>>, ApiError> {
    let Query(params) = params?;
    let products = state.store.list_products(&params.into_query()).await?;
    Ok(Json(Success::new(ProductsBody { products })))
}

/// GET /api/products/featured
pub async fn featured<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Success<ProductsBody>>, ApiError> {
    let products = state
        .store
        .list_products(&ProductQuery::featured_only())
        .await?;
    Ok(Json(Success::new(ProductsBody { products })))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Success<ProductBody>>, ApiError> {
    let not_found = || ApiError::NotFound("Product not found".to_string());
    let id: ProductId = id.parse().map_err(|_| not_found())?;
    let product = state.store.get_product(id).await?.ok_or_else(not_found)?;
    Ok(Json(Success::new(ProductBody { product })))
}

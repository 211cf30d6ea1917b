//! Bearer-token extractors.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use checkout::{AccountError, AuthError};
use domain::CustomerAccount;
use store::Store;

use crate::AppState;
use crate::error::ApiError;

/// The account behind a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CustomerAccount);

/// An [`AuthUser`] with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CustomerAccount);

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthUser
where
    S: Store + Clone + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer(parts) else {
            tracing::debug!(uri = %parts.uri, "missing bearer token");
            return Err(AuthError::MissingToken.into());
        };

        let claims = state.accounts.tokens().verify(token)?;
        let id = claims.customer_id()?;

        match state.accounts.profile(id).await {
            Ok(account) => Ok(AuthUser(account)),
            Err(AccountError::NotFound) => Err(ApiError::Unauthorized(
                "Invalid token. User not found.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

impl<S> FromRequestParts<Arc<AppState<S>>> for AdminUser
where
    S: Store + Clone + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(account) = AuthUser::from_request_parts(parts, state).await?;
        if !account.is_admin() {
            return Err(ApiError::Forbidden(
                "Access denied. Admin privileges required.".to_string(),
            ));
        }
        Ok(AdminUser(account))
    }
}

//! Registration, login and profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use checkout::{LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, Session};
use domain::PublicUser;
use serde::Serialize;
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::routes::Success;

#[derive(Serialize)]
pub struct SessionBody {
    pub message: &'static str,
    #[serde(flatten)]
    pub session: Session,
}

#[derive(Serialize)]
pub struct UserBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// POST /api/auth/register
#[tracing::instrument(skip(state, payload))]
pub async fn register<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Success<SessionBody>>), ApiError> {
    let Json(request) = payload?;
    let session = state.accounts.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Success::new(SessionBody {
            message: "User registered successfully",
            session,
        })),
    ))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, payload))]
pub async fn login<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Success<SessionBody>>, ApiError> {
    let Json(request) = payload?;
    let session = state.accounts.login(request).await?;
    Ok(Json(Success::new(SessionBody {
        message: "Login successful",
        session,
    })))
}

/// GET /api/auth/me
pub async fn me(AuthUser(account): AuthUser) -> Json<Success<UserBody>> {
    Json(Success::new(UserBody {
        message: None,
        user: account.public(),
    }))
}

/// PUT /api/auth/me
#[tracing::instrument(skip(state, account, payload), fields(customer_id = %account.id))]
pub async fn update_me<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(account): AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Success<UserBody>>, ApiError> {
    let Json(update) = payload?;
    let user = state.accounts.update_profile(account.id, update).await?;
    Ok(Json(Success::new(UserBody {
        message: Some("Profile updated successfully"),
        user,
    })))
}

/// POST /api/auth/change-password
#[tracing::instrument(skip(state, account, payload), fields(customer_id = %account.id))]
pub async fn change_password<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(account): AuthUser,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> Result<Json<Success<MessageBody>>, ApiError> {
    let Json(change) = payload?;
    state.accounts.change_password(account.id, change).await?;
    Ok(Json(Success::new(MessageBody {
        message: "Password changed successfully",
    })))
}

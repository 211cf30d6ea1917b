//! API error types with HTTP status code mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{AccountError, AuthError, CheckoutError};
use domain::OrderError;
use store::StoreError;

/// Shown when the database cannot be reached.
pub const DATABASE_UNAVAILABLE: &str =
    "Database connection unavailable. Please check DATABASE_URL and that the database is reachable.";

const INTERNAL: &str = "An internal server error occurred";

/// API-level errors that map to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Unavailable,
    /// The cause is logged; the client sees a generic message.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unavailable => {
                tracing::error!("database unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, DATABASE_UNAVAILABLE.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            e if e.is_unavailable() => ApiError::Unavailable,
            StoreError::NotFound { entity, .. } => ApiError::NotFound(format!("{entity} not found")),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        if err.is_unavailable() {
            return ApiError::Unavailable;
        }
        match err {
            CheckoutError::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ CheckoutError::OutOfStock { .. } => ApiError::Conflict(e.to_string()),
            e @ CheckoutError::OrderNotFound(_) => ApiError::NotFound(e.to_string()),
            e @ CheckoutError::StatusConflict(_) => ApiError::Conflict(e.to_string()),
            CheckoutError::Order(e @ OrderError::InvalidStatusTransition { .. }) => {
                ApiError::Conflict(e.to_string())
            }
            CheckoutError::Order(e @ OrderError::NoItems) => ApiError::BadRequest(e.to_string()),
            CheckoutError::Account(e) => {
                tracing::error!(error = %e, "account resolution failed during checkout");
                ApiError::Internal(format!("Error creating user account: {e}"))
            }
            CheckoutError::Store(e) => e.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ (AccountError::EmailExists | AccountError::EmailTaken) => {
                ApiError::BadRequest(e.to_string())
            }
            e @ (AccountError::InvalidCredentials | AccountError::WrongPassword) => {
                ApiError::Unauthorized(e.to_string())
            }
            e @ AccountError::NotFound => ApiError::NotFound(e.to_string()),
            AccountError::Auth(e) => e.into(),
            AccountError::Store(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            e @ (AuthError::MissingToken | AuthError::InvalidToken) => {
                ApiError::Unauthorized(e.to_string())
            }
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

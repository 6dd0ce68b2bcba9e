//! Route handlers

pub mod companies;
pub mod directory;
pub mod health;
pub mod naics;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use cmmc_core::account::Account;

use crate::identity::resolve_identity;
use crate::state::AppState;
use crate::validation::FieldErrors;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn unauthorized() -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, "Unauthorized")
}

pub fn subscription_required() -> RouteError {
    route_error(StatusCode::FORBIDDEN, "Active subscription required")
}

pub fn not_found(what: &str) -> RouteError {
    route_error(StatusCode::NOT_FOUND, format!("{what} not found"))
}

/// Persistence failures surface as one generic message; the underlying
/// error goes to the log, never to the caller.
pub fn internal_error(error: impl std::fmt::Display) -> RouteError {
    tracing::error!(%error, "internal error");
    route_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Validation failures carry the per-field breakdown.
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub fields: FieldErrors,
}

pub fn validation_failed(errors: FieldErrors) -> (StatusCode, Json<ValidationErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ValidationErrorResponse {
            error: "Validation failed".to_string(),
            fields: errors,
        }),
    )
}

/// Resolve the caller to an account record, or a generic 401.
pub async fn require_account(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<Account, RouteError> {
    let external_id = resolve_identity(headers).ok_or_else(unauthorized)?;
    state
        .account_store()
        .get_by_external_id(&external_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(unauthorized)
}

/// Resolve the caller and require an active subscription.
pub async fn require_subscriber(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<Account, RouteError> {
    let account = require_account(state, headers).await?;
    if !account.has_active_subscription() {
        return Err(subscription_required());
    }
    Ok(account)
}

//! Company registration and management routes
//!
//! The write surface behind the directory: registration requires an
//! active subscription; updates are ownership-scoped, and an update
//! against a listing the caller does not own is indistinguishable from
//! an update against a listing that does not exist.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use cmmc_core::company::{Company, CompanyFilter};
use cmmc_core::naics::NaicsCode;

use super::{
    internal_error, not_found, require_account, require_subscriber, validation_failed,
    RouteError,
};
use crate::state::AppState;
use crate::validation::{
    check_dates_against_stored, validate_create, validate_update, CreateCompanyRequest,
    UpdateCompanyRequest,
};

#[derive(Debug, Serialize)]
struct CompanyIdResponse {
    id: Uuid,
}

/// Register a new company listing
async fn create_company(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyIdResponse>), Response> {
    let account = require_subscriber(&state, &headers)
        .await
        .map_err(IntoResponse::into_response)?;

    let (new, naics_codes) = match validate_create(req) {
        Ok(validated) => validated,
        Err(errors) => return Err(validation_failed(errors).into_response()),
    };

    let company = state
        .company_store()
        .create(account.id, new, naics_codes.as_deref())
        .await
        .map_err(|e| internal_error(e).into_response())?;

    // Confirmation email is non-critical: log and move on.
    if let Err(error) = state
        .notifier()
        .company_submitted(&account.email, &company.name)
        .await
    {
        tracing::warn!(%error, company_id = %company.id, "submission notification failed");
    }

    Ok((StatusCode::CREATED, Json(CompanyIdResponse { id: company.id })))
}

/// Update an owned listing
async fn update_company(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyIdResponse>, Response> {
    let account = require_account(&state, &headers)
        .await
        .map_err(IntoResponse::into_response)?;

    let company_id =
        Uuid::parse_str(&id).map_err(|_| not_found("Company").into_response())?;

    let (patch, naics_codes) = match validate_update(req) {
        Ok(validated) => validated,
        Err(errors) => return Err(validation_failed(errors).into_response()),
    };

    // A one-sided date change has to be ordered against the stored
    // counterpart; a body carrying both was already checked above.
    if patch.certification_date.is_set() != patch.certification_expiry.is_set() {
        let stored = state
            .company_store()
            .get_owned(company_id, account.id)
            .await
            .map_err(|e| internal_error(e).into_response())?;
        if let Some(stored) = stored {
            if let Err(errors) = check_dates_against_stored(
                &patch,
                stored.certification_date,
                stored.certification_expiry,
            ) {
                return Err(validation_failed(errors).into_response());
            }
        }
    }

    let updated = state
        .company_store()
        .update(company_id, account.id, &patch, naics_codes.as_deref())
        .await
        .map_err(|e| internal_error(e).into_response())?;

    match updated {
        Some(company) => Ok(Json(CompanyIdResponse { id: company.id })),
        // Not-owned and nonexistent produce the same response.
        None => Err(not_found("Company").into_response()),
    }
}

/// List the caller's own listings, any status, unclipped
async fn list_own_companies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Company>>, RouteError> {
    let account = require_account(&state, &headers).await?;

    let companies = state
        .company_store()
        .list(&CompanyFilter::new().with_owner(account.id))
        .await
        .map_err(internal_error)?;
    Ok(Json(companies))
}

#[derive(Debug, Serialize)]
struct OwnedCompanyResponse {
    #[serde(flatten)]
    company: Company,
    naics_codes: Vec<NaicsCode>,
}

/// Owner detail view of one listing
async fn get_own_company(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<OwnedCompanyResponse>, RouteError> {
    let account = require_account(&state, &headers).await?;

    let company_id = Uuid::parse_str(&id).map_err(|_| not_found("Company"))?;
    let company = state
        .company_store()
        .get_owned(company_id, account.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Company"))?;

    let naics_codes = state
        .naics_store()
        .for_company(company.id)
        .await
        .map_err(internal_error)?;

    Ok(Json(OwnedCompanyResponse {
        company,
        naics_codes,
    }))
}

/// Create the company router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/companies",
            get(list_own_companies).post(create_company),
        )
        .route(
            "/api/companies/{id}",
            get(get_own_company).put(update_company),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::HeaderValue;
    use chrono::NaiveDate;

    use cmmc_core::account::{NewAccount, SubscriptionStatus};
    use cmmc_core::company::{CmmcLevel, NewCompany};
    use cmmc_core::db;

    use crate::identity::IDENTITY_HEADER;
    use crate::notify::LogNotifier;

    async fn test_state() -> AppState {
        let pool = db::connect_in_memory().await.unwrap();
        AppState::new(pool, Arc::new(LogNotifier))
    }

    async fn seed_subscriber(state: &AppState, external_id: &str) -> Uuid {
        let account = state
            .account_store()
            .create(NewAccount {
                external_id: external_id.to_string(),
                email: format!("{external_id}@example.com"),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();
        state
            .account_store()
            .set_subscription(account.id, SubscriptionStatus::Active, None)
            .await
            .unwrap();
        account.id
    }

    fn auth_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(IDENTITY_HEADER, HeaderValue::from_static("user_1"));
        headers
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn put_update(
        state: &AppState,
        id: Uuid,
        body: &str,
    ) -> Result<Json<CompanyIdResponse>, Response> {
        let req: UpdateCompanyRequest = serde_json::from_str(body).unwrap();
        update_company(
            State(state.clone()),
            auth_headers(),
            Path(id.to_string()),
            Json(req),
        )
        .await
    }

    #[tokio::test]
    async fn test_expiry_only_update_cannot_precede_stored_date() {
        let state = test_state().await;
        let owner = seed_subscriber(&state, "user_1").await;

        let company = state
            .company_store()
            .create(
                owner,
                NewCompany {
                    name: "Acme".to_string(),
                    cmmc_level: CmmcLevel::Two,
                    certification_date: Some(date(2024, 6, 1)),
                    certification_expiry: Some(date(2027, 6, 1)),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        let response = put_update(&state, company.id, r#"{"certification_expiry": "2020-01-01"}"#)
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The stored record is untouched.
        let stored = state
            .company_store()
            .get_owned(company.id, owner)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.certification_expiry, Some(date(2027, 6, 1)));

        // Extending the expiry one-sidedly is still allowed.
        put_update(&state, company.id, r#"{"certification_expiry": "2030-01-01"}"#)
            .await
            .unwrap();
        let stored = state
            .company_store()
            .get_owned(company.id, owner)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.certification_expiry, Some(date(2030, 1, 1)));
    }

    #[tokio::test]
    async fn test_date_only_update_cannot_pass_stored_expiry() {
        let state = test_state().await;
        let owner = seed_subscriber(&state, "user_1").await;

        let company = state
            .company_store()
            .create(
                owner,
                NewCompany {
                    name: "Acme".to_string(),
                    cmmc_level: CmmcLevel::Two,
                    certification_date: Some(date(2020, 1, 1)),
                    certification_expiry: Some(date(2021, 1, 1)),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        let response = put_update(&state, company.id, r#"{"certification_date": "2024-01-01"}"#)
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let stored = state
            .company_store()
            .get_owned(company.id, owner)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.certification_date, Some(date(2020, 1, 1)));
    }
}

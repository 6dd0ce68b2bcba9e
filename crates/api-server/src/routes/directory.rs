//! Public directory API routes
//!
//! Subscription-gated search over verified listings. Filters arrive as
//! query parameters; `page` is 1-indexed with a fixed page size, and
//! anything unparseable falls back to page 1.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cmmc_core::company::{CmmcLevel, Company, CompanyFilter, CompanyStatus};
use cmmc_core::naics::NaicsCode;

use super::{internal_error, not_found, require_subscriber, validation_failed, RouteError};
use crate::state::AppState;
use crate::validation::{check_len, FieldErrors, MAX_NAICS_CODE};

pub const PAGE_SIZE: i64 = 12;
const MAX_PAGE: i64 = 1000;
const MAX_SEARCH: usize = 200;

#[derive(Debug, Default, Deserialize)]
struct DirectoryParams {
    search: Option<String>,
    level: Option<String>,
    state: Option<String>,
    naics: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Serialize)]
struct DirectoryResponse {
    companies: Vec<Company>,
    total_count: i64,
    page: i64,
    page_size: i64,
}

/// 1-indexed page number; non-numeric or out-of-range values become 1.
fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|page| (1..=MAX_PAGE).contains(page))
        .unwrap_or(1)
}

/// Build the verified-only directory filter from request parameters.
///
/// Unknown state values are passed through (they match zero rows); an
/// out-of-range level or an overlong search/naics value is a caller
/// error, reported per-field.
fn build_filter(params: &DirectoryParams) -> Result<CompanyFilter, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut filter = CompanyFilter::new().with_status(CompanyStatus::Verified);

    if let Some(raw) = params.level.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        match raw.parse::<i64>().ok().and_then(|n| CmmcLevel::try_from(n).ok()) {
            Some(level) => filter = filter.with_level(level),
            None => errors.push("level", "must be 1, 2 or 3"),
        }
    }
    if let Some(state) = params.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        filter = filter.with_state(state.to_ascii_uppercase());
    }
    if let Some(naics) = params.naics.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        check_len(&mut errors, "naics", naics, MAX_NAICS_CODE);
        filter = filter.with_naics_code(naics);
    }
    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        check_len(&mut errors, "search", search, MAX_SEARCH);
        filter = filter.with_search(search);
    }

    if errors.is_empty() {
        Ok(filter)
    } else {
        Err(errors)
    }
}

/// Search verified listings with filters and pagination
async fn list_directory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DirectoryParams>,
) -> Result<Json<DirectoryResponse>, Response> {
    require_subscriber(&state, &headers)
        .await
        .map_err(IntoResponse::into_response)?;

    let filter = match build_filter(&params) {
        Ok(filter) => filter,
        Err(errors) => return Err(validation_failed(errors).into_response()),
    };

    let page = parse_page(params.page.as_deref());
    let offset = (page - 1) * PAGE_SIZE;

    let result = state
        .company_store()
        .page(&filter.paginate(PAGE_SIZE, offset))
        .await
        .map_err(|e| internal_error(e).into_response())?;

    Ok(Json(DirectoryResponse {
        companies: result.companies,
        total_count: result.total_count,
        page,
        page_size: PAGE_SIZE,
    }))
}

#[derive(Debug, Serialize)]
struct DirectoryDetailResponse {
    #[serde(flatten)]
    company: Company,
    naics_codes: Vec<NaicsCode>,
}

/// Detail view of one verified listing
async fn get_directory_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DirectoryDetailResponse>, RouteError> {
    require_subscriber(&state, &headers).await?;

    // An unparseable id can't name a listing; same generic outcome.
    let company_id = Uuid::parse_str(&id).map_err(|_| not_found("Company"))?;

    let company = state
        .company_store()
        .get_verified(company_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Company"))?;

    let naics_codes = state
        .naics_store()
        .for_company(company.id)
        .await
        .map_err(internal_error)?;

    Ok(Json(DirectoryDetailResponse {
        company,
        naics_codes,
    }))
}

/// Create the directory router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/directory", get(list_directory))
        .route("/api/directory/{id}", get(get_directory_entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parsing_defaults_to_one() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-5")), 1);
        assert_eq!(parse_page(Some("1001")), 1);
        assert_eq!(parse_page(Some("3")), 3);
    }

    #[test]
    fn test_page_three_maps_to_offset_twenty_four() {
        let page = parse_page(Some("3"));
        assert_eq!((page - 1) * PAGE_SIZE, 24);
    }

    #[test]
    fn test_filter_rejects_out_of_range_level() {
        let params = DirectoryParams {
            level: Some("4".to_string()),
            ..Default::default()
        };
        assert!(build_filter(&params).is_err());

        let params = DirectoryParams {
            level: Some("two".to_string()),
            ..Default::default()
        };
        assert!(build_filter(&params).is_err());
    }

    #[test]
    fn test_filter_rejects_overlong_search_and_naics() {
        let params = DirectoryParams {
            search: Some("x".repeat(MAX_SEARCH + 1)),
            ..Default::default()
        };
        let errors = build_filter(&params).unwrap_err();
        assert!(errors.fields.contains_key("search"));

        let params = DirectoryParams {
            naics: Some("5".repeat(MAX_NAICS_CODE + 1)),
            ..Default::default()
        };
        let errors = build_filter(&params).unwrap_err();
        assert!(errors.fields.contains_key("naics"));

        let params = DirectoryParams {
            search: Some("x".repeat(MAX_SEARCH)),
            naics: Some("541512".to_string()),
            ..Default::default()
        };
        assert!(build_filter(&params).is_ok());
    }

    #[test]
    fn test_filter_accepts_blank_parameters() {
        let params = DirectoryParams {
            level: Some("".to_string()),
            state: Some("  ".to_string()),
            search: Some("".to_string()),
            ..Default::default()
        };
        assert!(build_filter(&params).is_ok());
    }
}

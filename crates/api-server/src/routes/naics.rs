//! NAICS taxonomy route

use axum::{
    extract::State, http::HeaderMap, routing::get, Json, Router,
};

use cmmc_core::naics::NaicsCode;

use super::{internal_error, require_account, RouteError};
use crate::state::AppState;

/// The full NAICS taxonomy, for filter and form dropdowns
async fn list_naics_codes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NaicsCode>>, RouteError> {
    require_account(&state, &headers).await?;
    let codes = state.naics_store().list().await.map_err(internal_error)?;
    Ok(Json(codes))
}

/// Create the NAICS router
pub fn router() -> Router<AppState> {
    Router::new().route("/api/naics", get(list_naics_codes))
}

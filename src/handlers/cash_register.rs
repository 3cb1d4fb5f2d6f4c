use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::services::cash_register::{
    LedgerEntryListResponse, LedgerEntryResponse, NewLedgerEntry, RegisterStats,
};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LedgerListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_entry).get(list_entries))
        .route("/stats", get(get_stats))
}

/// Append one entry to the cash ledger.
#[utoipa::path(
    post,
    path = "/api/v1/cash-register",
    request_body = NewLedgerEntry,
    responses(
        (status = 201, description = "Entry recorded", body = ApiResponse<LedgerEntryResponse>),
        (status = 400, description = "Missing field or invalid direction/amount")
    ),
    tag = "cash-register"
)]
pub async fn record_entry(
    State(state): State<AppState>,
    Json(entry): Json<NewLedgerEntry>,
) -> Result<(StatusCode, Json<ApiResponse<LedgerEntryResponse>>), ServiceError> {
    let recorded = state.services.cash_register.record_entry(entry).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(recorded))))
}

/// List ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/cash-register",
    params(LedgerListQuery),
    responses(
        (status = 200, description = "Entries retrieved", body = ApiResponse<LedgerEntryListResponse>)
    ),
    tag = "cash-register"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<LedgerListQuery>,
) -> Result<Json<ApiResponse<LedgerEntryListResponse>>, ServiceError> {
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .min(state.config.api_max_page_size);
    let entries = state.services.cash_register.list_entries(page, limit).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Register totals: inflow, outflow and net cash movement.
#[utoipa::path(
    get,
    path = "/api/v1/cash-register/stats",
    responses(
        (status = 200, description = "Stats computed", body = ApiResponse<RegisterStats>)
    ),
    tag = "cash-register"
)]
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RegisterStats>>, ServiceError> {
    let stats = state.services.cash_register.get_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::services::exchanges::{
    CreateExchangeRequest, ExchangeListResponse, ExchangeResponse,
};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExchangeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HasExchangeResponse {
    pub user_id: Uuid,
    pub has_exchange: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exchanges).post(create_exchange))
        .route("/user/:id", get(has_exchange))
        .route("/:id/approve", post(approve_exchange))
        .route("/:id/reject", post(reject_exchange))
}

/// List exchanges with nested items, customer and order, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges",
    params(ExchangeListQuery),
    responses(
        (status = 200, description = "Exchanges retrieved", body = ApiResponse<ExchangeListResponse>)
    ),
    tag = "exchanges"
)]
pub async fn list_exchanges(
    State(state): State<AppState>,
    Query(query): Query<ExchangeListQuery>,
) -> Result<Json<ApiResponse<ExchangeListResponse>>, ServiceError> {
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .min(state.config.api_max_page_size);
    let exchanges = state.services.exchanges.list_exchanges(page, limit).await?;
    Ok(Json(ApiResponse::success(exchanges)))
}

/// Record a new exchange request.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges",
    request_body = CreateExchangeRequest,
    responses(
        (status = 201, description = "Exchange recorded", body = ApiResponse<ExchangeResponse>),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Order does not belong to the customer")
    ),
    tag = "exchanges"
)]
pub async fn create_exchange(
    State(state): State<AppState>,
    Json(request): Json<CreateExchangeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExchangeResponse>>), ServiceError> {
    let exchange = state.services.exchanges.create_exchange(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(exchange))))
}

/// Whether a user has any approved exchange.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Flag computed", body = ApiResponse<HasExchangeResponse>)
    ),
    tag = "exchanges"
)]
pub async fn has_exchange(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<HasExchangeResponse>>, ServiceError> {
    let has_exchange = state.services.exchanges.has_exchange(id).await?;
    Ok(Json(ApiResponse::success(HasExchangeResponse {
        user_id: id,
        has_exchange,
    })))
}

/// Approve a pending exchange.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges/{id}/approve",
    params(("id" = Uuid, Path, description = "Exchange ID")),
    responses(
        (status = 200, description = "Exchange approved", body = ApiResponse<ExchangeResponse>),
        (status = 404, description = "Exchange not found"),
        (status = 409, description = "Exchange already decided")
    ),
    tag = "exchanges"
)]
pub async fn approve_exchange(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExchangeResponse>>, ServiceError> {
    let exchange = state.services.exchanges.approve_exchange(id).await?;
    Ok(Json(ApiResponse::success(exchange)))
}

/// Reject a pending exchange.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges/{id}/reject",
    params(("id" = Uuid, Path, description = "Exchange ID")),
    responses(
        (status = 200, description = "Exchange rejected", body = ApiResponse<ExchangeResponse>),
        (status = 404, description = "Exchange not found"),
        (status = 409, description = "Exchange already decided")
    ),
    tag = "exchanges"
)]
pub async fn reject_exchange(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExchangeResponse>>, ServiceError> {
    let exchange = state.services.exchanges.reject_exchange(id).await?;
    Ok(Json(ApiResponse::success(exchange)))
}

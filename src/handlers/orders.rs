use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::models::OrderStatus;
use crate::services::orders::{
    OrderDetailResponse, OrderFilter, OrderListResponse, OrderResponse, UpdateOrderStatusRequest,
};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
    pub shipping_company: Option<String>,
    pub wilaya_id: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/number/:order_number", get(get_order_by_number))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
}

/// List orders, newest first, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<OrderListResponse>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<OrderListResponse>>, ServiceError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            OrderStatus::from_str(s)
                .map_err(|_| ServiceError::InvalidStatus(format!("Unknown order status: {}", s)))
        })
        .transpose()?;

    let filter = OrderFilter {
        customer_id: query.customer_id,
        status,
        shipping_company: query.shipping_company,
        shipping_wilaya_id: query.wilaya_id,
    };

    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .min(state.config.api_max_page_size);

    let orders = state.services.orders.list_orders(filter, page, limit).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Fetch a single order with items, products and add-ons.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderDetailResponse>),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetailResponse>>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Look up an order by its human-facing order number.
#[utoipa::path(
    get,
    path = "/api/v1/orders/number/{order_number}",
    params(("order_number" = String, Path, description = "Order number")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderDetailResponse>),
        (status = 404, description = "No order with that number")
    ),
    tag = "orders"
)]
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<OrderDetailResponse>>, ServiceError> {
    let order_id = state
        .services
        .orders
        .find_order_id_by_number(&order_number)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Order with number {} not found", order_number))
        })?;
    let order = state.services.orders.get_order(order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Update an order's status.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state.services.orders.update_order_status(id, request).await?;
    Ok(Json(ApiResponse::success(order)))
}

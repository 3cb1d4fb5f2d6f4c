use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::delivery::{AssignmentResponse, DeliveryPersonResponse};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AssignDeliveryRequest {
    pub order_id: Uuid,
    pub delivery_person_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub pending_balance: Decimal,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assign", post(assign_delivery))
        .route("/personnel", get(list_personnel))
        .route("/:id/balance", get(pending_balance))
}

/// Assign a delivery person to an order.
///
/// Sets the order to `shipped` and accrues the shipping price onto the
/// person's pending balance, atomically. Re-assigning an order returns 409.
#[utoipa::path(
    post,
    path = "/api/v1/delivery/assign",
    request_body = AssignDeliveryRequest,
    responses(
        (status = 200, description = "Delivery assigned", body = ApiResponse<AssignmentResponse>),
        (status = 404, description = "Order or delivery person not found"),
        (status = 409, description = "Order already assigned"),
        (status = 422, description = "User is not active delivery personnel")
    ),
    tag = "delivery"
)]
pub async fn assign_delivery(
    State(state): State<AppState>,
    Json(request): Json<AssignDeliveryRequest>,
) -> Result<Json<ApiResponse<AssignmentResponse>>, ServiceError> {
    let assignment = state
        .services
        .delivery
        .assign(request.order_id, request.delivery_person_id)
        .await?;
    Ok(Json(ApiResponse::success(assignment)))
}

/// List active delivery personnel.
#[utoipa::path(
    get,
    path = "/api/v1/delivery/personnel",
    responses(
        (status = 200, description = "Delivery personnel retrieved", body = ApiResponse<Vec<DeliveryPersonResponse>>)
    ),
    tag = "delivery"
)]
pub async fn list_personnel(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeliveryPersonResponse>>>, ServiceError> {
    let personnel = state.services.delivery.list_delivery_personnel().await?;
    Ok(Json(ApiResponse::success(personnel)))
}

/// Current pending balance of a delivery person.
#[utoipa::path(
    get,
    path = "/api/v1/delivery/{id}/balance",
    params(("id" = Uuid, Path, description = "Delivery person ID")),
    responses(
        (status = 200, description = "Balance retrieved", body = ApiResponse<BalanceResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "delivery"
)]
pub async fn pending_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BalanceResponse>>, ServiceError> {
    let balance = state.services.delivery.pending_balance(id).await?;
    Ok(Json(ApiResponse::success(BalanceResponse {
        user_id: id,
        pending_balance: balance,
    })))
}

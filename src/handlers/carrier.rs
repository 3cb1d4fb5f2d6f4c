use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::services::carrier::DeliveryFees;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeesQuery {
    pub wilaya_id: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/fees", get(delivery_fees))
}

/// Proxy the carrier's per-wilaya delivery fee lookup.
#[utoipa::path(
    get,
    path = "/api/v1/carrier/fees",
    params(FeesQuery),
    responses(
        (status = 200, description = "Fees retrieved from carrier", body = ApiResponse<DeliveryFees>),
        (status = 422, description = "Carrier token not configured"),
        (status = 502, description = "Carrier unavailable or returned an error")
    ),
    tag = "carrier"
)]
pub async fn delivery_fees(
    State(state): State<AppState>,
    Query(query): Query<FeesQuery>,
) -> Result<Json<ApiResponse<DeliveryFees>>, ServiceError> {
    let fees = state.services.carrier.delivery_fees(query.wilaya_id).await?;
    Ok(Json(ApiResponse::success(fees)))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::services::catalog::{
    NewVariant, ProductFilter, ProductListResponse, ProductResponse, VariantResponse,
};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub published_only: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/additions", get(list_additions))
        .route("/:id", get(get_product))
        .route("/:id/variants", post(create_variants))
}

/// List products with translations and variants.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<ProductListResponse>)
    ),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<ProductListResponse>>, ServiceError> {
    let filter = ProductFilter {
        product_type: query.product_type,
        published_only: query.published_only,
    };
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .min(state.config.api_max_page_size);
    let products = state.services.catalog.list_products(filter, page, limit).await?;
    Ok(Json(ApiResponse::success(products)))
}

/// List add-on products.
#[utoipa::path(
    get,
    path = "/api/v1/products/additions",
    responses(
        (status = 200, description = "Add-on products retrieved", body = ApiResponse<Vec<ProductResponse>>)
    ),
    tag = "catalog"
)]
pub async fn list_additions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ServiceError> {
    let additions = state.services.catalog.list_additions().await?;
    Ok(Json(ApiResponse::success(additions)))
}

/// Fetch one product with translations and variants.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponse>>, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Create variants for the product identified by the path.
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = Vec<NewVariant>,
    responses(
        (status = 201, description = "Variants created", body = ApiResponse<Vec<VariantResponse>>),
        (status = 400, description = "Empty or invalid variant list"),
        (status = 404, description = "Product not found")
    ),
    tag = "catalog"
)]
pub async fn create_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(variants): Json<Vec<NewVariant>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<VariantResponse>>>), ServiceError> {
    let created = state.services.catalog.create_variants(id, variants).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::models::UserRole;
use crate::services::users::{CreateUserRequest, UserFilter, UserListResponse, UserResponse};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub role: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user))
}

/// List user accounts, optionally filtered by role.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users retrieved", body = ApiResponse<UserListResponse>),
        (status = 400, description = "Unknown role")
    ),
    tag = "employees"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<UserListResponse>>, ServiceError> {
    let role = query
        .role
        .as_deref()
        .map(|r| {
            UserRole::from_str(r)
                .map_err(|_| ServiceError::InvalidInput(format!("Unknown role: {}", r)))
        })
        .transpose()?;

    let filter = UserFilter {
        role,
        active_only: query.active_only,
    };
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .min(state.config.api_max_page_size);
    let users = state.services.users.list_users(filter, page, limit).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Fetch one user account.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "employees"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    let user = state.services.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Create a user account (employee or customer).
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid name, email or role")
    ),
    tag = "employees"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ServiceError> {
    let user = state.services.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

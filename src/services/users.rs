use crate::{
    db::DbPool,
    entities::user::{self, Entity as UserEntity, Model as UserModel},
    errors::ServiceError,
    models::UserRole,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub active_only: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub pending_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Employee and customer account access.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        filter: UserFilter,
        page: u64,
        per_page: u64,
    ) -> Result<UserListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let mut query = UserEntity::find().order_by_asc(user::Column::Name);
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role.to_string()));
        }
        if filter.active_only {
            query = query.filter(user::Column::IsActive.eq(true));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page - 1).await?;

        let users = users
            .into_iter()
            .map(model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserListResponse {
            users,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserResponse, ServiceError> {
        let db = &*self.db_pool;
        let user = UserEntity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {} not found", user_id)))?;
        model_to_response(user)
    }

    #[instrument(skip(self, request), fields(role = %request.role))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let role = UserRole::from_str(&request.role).map_err(|_| {
            ServiceError::ValidationError(format!("Unknown role: {}", request.role))
        })?;

        let db = &*self.db_pool;
        let user_id = Uuid::new_v4();

        let active = user::ActiveModel {
            id: Set(user_id),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            role: Set(role.to_string()),
            pending_balance: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(db).await.map_err(|e| {
            error!(error = %e, %user_id, "Failed to create user");
            ServiceError::DatabaseError(e)
        })?;

        info!(%user_id, %role, "User created");
        model_to_response(model)
    }
}

fn model_to_response(model: UserModel) -> Result<UserResponse, ServiceError> {
    let role = UserRole::from_str(&model.role)
        .map_err(|_| ServiceError::InternalError(format!("Corrupt user role: {}", model.role)))?;
    Ok(UserResponse {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        role,
        pending_balance: model.pending_balance,
        is_active: model.is_active,
        created_at: model.created_at,
    })
}

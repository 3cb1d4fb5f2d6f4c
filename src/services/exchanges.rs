use crate::{
    db::DbPool,
    entities::exchange::{self, ActiveModel as ExchangeActiveModel, Entity as ExchangeEntity},
    entities::exchange_item::{self, Entity as ExchangeItemEntity},
    entities::order::{self, Entity as OrderEntity},
    entities::product::{self, Entity as ProductEntity},
    entities::user::{self, Entity as UserEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::ExchangeStatus,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateExchangeRequest {
    pub customer_id: Uuid,
    pub order_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<CreateExchangeItem>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateExchangeItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub order_id: Uuid,
    pub order_number: Option<String>,
    pub status: ExchangeStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ExchangeItemResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeListResponse {
    pub exchanges: Vec<ExchangeResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Records and tracks product exchange requests.
#[derive(Clone)]
pub struct ExchangeService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ExchangeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a new exchange request with status `pending`.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_exchange(
        &self,
        request: CreateExchangeRequest,
    ) -> Result<ExchangeResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for item in &request.items {
            item.validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let db = &*self.db_pool;
        let exchange_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start exchange creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        // The referenced order must exist and belong to the customer.
        let order = OrderEntity::find_by_id(request.order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", request.order_id))
            })?;
        if order.customer_id != request.customer_id {
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} does not belong to customer {}",
                request.order_id, request.customer_id
            )));
        }

        let active = ExchangeActiveModel {
            id: Set(exchange_id),
            customer_id: Set(request.customer_id),
            order_id: Set(request.order_id),
            status: Set(ExchangeStatus::Pending.to_string()),
            reason: Set(request.reason),
            created_at: Set(Utc::now()),
        };
        active.insert(&txn).await.map_err(|e| {
            error!(error = %e, %exchange_id, "Failed to create exchange");
            ServiceError::DatabaseError(e)
        })?;

        let item_models: Vec<exchange_item::ActiveModel> = request
            .items
            .iter()
            .map(|item| exchange_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                exchange_id: Set(exchange_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
            })
            .collect();
        ExchangeItemEntity::insert_many(item_models)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, %exchange_id, "Failed to create exchange items");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %exchange_id, "Failed to commit exchange creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(%exchange_id, order_id = %request.order_id, "Exchange recorded");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ExchangeRequested {
                    exchange_id,
                    order_id: request.order_id,
                })
                .await
            {
                warn!(error = %e, %exchange_id, "Failed to send exchange requested event");
            }
        }

        self.get_exchange(exchange_id).await
    }

    /// Fetches one exchange with items, product types, customer and order.
    #[instrument(skip(self), fields(exchange_id = %exchange_id))]
    pub async fn get_exchange(&self, exchange_id: Uuid) -> Result<ExchangeResponse, ServiceError> {
        let db = &*self.db_pool;
        let model = ExchangeEntity::find_by_id(exchange_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Exchange with ID {} not found", exchange_id))
            })?;

        let mut responses = self.hydrate(vec![model]).await?;
        Ok(responses.remove(0))
    }

    /// Lists exchanges with nested items/product/customer/order, newest first.
    #[instrument(skip(self))]
    pub async fn list_exchanges(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<ExchangeListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let paginator = ExchangeEntity::find()
            .order_by_desc(exchange::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page - 1).await?;
        let exchanges = self.hydrate(models).await?;

        Ok(ExchangeListResponse {
            exchanges,
            total,
            page,
            per_page,
        })
    }

    /// Returns true iff the user has at least one approved exchange.
    /// Unknown users simply have none.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn has_exchange(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        let db = &*self.db_pool;
        let count = ExchangeEntity::find()
            .filter(exchange::Column::CustomerId.eq(user_id))
            .filter(exchange::Column::Status.eq(ExchangeStatus::Approved.to_string()))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Moves a pending exchange to `approved`.
    #[instrument(skip(self), fields(exchange_id = %exchange_id))]
    pub async fn approve_exchange(
        &self,
        exchange_id: Uuid,
    ) -> Result<ExchangeResponse, ServiceError> {
        self.transition(exchange_id, ExchangeStatus::Approved).await
    }

    /// Moves a pending exchange to `rejected`.
    #[instrument(skip(self), fields(exchange_id = %exchange_id))]
    pub async fn reject_exchange(
        &self,
        exchange_id: Uuid,
    ) -> Result<ExchangeResponse, ServiceError> {
        self.transition(exchange_id, ExchangeStatus::Rejected).await
    }

    async fn transition(
        &self,
        exchange_id: Uuid,
        target: ExchangeStatus,
    ) -> Result<ExchangeResponse, ServiceError> {
        let db = &*self.db_pool;

        // The pending check and the status write must see the same row, so
        // both run inside one transaction.
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, %exchange_id, "Failed to start exchange transition transaction");
            ServiceError::DatabaseError(e)
        })?;

        let model = ExchangeEntity::find_by_id(exchange_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Exchange with ID {} not found", exchange_id))
            })?;

        if model.status != ExchangeStatus::Pending.to_string() {
            return Err(ServiceError::Conflict(format!(
                "Exchange {} is already {}",
                exchange_id, model.status
            )));
        }

        let mut active: ExchangeActiveModel = model.into();
        active.status = Set(target.to_string());
        active.update(&txn).await.map_err(|e| {
            error!(error = %e, %exchange_id, "Failed to update exchange status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %exchange_id, "Failed to commit exchange transition");
            ServiceError::DatabaseError(e)
        })?;

        info!(%exchange_id, status = %target, "Exchange status updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ExchangeStatusChanged {
                    exchange_id,
                    new_status: target.to_string(),
                })
                .await
            {
                warn!(error = %e, %exchange_id, "Failed to send exchange status event");
            }
        }

        self.get_exchange(exchange_id).await
    }

    /// Attaches items, product types, customer names and order numbers to
    /// raw exchange rows.
    async fn hydrate(
        &self,
        models: Vec<exchange::Model>,
    ) -> Result<Vec<ExchangeResponse>, ServiceError> {
        let db = &*self.db_pool;

        let exchange_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let customer_ids: Vec<Uuid> = models.iter().map(|m| m.customer_id).collect();
        let order_ids: Vec<Uuid> = models.iter().map(|m| m.order_id).collect();

        let items = if exchange_ids.is_empty() {
            Vec::new()
        } else {
            ExchangeItemEntity::find()
                .filter(exchange_item::Column::ExchangeId.is_in(exchange_ids))
                .all(db)
                .await?
        };

        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, String> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            ProductEntity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.product_type))
                .collect()
        };

        let customers: HashMap<Uuid, String> = if customer_ids.is_empty() {
            HashMap::new()
        } else {
            UserEntity::find()
                .filter(user::Column::Id.is_in(customer_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect()
        };

        let orders: HashMap<Uuid, String> = if order_ids.is_empty() {
            HashMap::new()
        } else {
            OrderEntity::find()
                .filter(order::Column::Id.is_in(order_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|o| (o.id, o.order_number))
                .collect()
        };

        models
            .into_iter()
            .map(|m| {
                let status = ExchangeStatus::from_str(&m.status).map_err(|_| {
                    ServiceError::InternalError(format!("Corrupt exchange status: {}", m.status))
                })?;
                Ok(ExchangeResponse {
                    id: m.id,
                    customer_id: m.customer_id,
                    customer_name: customers.get(&m.customer_id).cloned(),
                    order_id: m.order_id,
                    order_number: orders.get(&m.order_id).cloned(),
                    status,
                    reason: m.reason,
                    created_at: m.created_at,
                    items: items
                        .iter()
                        .filter(|i| i.exchange_id == m.id)
                        .map(|i| ExchangeItemResponse {
                            id: i.id,
                            product_id: i.product_id,
                            quantity: i.quantity,
                            product_type: products.get(&i.product_id).cloned(),
                        })
                        .collect(),
                })
            })
            .collect()
    }
}

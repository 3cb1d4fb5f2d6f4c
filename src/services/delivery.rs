use crate::{
    db::DbPool,
    entities::order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
    entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderStatus, UserRole},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub order_id: Uuid,
    pub delivery_person_id: Uuid,
    pub order_status: OrderStatus,
    /// Amount credited to the delivery person's pending balance.
    pub accrued: Decimal,
    pub new_pending_balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryPersonResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub pending_balance: Decimal,
}

/// Assigns delivery personnel to orders and accrues their earnings.
#[derive(Clone)]
pub struct DeliveryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl DeliveryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Assigns a delivery person to an order and accrues the order's
    /// shipping price onto their pending balance.
    ///
    /// Both writes happen in one database transaction: a failure at any
    /// point leaves the order unassigned and the balance untouched.
    /// An order that already carries an assignment is rejected with
    /// `Conflict`, so repeating the call cannot double-accrue.
    #[instrument(skip(self), fields(order_id = %order_id, delivery_person_id = %delivery_person_id))]
    pub async fn assign(
        &self,
        order_id: Uuid,
        delivery_person_id: Uuid,
    ) -> Result<AssignmentResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to start assignment transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(%order_id, "Order not found for delivery assignment");
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        if let Some(existing) = order.delivery_person_id {
            warn!(%order_id, %existing, "Order already assigned");
            return Err(ServiceError::Conflict(format!(
                "Order {} is already assigned to delivery person {}",
                order_id, existing
            )));
        }

        let person = UserEntity::find_by_id(delivery_person_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Delivery person with ID {} not found",
                    delivery_person_id
                ))
            })?;

        if person.role != UserRole::Delivery.to_string() {
            return Err(ServiceError::InvalidOperation(format!(
                "User {} has role '{}', expected 'delivery'",
                delivery_person_id, person.role
            )));
        }
        if !person.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Delivery person {} is inactive",
                delivery_person_id
            )));
        }

        let shipping_price = order.shipping_price;
        let order_version = order.version;
        let new_balance = person.pending_balance + shipping_price;

        let mut order_active: OrderActiveModel = order.into();
        order_active.delivery_person_id = Set(Some(delivery_person_id));
        order_active.status = Set(OrderStatus::Shipped.to_string());
        order_active.updated_at = Set(Some(now));
        order_active.version = Set(order_version + 1);
        order_active.update(&txn).await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to set delivery person on order");
            ServiceError::DatabaseError(e)
        })?;

        let mut person_active: UserActiveModel = person.into();
        person_active.pending_balance = Set(new_balance);
        person_active.update(&txn).await.map_err(|e| {
            error!(error = %e, %delivery_person_id, "Failed to accrue delivery balance");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to commit assignment transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(%order_id, %delivery_person_id, %shipping_price, "Delivery assigned and balance accrued");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::DeliveryAssigned {
                    order_id,
                    delivery_person_id,
                    accrued: shipping_price,
                })
                .await
            {
                warn!(error = %e, %order_id, "Failed to send delivery assigned event");
            }
        }

        Ok(AssignmentResponse {
            order_id,
            delivery_person_id,
            order_status: OrderStatus::Shipped,
            accrued: shipping_price,
            new_pending_balance: new_balance,
        })
    }

    /// Lists active users with the delivery role, alphabetically.
    #[instrument(skip(self))]
    pub async fn list_delivery_personnel(
        &self,
    ) -> Result<Vec<DeliveryPersonResponse>, ServiceError> {
        let db = &*self.db_pool;
        let people = UserEntity::find()
            .filter(user::Column::Role.eq(UserRole::Delivery.to_string()))
            .filter(user::Column::IsActive.eq(true))
            .order_by_asc(user::Column::Name)
            .all(db)
            .await?;

        Ok(people
            .into_iter()
            .map(|p| DeliveryPersonResponse {
                id: p.id,
                name: p.name,
                phone: p.phone,
                pending_balance: p.pending_balance,
            })
            .collect())
    }

    /// Returns the current pending balance of a delivery person.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn pending_balance(&self, user_id: Uuid) -> Result<Decimal, ServiceError> {
        let db = &*self.db_pool;
        let person = UserEntity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User with ID {} not found", user_id))
            })?;
        Ok(person.pending_balance)
    }
}

use crate::{
    entities::order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
    entities::order_item::{self, Entity as OrderItemEntity},
    entities::order_item_addon::{self, Entity as OrderItemAddonEntity},
    entities::product::{self, Entity as ProductEntity},
    entities::product_translation::{self, Entity as TranslationEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::OrderStatus,
    services::catalog::{translation_for, DEFAULT_LANGUAGE},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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

use crate::db::DbPool;

/// Typed filter for order listing. Every field is optional; unset fields
/// do not constrain the result.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub shipping_company: Option<String>,
    pub shipping_wilaya_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub shipping_company: Option<String>,
    pub shipping_wilaya_id: Option<i32>,
    pub shipping_price: Decimal,
    pub delivery_person_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product: Option<ProductSummary>,
    pub addons: Vec<AddonResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub product_type: String,
    pub price: Decimal,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddonResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for listing, fetching and mutating orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists orders matching the filter, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }
        if let Some(company) = &filter.shipping_company {
            query = query.filter(order::Column::ShippingCompany.eq(company.clone()));
        }
        if let Some(wilaya_id) = filter.shipping_wilaya_id {
            query = query.filter(order::Column::ShippingWilayaId.eq(wilaya_id));
        }

        let paginator = query.paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(error = %e, page, per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        let orders = orders
            .into_iter()
            .map(model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Fetches one order with its line items, their products and add-ons.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetailResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, %order_id, "Failed to fetch order");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();

        let addons = if item_ids.is_empty() {
            Vec::new()
        } else {
            OrderItemAddonEntity::find()
                .filter(order_item_addon::Column::OrderItemId.is_in(item_ids))
                .all(db)
                .await?
        };

        let products: HashMap<Uuid, product::Model> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            ProductEntity::find()
                .filter(product::Column::Id.is_in(product_ids.clone()))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let mut translations: HashMap<Uuid, Vec<product_translation::Model>> = HashMap::new();
        if !product_ids.is_empty() {
            let rows = TranslationEntity::find()
                .filter(product_translation::Column::ProductId.is_in(product_ids))
                .all(db)
                .await?;
            for row in rows {
                translations.entry(row.product_id).or_default().push(row);
            }
        }

        let items = items
            .into_iter()
            .map(|item| {
                let item_addons = addons
                    .iter()
                    .filter(|a| a.order_item_id == item.id)
                    .map(|a| AddonResponse {
                        id: a.id,
                        product_id: a.product_id,
                        price: a.price,
                    })
                    .collect();
                let product = products.get(&item.product_id).map(|p| ProductSummary {
                    id: p.id,
                    product_type: p.product_type.clone(),
                    price: p.price,
                    name: translations
                        .get(&p.id)
                        .and_then(|ts| translation_for(ts, DEFAULT_LANGUAGE))
                        .map(|t| t.name.clone()),
                });
                OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    product,
                    addons: item_addons,
                }
            })
            .collect();

        Ok(OrderDetailResponse {
            order: model_to_response(order)?,
            items,
        })
    }

    /// Updates an order's status.
    ///
    /// Any known status may be set from any other; the back office corrects
    /// mislabeled orders by moving them freely between statuses.
    #[instrument(skip(self, request), fields(order_id = %order_id, new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let new_status = OrderStatus::from_str(&request.status)
            .map_err(|_| ServiceError::InvalidStatus(format!("Unknown order status: {}", request.status)))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to start transaction for status update");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(%order_id, "Order not found for status update");
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        let old_status = order.status.clone();
        let version = order.version;

        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to update order status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to commit status update");
            ServiceError::DatabaseError(e)
        })?;

        info!(%order_id, %old_status, new_status = %new_status, "Order status updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, %order_id, "Failed to send order status changed event");
            }
        }

        model_to_response(updated)
    }

    /// Resolves an order number to its UUID, if the order exists.
    pub async fn find_order_id_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Uuid>, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(db)
            .await?;
        Ok(order.map(|o| o.id))
    }
}

fn model_to_response(model: OrderModel) -> Result<OrderResponse, ServiceError> {
    let status = OrderStatus::from_str(&model.status)
        .map_err(|_| ServiceError::InternalError(format!("Corrupt order status: {}", model.status)))?;
    Ok(OrderResponse {
        id: model.id,
        order_number: model.order_number,
        customer_id: model.customer_id,
        status,
        shipping_company: model.shipping_company,
        shipping_wilaya_id: model.shipping_wilaya_id,
        shipping_price: model.shipping_price,
        delivery_person_id: model.delivery_person_id,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
        version: model.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_order(status: &str) -> OrderModel {
        OrderModel {
            id: Uuid::new_v4(),
            order_number: "ORD-001".to_string(),
            customer_id: Uuid::new_v4(),
            status: status.to_string(),
            shipping_company: Some("yalidine".to_string()),
            shipping_wilaya_id: Some(16),
            shipping_price: dec!(500),
            delivery_person_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        }
    }

    #[test]
    fn model_to_response_parses_status() {
        let model = sample_order("pending");
        let id = model.id;
        let response = model_to_response(model).unwrap();
        assert_eq!(response.id, id);
        assert_eq!(response.status, OrderStatus::Pending);
        assert_eq!(response.shipping_price, dec!(500));
    }

    #[test]
    fn model_to_response_rejects_corrupt_status() {
        let model = sample_order("limbo");
        assert!(matches!(
            model_to_response(model),
            Err(ServiceError::InternalError(_))
        ));
    }
}

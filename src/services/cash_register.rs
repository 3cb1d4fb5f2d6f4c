use crate::{
    db::DbPool,
    entities::ledger_entry::{self, Entity as LedgerEntity, Model as LedgerModel},
    errors::ServiceError,
    events::{Event, EventSender},
    models::LedgerDirection,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewLedgerEntry {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Non-numeric JSON values are rejected before this struct is built.
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Entry type is required"))]
    pub entry_type: String,
    #[validate(length(min = 1, message = "Direction is required"))]
    pub direction: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub entry_type: String,
    pub direction: LedgerDirection,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryListResponse {
    pub entries: Vec<LedgerEntryResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Register totals derived from a full scan of the ledger.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegisterStats {
    pub inflow: Decimal,
    pub outflow: Decimal,
    /// Inflow minus outflow. This is raw net cash movement, not profit;
    /// cost of goods never enters the ledger.
    pub net_flow: Decimal,
    pub entry_count: u64,
}

/// Append-only cash register. Entries are never updated or deleted; the
/// balance is always recomputed from the rows.
#[derive(Clone)]
pub struct CashRegisterService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CashRegisterService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Validates and appends one ledger entry.
    #[instrument(skip(self, entry), fields(direction = %entry.direction))]
    pub async fn record_entry(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntryResponse, ServiceError> {
        entry
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let direction = LedgerDirection::from_str(&entry.direction).map_err(|_| {
            ServiceError::ValidationError(format!(
                "Direction must be 'inbound' or 'outbound', got '{}'",
                entry.direction
            ))
        })?;

        let db = &*self.db_pool;
        let entry_id = Uuid::new_v4();

        let active = ledger_entry::ActiveModel {
            id: Set(entry_id),
            description: Set(entry.description),
            amount: Set(entry.amount),
            entry_type: Set(entry.entry_type),
            direction: Set(direction.to_string()),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(db).await.map_err(|e| {
            error!(error = %e, %entry_id, "Failed to record ledger entry");
            ServiceError::DatabaseError(e)
        })?;

        info!(%entry_id, %direction, amount = %model.amount, "Ledger entry recorded");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::LedgerEntryRecorded {
                    entry_id,
                    direction: direction.to_string(),
                    amount: model.amount,
                })
                .await
            {
                warn!(error = %e, %entry_id, "Failed to send ledger entry event");
            }
        }

        model_to_response(model)
    }

    /// Lists ledger entries, newest first.
    #[instrument(skip(self))]
    pub async fn list_entries(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<LedgerEntryListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let paginator = LedgerEntity::find()
            .order_by_desc(ledger_entry::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page - 1).await?;

        let entries = entries
            .into_iter()
            .map(model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LedgerEntryListResponse {
            entries,
            total,
            page,
            per_page,
        })
    }

    /// Sums every entry by direction.
    #[instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<RegisterStats, ServiceError> {
        let db = &*self.db_pool;
        let entries = LedgerEntity::find().all(db).await?;
        Ok(compute_stats(&entries))
    }
}

fn model_to_response(model: LedgerModel) -> Result<LedgerEntryResponse, ServiceError> {
    let direction = LedgerDirection::from_str(&model.direction).map_err(|_| {
        ServiceError::InternalError(format!("Corrupt ledger direction: {}", model.direction))
    })?;
    Ok(LedgerEntryResponse {
        id: model.id,
        description: model.description,
        amount: model.amount,
        entry_type: model.entry_type,
        direction,
        created_at: model.created_at,
    })
}

fn compute_stats(entries: &[LedgerModel]) -> RegisterStats {
    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;

    for entry in entries {
        match LedgerDirection::from_str(&entry.direction) {
            Ok(LedgerDirection::Inbound) => inflow += entry.amount,
            Ok(LedgerDirection::Outbound) => outflow += entry.amount,
            Err(_) => warn!(entry_id = %entry.id, direction = %entry.direction, "Skipping entry with corrupt direction"),
        }
    }

    RegisterStats {
        inflow,
        outflow,
        net_flow: inflow - outflow,
        entry_count: entries.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(amount: Decimal, direction: &str) -> LedgerModel {
        LedgerModel {
            id: Uuid::new_v4(),
            description: "test".into(),
            amount,
            entry_type: "sale".into(),
            direction: direction.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stats_net_flow_equals_inflow_minus_outflow() {
        let entries = vec![
            entry(dec!(1200.50), "inbound"),
            entry(dec!(300), "inbound"),
            entry(dec!(450.25), "outbound"),
        ];
        let stats = compute_stats(&entries);
        assert_eq!(stats.inflow, dec!(1500.50));
        assert_eq!(stats.outflow, dec!(450.25));
        assert_eq!(stats.net_flow, stats.inflow - stats.outflow);
        assert_eq!(stats.entry_count, 3);
    }

    #[test]
    fn stats_on_empty_ledger_are_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.inflow, Decimal::ZERO);
        assert_eq!(stats.outflow, Decimal::ZERO);
        assert_eq!(stats.net_flow, Decimal::ZERO);
        assert_eq!(stats.entry_count, 0);
    }

    #[test]
    fn corrupt_direction_rows_are_skipped_not_fatal() {
        let entries = vec![entry(dec!(100), "inbound"), entry(dec!(999), "sideways")];
        let stats = compute_stats(&entries);
        assert_eq!(stats.inflow, dec!(100));
        assert_eq!(stats.outflow, Decimal::ZERO);
        assert_eq!(stats.entry_count, 2);
    }

    #[test]
    fn corrupt_direction_is_an_internal_error_on_read() {
        use assert_matches::assert_matches;

        let result = model_to_response(entry(dec!(100), "sideways"));
        assert_matches!(result, Err(ServiceError::InternalError(_)));
    }

    #[test]
    fn new_entry_rejects_missing_fields() {
        let missing_description = NewLedgerEntry {
            description: String::new(),
            amount: dec!(10),
            entry_type: "sale".into(),
            direction: "inbound".into(),
        };
        assert!(missing_description.validate().is_err());

        let missing_type = NewLedgerEntry {
            description: "ok".into(),
            amount: dec!(10),
            entry_type: String::new(),
            direction: "inbound".into(),
        };
        assert!(missing_type.validate().is_err());
    }
}

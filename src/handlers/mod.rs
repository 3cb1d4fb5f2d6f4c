pub mod carrier;
pub mod cash_register;
pub mod catalog;
pub mod delivery;
pub mod employees;
pub mod exchanges;
pub mod orders;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<crate::services::orders::OrderService>,
    pub delivery: Arc<crate::services::delivery::DeliveryService>,
    pub cash_register: Arc<crate::services::cash_register::CashRegisterService>,
    pub catalog: Arc<crate::services::catalog::CatalogService>,
    pub exchanges: Arc<crate::services::exchanges::ExchangeService>,
    pub users: Arc<crate::services::users::UserService>,
    pub carrier: Arc<crate::services::carrier::CarrierService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            orders: Arc::new(crate::services::orders::OrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            delivery: Arc::new(crate::services::delivery::DeliveryService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            cash_register: Arc::new(crate::services::cash_register::CashRegisterService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            catalog: Arc::new(crate::services::catalog::CatalogService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            exchanges: Arc::new(crate::services::exchanges::ExchangeService::new(
                db_pool.clone(),
                Some(event_sender),
            )),
            users: Arc::new(crate::services::users::UserService::new(db_pool)),
            carrier: Arc::new(crate::services::carrier::CarrierService::new(config)?),
        })
    }
}

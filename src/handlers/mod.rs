pub mod catalog;
pub mod common;
pub mod health;
pub mod purchase_orders;

use crate::{
    config::AppConfig,
    db::DbPool,
    repositories::{CatalogRepository, PurchaseOrderRepository},
    services::{ApprovalTracker, ProcurementService},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone, Debug)]
pub struct AppServices {
    pub procurement: Arc<ProcurementService>,
    pub approvals: Arc<ApprovalTracker>,
    pub catalog: Arc<CatalogRepository>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        ping_before_write: bool,
        default_created_by: impl Into<String>,
    ) -> Self {
        let orders =
            PurchaseOrderRepository::new(db_pool.clone()).with_ping_before_write(ping_before_write);
        let catalog = CatalogRepository::new(db_pool.clone());

        let procurement = Arc::new(ProcurementService::new(
            db_pool,
            orders.clone(),
            catalog.clone(),
            default_created_by,
        ));
        let approvals = Arc::new(ApprovalTracker::new(orders));

        Self {
            procurement,
            approvals,
            catalog: Arc::new(catalog),
        }
    }

    pub fn from_config(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self::new(
            db_pool,
            config.db_ping_before_write,
            config.default_created_by.clone(),
        )
    }
}

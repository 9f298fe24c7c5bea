use crate::{db, errors::ServiceError};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod catalog_repository;
pub mod purchase_order_repository;

pub use catalog_repository::CatalogRepository;
pub use purchase_order_repository::PurchaseOrderRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
    ping_before_write: bool,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            ping_before_write: false,
        }
    }

    /// Ping the store ahead of every mutating call.
    pub fn with_ping_before_write(mut self, enabled: bool) -> Self {
        self.ping_before_write = enabled;
        self
    }

    /// Liveness check run before writes. No reconnect or retry happens here.
    pub async fn ensure_writable(&self) -> Result<(), ServiceError> {
        if self.ping_before_write {
            db::check_connection(&self.db).await?;
        }
        Ok(())
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

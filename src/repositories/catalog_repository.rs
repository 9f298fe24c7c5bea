use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use tracing::instrument;

use super::{BaseRepository, Repository};
use crate::errors::ServiceError;
use crate::models::{
    item_entity, item_supplier_entity, purchase_order_item_entity, suppliers,
};

/// Read-only access to suppliers, items and the item/supplier mapping.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    base: BaseRepository,
}

impl CatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<suppliers::Model>, ServiceError> {
        Ok(suppliers::Entity::find()
            .order_by_asc(suppliers::Column::Name)
            .order_by_asc(suppliers::Column::Id)
            .all(self.get_db())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn find_supplier(&self, id: i64) -> Result<Option<suppliers::Model>, ServiceError> {
        Ok(suppliers::Entity::find_by_id(id).one(self.get_db()).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<item_entity::Model>, ServiceError> {
        Ok(item_entity::Entity::find()
            .order_by_asc(item_entity::Column::Id)
            .all(self.get_db())
            .await?)
    }

    /// Item/supplier pairs ordered by item, then supplier id. Callers that
    /// need a single supplier per item take the first pair they see.
    #[instrument(skip(self))]
    pub async fn item_supplier_mapping(
        &self,
    ) -> Result<Vec<item_supplier_entity::Model>, ServiceError> {
        Ok(item_supplier_entity::Entity::find()
            .order_by_asc(item_supplier_entity::Column::ItemId)
            .order_by_asc(item_supplier_entity::Column::SupplierId)
            .all(self.get_db())
            .await?)
    }

    /// Most recently entered positive estimated price for an item.
    #[instrument(skip(self))]
    pub async fn latest_estimated_price(
        &self,
        item_id: i64,
    ) -> Result<Option<Decimal>, ServiceError> {
        use purchase_order_item_entity::Column;

        let latest = purchase_order_item_entity::Entity::find()
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::EstimatedPrice.is_not_null())
            .filter(Column::EstimatedPrice.gt(Decimal::ZERO))
            .order_by_desc(Column::Id)
            .limit(1)
            .one(self.get_db())
            .await?;

        Ok(latest.and_then(|line| line.estimated_price))
    }
}

impl Repository for CatalogRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "supplierid")]
    pub id: i64,
    #[sea_orm(column_name = "suppliername")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_entity::Entity")]
    PurchaseOrders,
    #[sea_orm(has_many = "super::item_supplier_entity::Entity")]
    ItemSuppliers,
}

impl Related<super::purchase_order_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::item_supplier_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemSuppliers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

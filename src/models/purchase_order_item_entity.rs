use super::purchase_order_entity::Approval;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchaseorderitems")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "poitemid")]
    pub id: i64,
    #[sea_orm(column_name = "poid")]
    pub order_id: i64,
    #[sea_orm(column_name = "itemid")]
    pub item_id: i64,
    #[sea_orm(column_name = "orderedquantity")]
    pub ordered_quantity: Option<i32>,
    #[sea_orm(column_name = "estimatedprice")]
    pub estimated_price: Option<Decimal>,
    #[sea_orm(column_name = "receivedquantity")]
    pub received_quantity: i32,
    #[sea_orm(column_name = "supproposedquantity")]
    pub supplier_proposed_quantity: Option<i32>,
    #[sea_orm(column_name = "supproposedprice")]
    pub supplier_proposed_price: Option<Decimal>,
    pub approval: Approval,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_order_entity::Entity",
        from = "Column::OrderId",
        to = "super::purchase_order_entity::Column::Id"
    )]
    PurchaseOrder,
    #[sea_orm(
        belongs_to = "super::item_entity::Entity",
        from = "Column::ItemId",
        to = "super::item_entity::Column::Id"
    )]
    Item,
}

impl Related<super::purchase_order_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl Related<super::item_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

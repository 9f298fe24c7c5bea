use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which suppliers stock which items.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "itemsupplier")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "itemid")]
    pub item_id: i64,
    #[sea_orm(primary_key, auto_increment = false, column_name = "supplierid")]
    pub supplier_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item_entity::Entity",
        from = "Column::ItemId",
        to = "super::item_entity::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Supplier,
}

impl Related<super::item_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

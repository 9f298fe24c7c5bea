use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog item. Read-only from the point of view of the order engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "itemid")]
    pub id: i64,
    #[sea_orm(column_name = "itemnameenglish")]
    pub name: String,
    #[sea_orm(column_name = "itempicture")]
    pub picture: Option<Vec<u8>>,
    #[sea_orm(column_name = "averagerequired")]
    pub average_required: Option<i32>,
    #[sea_orm(column_name = "classcat")]
    pub class_cat: Option<String>,
    #[sea_orm(column_name = "departmentcat")]
    pub department_cat: Option<String>,
    #[sea_orm(column_name = "sectioncat")]
    pub section_cat: Option<String>,
    #[sea_orm(column_name = "familycat")]
    pub family_cat: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_item_entity::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::item_supplier_entity::Entity")]
    ItemSuppliers,
}

impl Related<super::purchase_order_item_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::item_supplier_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemSuppliers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

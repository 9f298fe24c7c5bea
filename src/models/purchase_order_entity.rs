use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumString, IntoStaticStr};

/// Order status as stored in `purchaseorders.status`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "Pending")]
    #[strum(serialize = "Pending")]
    Pending,
    #[sea_orm(string_value = "Received")]
    #[strum(serialize = "Received")]
    Received,
    #[sea_orm(string_value = "Completed")]
    #[strum(serialize = "Completed")]
    Completed,
    #[sea_orm(string_value = "Declined")]
    #[strum(serialize = "Declined")]
    Declined,
    #[sea_orm(string_value = "Declined by Supplier")]
    #[strum(serialize = "Declined by Supplier")]
    #[serde(rename = "Declined by Supplier")]
    DeclinedBySupplier,
    #[sea_orm(string_value = "Declined by AMAS")]
    #[strum(serialize = "Declined by AMAS")]
    #[serde(rename = "Declined by AMAS")]
    DeclinedByAmas,
    #[sea_orm(string_value = "Accepted by AMAS")]
    #[strum(serialize = "Accepted by AMAS")]
    #[serde(rename = "Accepted by AMAS")]
    AcceptedByAmas,
    #[sea_orm(string_value = "Modified by AMAS")]
    #[strum(serialize = "Modified by AMAS")]
    #[serde(rename = "Modified by AMAS")]
    ModifiedByAmas,
}

impl PurchaseOrderStatus {
    /// Statuses that take an order off the operational worklist.
    pub const ARCHIVED: [PurchaseOrderStatus; 4] = [
        PurchaseOrderStatus::Completed,
        PurchaseOrderStatus::Declined,
        PurchaseOrderStatus::DeclinedByAmas,
        PurchaseOrderStatus::DeclinedBySupplier,
    ];

    /// Statuses an order may be accepted or modified from. Anything else has
    /// already been superseded or closed.
    pub const AMENDABLE: [PurchaseOrderStatus; 2] =
        [PurchaseOrderStatus::Pending, PurchaseOrderStatus::Received];

    pub fn is_archived(self) -> bool {
        Self::ARCHIVED.contains(&self)
    }

    pub fn is_amendable(self) -> bool {
        Self::AMENDABLE.contains(&self)
    }

    /// True once an amendment has replaced this row with a newer one.
    pub fn is_superseded(self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::AcceptedByAmas | PurchaseOrderStatus::ModifiedByAmas
        )
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state approval flag shared by orders and their line items.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Approval {
    #[default]
    #[sea_orm(string_value = "pending")]
    #[strum(serialize = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    #[strum(serialize = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    #[strum(serialize = "rejected")]
    Rejected,
}

impl Approval {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchaseorders")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "poid")]
    pub id: i64,
    #[sea_orm(column_name = "supplierid")]
    pub supplier_id: i64,
    #[sea_orm(column_name = "orderdate")]
    pub order_date: DateTime<Utc>,
    #[sea_orm(column_name = "expecteddelivery")]
    pub expected_delivery: Option<DateTime<Utc>>,
    pub status: PurchaseOrderStatus,
    #[sea_orm(column_name = "respondedat")]
    pub responded_at: Option<DateTime<Utc>>,
    #[sea_orm(column_name = "actualdelivery")]
    pub actual_delivery: Option<DateTime<Utc>>,
    #[sea_orm(column_name = "createdby")]
    pub created_by: String,
    #[sea_orm(column_name = "supproposeddeliver")]
    pub supplier_proposed_delivery: Option<DateTime<Utc>>,
    #[sea_orm(column_name = "suppliernote", column_type = "Text", nullable)]
    pub supplier_note: Option<String>,
    #[sea_orm(column_name = "originalpoid")]
    pub original_id: Option<i64>,
    pub approval: Approval,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::purchase_order_item_entity::Entity")]
    Items,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::purchase_order_item_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

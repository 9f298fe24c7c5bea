// Catalog
pub mod item_entity;
pub mod item_supplier_entity;
pub mod suppliers;

// Procurement
pub mod purchase_order_entity;
pub mod purchase_order_item_entity;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Re-export common types for convenience
pub use purchase_order_entity::{Approval, PurchaseOrderStatus};
pub use purchase_order_entity::Model as PurchaseOrder;
pub use purchase_order_item_entity::Model as PurchaseOrderItem;

/// Largest number of decimal places a stored price keeps.
pub const PRICE_SCALE: u32 = 4;
/// Prices are stored as `DECIMAL(15, 4)`, so they stay below 10^11. Fifteen
/// significant digits also survive SQLite's floating-point storage unchanged.
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(1_215_752_192, 23, 0, false, 0);

/// Prices must be non-negative and fit the stored column exactly.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        let mut err = ValidationError::new("price_negative");
        err.message = Some("Price must not be negative".into());
        return Err(err);
    }
    if price.normalize().scale() > PRICE_SCALE {
        let mut err = ValidationError::new("price_scale");
        err.message = Some(format!("Price allows at most {} decimal places", PRICE_SCALE).into());
        return Err(err);
    }
    if *price >= PRICE_LIMIT {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Price must be below 100000000000".into());
        return Err(err);
    }
    Ok(())
}

/// One line of an order about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewOrderLine {
    pub item_id: i64,
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// `None` records the line as unpriced.
    #[serde(default)]
    #[validate(custom = "validate_price")]
    pub estimated_price: Option<Decimal>,
    #[serde(default)]
    pub approval: Approval,
}

/// Header and lines of an order about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewOrder {
    pub supplier_id: i64,
    pub expected_delivery: Option<DateTime<Utc>>,
    #[validate]
    pub items: Vec<NewOrderLine>,
    #[validate(length(min = 1, max = 255))]
    pub created_by: String,
    #[serde(default)]
    pub original_id: Option<i64>,
    #[serde(default)]
    pub approval: Approval,
}

/// Supplier's counter-offer for a single line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LineProposal {
    pub item_id: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[serde(default)]
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
}

/// Supplier's counter-offer for a whole order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SupplierProposal {
    #[serde(default)]
    pub proposed_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    #[validate]
    pub items: Vec<LineProposal>,
}

/// A cart entry that has not been assigned to a supplier yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CartLine {
    pub item_id: i64,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[serde(default)]
    pub estimated_price: Option<Decimal>,
}

/// Order line joined with its catalog item for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineView {
    #[serde(flatten)]
    pub line: PurchaseOrderItem,
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_picture: Option<Vec<u8>>,
}

/// Order header joined with its supplier name and lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub supplier_name: Option<String>,
    pub items: Vec<OrderLineView>,
}

// Export a prelude module with common entity types
pub mod prelude {
    pub use super::item_entity::Entity as Item;
    pub use super::item_supplier_entity::Entity as ItemSupplier;
    pub use super::purchase_order_entity::Entity as PurchaseOrders;
    pub use super::purchase_order_item_entity::Entity as PurchaseOrderItems;
    pub use super::suppliers::Entity as Supplier;

    pub use super::purchase_order_entity::{Approval, PurchaseOrderStatus};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn priced_line(price: Decimal) -> NewOrderLine {
        NewOrderLine {
            item_id: 1,
            quantity: 2,
            estimated_price: Some(price),
            approval: Approval::Pending,
        }
    }

    #[test]
    fn price_limit_is_ten_to_the_eleventh() {
        assert_eq!(PRICE_LIMIT, dec!(100000000000));
    }

    #[test]
    fn prices_within_the_column_pass() {
        assert!(priced_line(dec!(0)).validate().is_ok());
        assert!(priced_line(dec!(12.5)).validate().is_ok());
        assert!(priced_line(dec!(99999999999.9999)).validate().is_ok());
        assert!(priced_line(dec!(3.50000)).validate().is_ok());
    }

    #[test]
    fn negative_oversized_and_overprecise_prices_fail() {
        assert!(priced_line(dec!(-0.01)).validate().is_err());
        assert!(priced_line(dec!(100000000000)).validate().is_err());
        assert!(priced_line(dec!(12345678901234.5678)).validate().is_err());
        assert!(priced_line(dec!(1.23456)).validate().is_err());
    }

    #[test]
    fn supplier_price_uses_the_same_rule() {
        let proposal = SupplierProposal {
            items: vec![LineProposal {
                item_id: 1,
                quantity: Some(3),
                price: Some(dec!(-4)),
            }],
            ..Default::default()
        };
        assert!(proposal.validate().is_err());
    }
}

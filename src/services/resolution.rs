//! Quantity and price a line carries into an accepted amendment.
//!
//! A supplier counter-offer overrides the original ask field by field. When
//! neither side named a value the quantity falls back to 1 and the price is
//! reported as [`Pricing::Unpriced`] rather than a silent zero.

use crate::models::PurchaseOrderItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where the resolved quantity came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantitySource {
    SupplierProposal,
    Ordered,
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Pricing {
    Priced(Decimal),
    Unpriced,
}

impl Pricing {
    /// Value to persist; unpriced lines are stored as null.
    pub fn amount(self) -> Option<Decimal> {
        match self {
            Pricing::Priced(amount) => Some(amount),
            Pricing::Unpriced => None,
        }
    }

    /// Flattened view for callers that render unpriced as zero.
    pub fn amount_or_zero(self) -> Decimal {
        self.amount().unwrap_or(Decimal::ZERO)
    }

    pub fn is_priced(self) -> bool {
        matches!(self, Pricing::Priced(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTerms {
    pub quantity: i32,
    pub quantity_source: QuantitySource,
    pub pricing: Pricing,
}

pub const DEFAULT_QUANTITY: i32 = 1;

/// A supplier-proposed quantity is taken as given, zero included. An ordered
/// quantity of zero counts as unset and falls through to the default.
pub fn resolve_quantity(proposed: Option<i32>, ordered: Option<i32>) -> (i32, QuantitySource) {
    match (proposed, ordered) {
        (Some(quantity), _) => (quantity, QuantitySource::SupplierProposal),
        (None, Some(quantity)) if quantity != 0 => (quantity, QuantitySource::Ordered),
        (None, _) => (DEFAULT_QUANTITY, QuantitySource::Default),
    }
}

pub fn resolve_price(proposed: Option<Decimal>, estimated: Option<Decimal>) -> Pricing {
    proposed
        .or(estimated)
        .map_or(Pricing::Unpriced, Pricing::Priced)
}

/// Applies both fallback chains to one stored line.
pub fn resolve(line: &PurchaseOrderItem) -> ResolvedTerms {
    let (quantity, quantity_source) =
        resolve_quantity(line.supplier_proposed_quantity, line.ordered_quantity);
    ResolvedTerms {
        quantity,
        quantity_source,
        pricing: resolve_price(line.supplier_proposed_price, line.estimated_price),
    }
}

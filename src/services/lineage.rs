//! Append-only amendment history.
//!
//! Accepting or modifying an order never edits it: a new row is written that
//! points back at the one it replaces, and the old row is marked superseded.
//! The rows linked this way form a lineage, and [`current_head`] picks the one
//! row in it that is still authoritative.

use crate::models::{PurchaseOrder, PurchaseOrderStatus};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// One row of a lineage, classified by what its status means for the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrderVersion {
    /// Still open for work or amendment.
    Live {
        id: i64,
        amends: Option<i64>,
        status: PurchaseOrderStatus,
    },
    /// Replaced by a newer row.
    Superseded {
        id: i64,
        amends: Option<i64>,
        status: PurchaseOrderStatus,
    },
    /// Completed or declined. Terminal, but still the head if nothing replaced it.
    Closed {
        id: i64,
        amends: Option<i64>,
        status: PurchaseOrderStatus,
    },
}

impl OrderVersion {
    pub fn id(&self) -> i64 {
        match *self {
            OrderVersion::Live { id, .. }
            | OrderVersion::Superseded { id, .. }
            | OrderVersion::Closed { id, .. } => id,
        }
    }

    pub fn amends(&self) -> Option<i64> {
        match *self {
            OrderVersion::Live { amends, .. }
            | OrderVersion::Superseded { amends, .. }
            | OrderVersion::Closed { amends, .. } => amends,
        }
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        match *self {
            OrderVersion::Live { status, .. }
            | OrderVersion::Superseded { status, .. }
            | OrderVersion::Closed { status, .. } => status,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, OrderVersion::Superseded { .. })
    }
}

impl From<&PurchaseOrder> for OrderVersion {
    fn from(order: &PurchaseOrder) -> Self {
        let (id, amends, status) = (order.id, order.original_id, order.status);
        if status.is_superseded() {
            OrderVersion::Superseded { id, amends, status }
        } else if status.is_archived() {
            OrderVersion::Closed { id, amends, status }
        } else {
            OrderVersion::Live { id, amends, status }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    #[error("lineage is empty")]
    Empty,
    #[error("every version in the lineage has been superseded")]
    NoHead,
    #[error("lineage forks into versions {0:?}")]
    Forked(Vec<i64>),
}

/// Returns the single version that is neither superseded nor amended by
/// another version in `versions`.
pub fn current_head(versions: &[OrderVersion]) -> Result<&OrderVersion, LineageError> {
    if versions.is_empty() {
        return Err(LineageError::Empty);
    }

    let mut successors: HashMap<i64, Vec<i64>> = HashMap::new();
    for version in versions {
        if let Some(parent) = version.amends() {
            successors.entry(parent).or_default().push(version.id());
        }
    }

    if let Some(children) = successors.values().find(|children| children.len() > 1) {
        let mut ids = children.clone();
        ids.sort_unstable();
        return Err(LineageError::Forked(ids));
    }

    let heads: Vec<&OrderVersion> = versions
        .iter()
        .filter(|v| !v.is_superseded() && !successors.contains_key(&v.id()))
        .collect();

    match heads.as_slice() {
        [] => Err(LineageError::NoHead),
        [head] => Ok(head),
        many => {
            let mut ids: Vec<i64> = many.iter().map(|v| v.id()).collect();
            ids.sort_unstable();
            Err(LineageError::Forked(ids))
        }
    }
}

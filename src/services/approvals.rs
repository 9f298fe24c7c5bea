use crate::{
    errors::ServiceError,
    models::Approval,
    repositories::PurchaseOrderRepository,
};
use metrics::counter;
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Parses caller-supplied approval text. This is the only place an
/// out-of-range approval value can appear.
pub fn parse_approval(value: &str) -> Result<Approval, ServiceError> {
    Approval::from_str(value.trim()).map_err(|_| {
        warn!(value, "Rejected approval value");
        ServiceError::ValidationError(format!(
            "Approval must be one of pending, approved, rejected; got '{}'",
            value
        ))
    })
}

/// Order-level and item-level approval flags. The two tracks are
/// independent: neither is derived from the other.
#[derive(Debug, Clone)]
pub struct ApprovalTracker {
    repository: PurchaseOrderRepository,
}

impl ApprovalTracker {
    pub fn new(repository: PurchaseOrderRepository) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn set_order_approval(
        &self,
        order_id: i64,
        approval: Approval,
    ) -> Result<(), ServiceError> {
        self.repository.set_order_approval(order_id, approval).await?;
        counter!("amas_po.approval_updates", 1, "level" => "order");
        info!(order_id, approval = %approval, "Order approval updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_item_approval(
        &self,
        order_id: i64,
        item_id: i64,
        approval: Approval,
    ) -> Result<(), ServiceError> {
        self.repository
            .set_item_approval(order_id, item_id, approval)
            .await?;
        counter!("amas_po.approval_updates", 1, "level" => "item");
        info!(order_id, item_id, approval = %approval, "Item approval updated");
        Ok(())
    }

    pub async fn order_approval(&self, order_id: i64) -> Result<Approval, ServiceError> {
        self.repository
            .fetch_order(order_id)
            .await?
            .map(|order| order.approval)
            .ok_or_else(|| ServiceError::order_not_found(order_id))
    }

    /// `(item_id, approval)` for every line of the order.
    pub async fn item_approvals(&self, order_id: i64) -> Result<Vec<(i64, Approval)>, ServiceError> {
        Ok(self
            .repository
            .fetch_items(order_id)
            .await?
            .into_iter()
            .map(|line| (line.item_id, line.approval))
            .collect())
    }
}

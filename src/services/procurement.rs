use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        CartLine, NewOrder, NewOrderLine, OrderSummary, PurchaseOrder, PurchaseOrderItem,
        PurchaseOrderStatus, SupplierProposal,
    },
    repositories::{
        purchase_order_repository::{find_items, find_order, insert_order, transition_status},
        CatalogRepository, PurchaseOrderRepository,
    },
    services::{
        lineage::{current_head, OrderVersion},
        resolution,
    },
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// Caller-supplied replacement for an order under amendment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderModification {
    pub expected_delivery: Option<DateTime<Utc>>,
    #[validate]
    pub items: Vec<NewOrderLine>,
    /// Attribution for the new row. Falls back to the source order's creator.
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub created_by: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Amendment {
    Accept,
    Modify,
}

impl Amendment {
    fn target_status(self) -> PurchaseOrderStatus {
        match self {
            Amendment::Accept => PurchaseOrderStatus::AcceptedByAmas,
            Amendment::Modify => PurchaseOrderStatus::ModifiedByAmas,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Amendment::Accept => "accept",
            Amendment::Modify => "modify",
        }
    }
}

/// Result of creating one order for one supplier out of a mixed cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupplierOrderOutcome {
    pub supplier_id: i64,
    pub line_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub orders: Vec<SupplierOrderOutcome>,
    /// Items with no supplier mapping; these were not ordered.
    pub unmapped_items: Vec<i64>,
}

/// Every row of a lineage together with the head, when one can be determined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineageView {
    pub orders: Vec<PurchaseOrder>,
    pub versions: Vec<OrderVersion>,
    pub head: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<String>,
}

/// Service for the purchase order lifecycle: creation, delivery, supplier
/// responses and amendment by cloning.
#[derive(Debug, Clone)]
pub struct ProcurementService {
    db_pool: Arc<DbPool>,
    orders: PurchaseOrderRepository,
    catalog: CatalogRepository,
    default_created_by: String,
}

impl ProcurementService {
    pub fn new(
        db_pool: Arc<DbPool>,
        orders: PurchaseOrderRepository,
        catalog: CatalogRepository,
        default_created_by: impl Into<String>,
    ) -> Self {
        Self {
            db_pool,
            orders,
            catalog,
            default_created_by: default_created_by.into(),
        }
    }

    pub fn default_created_by(&self) -> &str {
        &self.default_created_by
    }

    /// Creates a new purchase order in status `Pending`
    #[instrument(skip(self, order), fields(supplier_id = order.supplier_id))]
    pub async fn create_order(&self, order: NewOrder) -> Result<i64, ServiceError> {
        order.validate()?;
        if self.catalog.find_supplier(order.supplier_id).await?.is_none() {
            warn!(supplier_id = order.supplier_id, "Order for unknown supplier");
            return Err(ServiceError::NotFound(format!(
                "Supplier {} not found",
                order.supplier_id
            )));
        }
        let order_id = self.orders.create_order(&order).await.map_err(|e| {
            error!(error = %e, "Failed to create purchase order");
            e
        })?;
        counter!("amas_po.created", 1);
        Ok(order_id)
    }

    /// Groups cart lines by supplier and creates one order per supplier.
    ///
    /// Each supplier's order is created in its own transaction, so one
    /// failure does not undo the others.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn create_orders_by_supplier(
        &self,
        lines: Vec<CartLine>,
        expected_delivery: Option<DateTime<Utc>>,
        created_by: Option<String>,
    ) -> Result<BatchOutcome, ServiceError> {
        for line in &lines {
            line.validate()?;
        }
        let created_by = created_by.unwrap_or_else(|| self.default_created_by.clone());

        let mut supplier_for_item: HashMap<i64, i64> = HashMap::new();
        for pair in self.catalog.item_supplier_mapping().await? {
            supplier_for_item.entry(pair.item_id).or_insert(pair.supplier_id);
        }

        let mut grouped: BTreeMap<i64, Vec<NewOrderLine>> = BTreeMap::new();
        let mut outcome = BatchOutcome::default();
        for line in lines {
            let Some(&supplier_id) = supplier_for_item.get(&line.item_id) else {
                warn!(item_id = line.item_id, "Item has no supplier mapping");
                outcome.unmapped_items.push(line.item_id);
                continue;
            };
            grouped.entry(supplier_id).or_default().push(NewOrderLine {
                item_id: line.item_id,
                quantity: line.quantity,
                estimated_price: line.estimated_price.filter(|p| *p > Decimal::ZERO),
                approval: Default::default(),
            });
        }

        for (supplier_id, items) in grouped {
            let line_count = items.len();
            let order = NewOrder {
                supplier_id,
                expected_delivery,
                items,
                created_by: created_by.clone(),
                original_id: None,
                approval: Default::default(),
            };
            let result = self.create_order(order).await;
            outcome.orders.push(match result {
                Ok(order_id) => SupplierOrderOutcome {
                    supplier_id,
                    line_count,
                    order_id: Some(order_id),
                    error: None,
                },
                Err(e) => SupplierOrderOutcome {
                    supplier_id,
                    line_count,
                    order_id: None,
                    error: Some(e.response_message()),
                },
            });
        }

        Ok(outcome)
    }

    /// Goods arrived: status `Received` and the delivery timestamp is set
    #[instrument(skip(self))]
    pub async fn mark_received(&self, order_id: i64) -> Result<(), ServiceError> {
        self.orders.mark_received(order_id).await?;
        info!(order_id, "Purchase order received");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_completed(&self, order_id: i64) -> Result<(), ServiceError> {
        self.orders
            .set_status(order_id, PurchaseOrderStatus::Completed)
            .await?;
        info!(order_id, "Purchase order completed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_received_quantity(
        &self,
        order_id: i64,
        item_id: i64,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        self.orders
            .set_received_quantity(order_id, item_id, quantity)
            .await
    }

    /// Rejects the supplier's proposal. No new row is written.
    #[instrument(skip(self))]
    pub async fn decline(&self, order_id: i64) -> Result<(), ServiceError> {
        self.orders
            .set_status(order_id, PurchaseOrderStatus::DeclinedByAmas)
            .await?;
        counter!("amas_po.declined", 1);
        info!(order_id, "Supplier proposal declined");
        Ok(())
    }

    #[instrument(skip(self, proposal))]
    pub async fn record_supplier_proposal(
        &self,
        order_id: i64,
        proposal: SupplierProposal,
    ) -> Result<(), ServiceError> {
        self.orders
            .record_supplier_proposal(order_id, &proposal)
            .await
    }

    #[instrument(skip(self, note))]
    pub async fn record_supplier_decline(
        &self,
        order_id: i64,
        note: Option<String>,
    ) -> Result<(), ServiceError> {
        self.orders.record_supplier_decline(order_id, note).await?;
        info!(order_id, "Supplier declined purchase order");
        Ok(())
    }

    /// Accepts the supplier's proposal by cloning the order with the
    /// resolved quantities and prices.
    ///
    /// Returns `Ok(None)` when the source order does not exist and
    /// `ServiceError::Conflict` when it has already been amended or closed.
    #[instrument(skip(self))]
    pub async fn accept(&self, order_id: i64) -> Result<Option<i64>, ServiceError> {
        self.amend(order_id, Amendment::Accept, |source, lines| {
            let items = lines
                .iter()
                .map(|line| {
                    let terms = resolution::resolve(line);
                    NewOrderLine {
                        item_id: line.item_id,
                        quantity: terms.quantity,
                        estimated_price: terms.pricing.amount(),
                        approval: line.approval,
                    }
                })
                .collect();
            clone_of(source, source.supplier_proposed_delivery, items, None)
        })
        .await
    }

    /// Replaces the order with caller-supplied delivery date and lines.
    /// Same outcomes as [`ProcurementService::accept`].
    #[instrument(skip(self, modification), fields(lines = modification.items.len()))]
    pub async fn modify(
        &self,
        order_id: i64,
        modification: OrderModification,
    ) -> Result<Option<i64>, ServiceError> {
        modification.validate()?;
        let OrderModification {
            expected_delivery,
            items,
            created_by,
        } = modification;
        self.amend(order_id, Amendment::Modify, move |source, _| {
            clone_of(source, expected_delivery, items, created_by)
        })
        .await
    }

    async fn amend<F>(
        &self,
        order_id: i64,
        kind: Amendment,
        build: F,
    ) -> Result<Option<i64>, ServiceError>
    where
        F: FnOnce(&PurchaseOrder, &[PurchaseOrderItem]) -> NewOrder,
    {
        self.orders.ensure_writable().await?;
        let txn = self.db_pool.begin().await?;

        let Some(source) = find_order(&txn, order_id).await? else {
            txn.rollback().await?;
            counter!("amas_po.amendments_not_found", 1, "kind" => kind.label());
            warn!(order_id, "Amendment source order not found");
            return Ok(None);
        };
        let lines = find_items(&txn, order_id).await?;

        let flipped = transition_status(
            &txn,
            order_id,
            &PurchaseOrderStatus::AMENDABLE,
            kind.target_status(),
        )
        .await?;
        if flipped == 0 {
            return Err(self.reject_amendment(txn, &source, kind).await);
        }

        let new_order = build(&source, &lines);
        new_order.validate()?;
        let new_id = insert_order(&txn, &new_order, Utc::now()).await?;
        txn.commit().await?;

        counter!("amas_po.amendments", 1, "kind" => kind.label());
        info!(
            source_id = order_id,
            new_id,
            status = %kind.target_status(),
            "Purchase order amended"
        );
        Ok(Some(new_id))
    }

    async fn reject_amendment(
        &self,
        txn: DatabaseTransaction,
        source: &PurchaseOrder,
        kind: Amendment,
    ) -> ServiceError {
        if let Err(e) = txn.rollback().await {
            return ServiceError::DatabaseError(e);
        }
        counter!("amas_po.amendments_rejected", 1, "kind" => kind.label());
        warn!(
            order_id = source.id,
            status = %source.status,
            "Order is no longer amendable"
        );
        ServiceError::Conflict(format!(
            "Purchase order {} is '{}' and can no longer be amended",
            source.id, source.status
        ))
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<Option<OrderSummary>, ServiceError> {
        self.orders.fetch_summary(order_id).await
    }

    pub async fn list_active(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        self.orders.list_active().await
    }

    pub async fn list_archived(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        self.orders.list_archived().await
    }

    /// Full amendment history around `order_id` and its current head.
    #[instrument(skip(self))]
    pub async fn lineage(&self, order_id: i64) -> Result<LineageView, ServiceError> {
        let orders = self.orders.fetch_lineage(order_id).await?;
        let versions: Vec<OrderVersion> = orders.iter().map(OrderVersion::from).collect();
        let (head, anomaly) = match current_head(&versions) {
            Ok(head) => (Some(head.id()), None),
            Err(e) => {
                warn!(order_id, error = %e, "Lineage has no single head");
                (None, Some(e.to_string()))
            }
        };
        Ok(LineageView {
            orders,
            versions,
            head,
            anomaly,
        })
    }

    /// The authoritative version of the order `order_id` belongs to.
    pub async fn current_version(&self, order_id: i64) -> Result<PurchaseOrder, ServiceError> {
        let orders = self.orders.fetch_lineage(order_id).await?;
        let versions: Vec<OrderVersion> = orders.iter().map(OrderVersion::from).collect();
        let head_id = current_head(&versions)
            .map_err(|e| ServiceError::Conflict(e.to_string()))?
            .id();
        orders
            .into_iter()
            .find(|order| order.id == head_id)
            .ok_or_else(|| ServiceError::order_not_found(head_id))
    }
}

fn clone_of(
    source: &PurchaseOrder,
    expected_delivery: Option<DateTime<Utc>>,
    items: Vec<NewOrderLine>,
    created_by: Option<String>,
) -> NewOrder {
    NewOrder {
        supplier_id: source.supplier_id,
        expected_delivery,
        items,
        created_by: created_by.unwrap_or_else(|| source.created_by.clone()),
        original_id: Some(source.id),
        approval: source.approval,
    }
}

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::{BaseRepository, Repository};
use crate::errors::ServiceError;
use crate::models::{
    item_entity, purchase_order_entity, purchase_order_item_entity, suppliers, Approval,
    NewOrder, OrderLineView, OrderSummary, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus,
    SupplierProposal,
};

use purchase_order_entity::{
    ActiveModel as OrderActiveModel, Column as OrderColumn, Entity as PurchaseOrders,
};
use purchase_order_item_entity::{
    ActiveModel as LineActiveModel, Column as LineColumn, Entity as PurchaseOrderItems,
};

/// Inserts an order header and its lines on `conn`.
///
/// Not transactional by itself; callers pass a transaction when the header
/// and lines must land together.
pub async fn insert_order<C: ConnectionTrait>(
    conn: &C,
    order: &NewOrder,
    order_date: DateTime<Utc>,
) -> Result<i64, DbErr> {
    let header = OrderActiveModel {
        id: NotSet,
        supplier_id: Set(order.supplier_id),
        order_date: Set(order_date),
        expected_delivery: Set(order.expected_delivery),
        status: Set(PurchaseOrderStatus::Pending),
        created_by: Set(order.created_by.clone()),
        original_id: Set(order.original_id),
        approval: Set(order.approval),
        ..Default::default()
    };
    let order_id = PurchaseOrders::insert(header).exec(conn).await?.last_insert_id;

    let lines: Vec<LineActiveModel> = order
        .items
        .iter()
        .map(|line| LineActiveModel {
            id: NotSet,
            order_id: Set(order_id),
            item_id: Set(line.item_id),
            ordered_quantity: Set(Some(line.quantity)),
            estimated_price: Set(line.estimated_price),
            received_quantity: Set(0),
            supplier_proposed_quantity: Set(None),
            supplier_proposed_price: Set(None),
            approval: Set(line.approval),
        })
        .collect();

    if !lines.is_empty() {
        PurchaseOrderItems::insert_many(lines).exec(conn).await?;
    }

    Ok(order_id)
}

/// Moves an order to `to` only while its status is one of `from`.
/// Returns the number of rows changed, 0 or 1.
pub async fn transition_status<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
    from: &[PurchaseOrderStatus],
    to: PurchaseOrderStatus,
) -> Result<u64, DbErr> {
    let result = PurchaseOrders::update_many()
        .set(OrderActiveModel {
            status: Set(to),
            ..Default::default()
        })
        .filter(OrderColumn::Id.eq(order_id))
        .filter(OrderColumn::Status.is_in(from.iter().copied()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn find_order<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> Result<Option<PurchaseOrder>, DbErr> {
    PurchaseOrders::find_by_id(order_id).one(conn).await
}

pub async fn find_items<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> Result<Vec<PurchaseOrderItem>, DbErr> {
    PurchaseOrderItems::find()
        .filter(LineColumn::OrderId.eq(order_id))
        .order_by_asc(LineColumn::Id)
        .all(conn)
        .await
}

/// Typed accessors over the purchase order tables.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    base: BaseRepository,
}

impl PurchaseOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_ping_before_write(mut self, enabled: bool) -> Self {
        self.base = self.base.with_ping_before_write(enabled);
        self
    }

    pub(crate) async fn ensure_writable(&self) -> Result<(), ServiceError> {
        self.base.ensure_writable().await
    }

    /// Inserts the order and all of its lines in one transaction.
    #[instrument(skip(self, order), fields(supplier_id = order.supplier_id, lines = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<i64, ServiceError> {
        order.validate()?;
        self.ensure_writable().await?;

        let txn = self.get_db().begin().await?;
        let order_id = match insert_order(&txn, order, Utc::now()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Order insert failed, rolling back");
                txn.rollback().await?;
                return Err(ServiceError::DatabaseError(e));
            }
        };
        txn.commit().await?;

        info!(order_id, "Purchase order created");
        Ok(order_id)
    }

    /// Unconditional status write.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        order_id: i64,
        status: PurchaseOrderStatus,
    ) -> Result<(), ServiceError> {
        self.update_order(
            order_id,
            OrderActiveModel {
                status: Set(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Status `Received` plus the actual-delivery timestamp, in one write.
    #[instrument(skip(self))]
    pub async fn mark_received(&self, order_id: i64) -> Result<(), ServiceError> {
        self.update_order(
            order_id,
            OrderActiveModel {
                status: Set(PurchaseOrderStatus::Received),
                actual_delivery: Set(Some(Utc::now())),
                ..Default::default()
            },
        )
        .await
    }

    /// Point update of one line's received quantity. Over-receipt is allowed.
    #[instrument(skip(self))]
    pub async fn set_received_quantity(
        &self,
        order_id: i64,
        item_id: i64,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Received quantity must be non-negative, got {}",
                quantity
            )));
        }
        self.update_line(
            order_id,
            item_id,
            LineActiveModel {
                received_quantity: Set(quantity),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_order_approval(
        &self,
        order_id: i64,
        approval: Approval,
    ) -> Result<(), ServiceError> {
        self.update_order(
            order_id,
            OrderActiveModel {
                approval: Set(approval),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_item_approval(
        &self,
        order_id: i64,
        item_id: i64,
        approval: Approval,
    ) -> Result<(), ServiceError> {
        self.update_line(
            order_id,
            item_id,
            LineActiveModel {
                approval: Set(approval),
                ..Default::default()
            },
        )
        .await
    }

    /// Writes the supplier's counter-offer and stamps `respondedat`.
    /// Every referenced line must exist or nothing is written.
    #[instrument(skip(self, proposal), fields(lines = proposal.items.len()))]
    pub async fn record_supplier_proposal(
        &self,
        order_id: i64,
        proposal: &SupplierProposal,
    ) -> Result<(), ServiceError> {
        proposal.validate()?;
        self.ensure_writable().await?;

        let txn = self.get_db().begin().await?;

        let header = PurchaseOrders::update_many()
            .set(OrderActiveModel {
                supplier_proposed_delivery: Set(proposal.proposed_delivery),
                supplier_note: Set(proposal.note.clone()),
                responded_at: Set(Some(Utc::now())),
                ..Default::default()
            })
            .filter(OrderColumn::Id.eq(order_id))
            .exec(&txn)
            .await?;
        if header.rows_affected == 0 {
            txn.rollback().await?;
            return Err(ServiceError::order_not_found(order_id));
        }

        for line in &proposal.items {
            let updated = PurchaseOrderItems::update_many()
                .set(LineActiveModel {
                    supplier_proposed_quantity: Set(line.quantity),
                    supplier_proposed_price: Set(line.price),
                    ..Default::default()
                })
                .filter(LineColumn::OrderId.eq(order_id))
                .filter(LineColumn::ItemId.eq(line.item_id))
                .exec(&txn)
                .await?;
            if updated.rows_affected == 0 {
                txn.rollback().await?;
                return Err(ServiceError::line_not_found(order_id, line.item_id));
            }
        }

        txn.commit().await?;
        info!(order_id, "Supplier proposal recorded");
        Ok(())
    }

    /// Supplier refused the order outright.
    #[instrument(skip(self, note))]
    pub async fn record_supplier_decline(
        &self,
        order_id: i64,
        note: Option<String>,
    ) -> Result<(), ServiceError> {
        let mut update = OrderActiveModel {
            status: Set(PurchaseOrderStatus::DeclinedBySupplier),
            responded_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        if let Some(note) = note {
            update.supplier_note = Set(Some(note));
        }
        self.update_order(order_id, update).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_order(&self, order_id: i64) -> Result<Option<PurchaseOrder>, ServiceError> {
        Ok(find_order(self.get_db(), order_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn fetch_items(&self, order_id: i64) -> Result<Vec<PurchaseOrderItem>, ServiceError> {
        Ok(find_items(self.get_db(), order_id).await?)
    }

    /// Single order with supplier and item names, or `None` when absent.
    #[instrument(skip(self))]
    pub async fn fetch_summary(&self, order_id: i64) -> Result<Option<OrderSummary>, ServiceError> {
        let Some(order) = self.fetch_order(order_id).await? else {
            return Ok(None);
        };
        Ok(self.summarize(vec![order]).await?.pop())
    }

    /// Orders still needing attention, newest first.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        let orders = PurchaseOrders::find()
            .filter(OrderColumn::Status.is_not_in(PurchaseOrderStatus::ARCHIVED))
            .order_by_desc(OrderColumn::OrderDate)
            .order_by_desc(OrderColumn::Id)
            .all(self.get_db())
            .await?;
        self.summarize(orders).await
    }

    /// Completed and declined orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_archived(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        let orders = PurchaseOrders::find()
            .filter(OrderColumn::Status.is_in(PurchaseOrderStatus::ARCHIVED))
            .order_by_desc(OrderColumn::OrderDate)
            .order_by_desc(OrderColumn::Id)
            .all(self.get_db())
            .await?;
        self.summarize(orders).await
    }

    /// Every order connected to `order_id` through amendment links, oldest first.
    #[instrument(skip(self))]
    pub async fn fetch_lineage(&self, order_id: i64) -> Result<Vec<PurchaseOrder>, ServiceError> {
        let db = self.get_db();
        let mut root = find_order(db, order_id)
            .await?
            .ok_or_else(|| ServiceError::order_not_found(order_id))?;

        let mut seen = HashSet::from([root.id]);
        while let Some(previous) = root.original_id {
            if !seen.insert(previous) {
                break;
            }
            match find_order(db, previous).await? {
                Some(order) => root = order,
                None => break,
            }
        }

        let mut chain = vec![root.clone()];
        let mut visited = HashSet::from([root.id]);
        let mut frontier = vec![root.id];
        while !frontier.is_empty() {
            let children = PurchaseOrders::find()
                .filter(OrderColumn::OriginalId.is_in(frontier.clone()))
                .order_by_asc(OrderColumn::Id)
                .all(db)
                .await?;
            let fresh: Vec<PurchaseOrder> = children
                .into_iter()
                .filter(|child| visited.insert(child.id))
                .collect();
            frontier = fresh.iter().map(|child| child.id).collect();
            chain.extend(fresh);
        }

        chain.sort_by_key(|order| order.id);
        Ok(chain)
    }

    async fn update_order(
        &self,
        order_id: i64,
        update: OrderActiveModel,
    ) -> Result<(), ServiceError> {
        self.ensure_writable().await?;
        let result = PurchaseOrders::update_many()
            .set(update)
            .filter(OrderColumn::Id.eq(order_id))
            .exec(self.get_db())
            .await?;
        if result.rows_affected == 0 {
            warn!(order_id, "Update matched no purchase order");
            return Err(ServiceError::order_not_found(order_id));
        }
        Ok(())
    }

    async fn update_line(
        &self,
        order_id: i64,
        item_id: i64,
        update: LineActiveModel,
    ) -> Result<(), ServiceError> {
        self.ensure_writable().await?;
        let result = PurchaseOrderItems::update_many()
            .set(update)
            .filter(LineColumn::OrderId.eq(order_id))
            .filter(LineColumn::ItemId.eq(item_id))
            .exec(self.get_db())
            .await?;
        if result.rows_affected == 0 {
            warn!(order_id, item_id, "Update matched no order line");
            return Err(ServiceError::line_not_found(order_id, item_id));
        }
        Ok(())
    }

    /// Batch-loads lines, suppliers and catalog items for `orders`,
    /// preserving the order of `orders`.
    async fn summarize(&self, orders: Vec<PurchaseOrder>) -> Result<Vec<OrderSummary>, ServiceError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let db = self.get_db();

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let supplier_ids: BTreeSet<i64> = orders.iter().map(|o| o.supplier_id).collect();

        let lines = PurchaseOrderItems::find()
            .filter(LineColumn::OrderId.is_in(order_ids))
            .order_by_asc(LineColumn::Id)
            .all(db)
            .await?;
        let item_ids: BTreeSet<i64> = lines.iter().map(|l| l.item_id).collect();

        let supplier_names: HashMap<i64, String> = suppliers::Entity::find()
            .filter(suppliers::Column::Id.is_in(supplier_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let catalog: HashMap<i64, item_entity::Model> = if item_ids.is_empty() {
            HashMap::new()
        } else {
            item_entity::Entity::find()
                .filter(item_entity::Column::Id.is_in(item_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|i| (i.id, i))
                .collect()
        };

        let mut lines_by_order: HashMap<i64, Vec<OrderLineView>> = HashMap::new();
        for line in lines {
            let item = catalog.get(&line.item_id);
            let view = OrderLineView {
                item_name: item.map(|i| i.name.clone()),
                item_picture: item.and_then(|i| i.picture.clone()),
                line,
            };
            lines_by_order
                .entry(view.line.order_id)
                .or_default()
                .push(view);
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderSummary {
                supplier_name: supplier_names.get(&order.supplier_id).cloned(),
                items: lines_by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }
}

impl Repository for PurchaseOrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

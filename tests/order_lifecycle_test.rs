mod common;

use amas_procurement::{
    errors::ServiceError,
    models::{Approval, LineProposal, NewOrderLine, PurchaseOrderStatus, SupplierProposal},
    services::procurement::OrderModification,
};
use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use common::{delivery_date, new_order, TestApp};

struct Fixture {
    app: TestApp,
    supplier_id: i64,
    flour: i64,
    sugar: i64,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Levant Mills").await;
    let flour = app.seed_item("Flour 25kg").await;
    let sugar = app.seed_item("Sugar 10kg").await;
    Fixture {
        app,
        supplier_id,
        flour,
        sugar,
    }
}

#[tokio::test]
async fn created_order_round_trips() {
    let f = fixture().await;
    let order_id = f
        .app
        .create_order(
            f.supplier_id,
            &[(f.flour, 3, Some(dec!(12.5))), (f.sugar, 4, None)],
        )
        .await;

    let procurement = &f.app.state.services.procurement;
    let summary = procurement
        .get_order(order_id)
        .await
        .unwrap()
        .expect("order exists");

    assert_eq!(summary.order.supplier_id, f.supplier_id);
    assert_eq!(summary.order.expected_delivery, Some(delivery_date()));
    assert_eq!(summary.order.status, PurchaseOrderStatus::Pending);
    assert_eq!(summary.order.approval, Approval::Pending);
    assert_eq!(summary.order.created_by, "buyer@amas.test");
    assert_eq!(summary.order.original_id, None);
    assert_eq!(summary.supplier_name.as_deref(), Some("Levant Mills"));

    assert_eq!(summary.items.len(), 2);
    let flour_line = &summary.items[0];
    assert_eq!(flour_line.line.item_id, f.flour);
    assert_eq!(flour_line.item_name.as_deref(), Some("Flour 25kg"));
    assert_eq!(flour_line.line.ordered_quantity, Some(3));
    assert_eq!(flour_line.line.estimated_price, Some(dec!(12.5)));
    assert_eq!(flour_line.line.received_quantity, 0);

    let sugar_line = &summary.items[1];
    assert_eq!(sugar_line.line.ordered_quantity, Some(4));
    assert_eq!(sugar_line.line.estimated_price, None);
}

#[tokio::test]
async fn failed_line_insert_leaves_no_rows() {
    let f = fixture().await;
    let before = f.app.order_count().await;

    // The same item twice violates the one-line-per-item index on the second row.
    let result = f
        .app
        .state
        .services
        .procurement
        .create_order(new_order(
            f.supplier_id,
            &[(f.flour, 1, None), (f.flour, 2, None)],
        ))
        .await;

    assert_matches!(result, Err(ServiceError::DatabaseError(_)));
    assert_eq!(f.app.order_count().await, before);
    assert_eq!(f.app.line_count().await, 0);
}

#[tokio::test]
async fn negative_quantity_is_rejected_before_any_write() {
    let f = fixture().await;
    let result = f
        .app
        .state
        .services
        .procurement
        .create_order(new_order(f.supplier_id, &[(f.flour, -1, None)]))
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));
    assert_eq!(f.app.order_count().await, 0);
}

#[tokio::test]
async fn mark_received_sets_status_and_delivery_time() {
    let f = fixture().await;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 3, None)]).await;

    let before = Utc::now();
    f.app
        .state
        .services
        .procurement
        .mark_received(order_id)
        .await
        .unwrap();

    let order = f.app.order(order_id).await;
    assert_eq!(order.status, PurchaseOrderStatus::Received);
    let delivered = order.actual_delivery.expect("delivery timestamp set");
    assert!(delivered >= before - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn status_updates_on_missing_order_are_not_found() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;

    assert_matches!(
        procurement.mark_received(9_999).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        procurement.decline(9_999).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        procurement.mark_completed(9_999).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn received_quantity_allows_over_receipt_and_rejects_negatives() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 3, None)]).await;

    procurement
        .set_received_quantity(order_id, f.flour, 7)
        .await
        .unwrap();
    assert_matches!(
        procurement.set_received_quantity(order_id, f.flour, -2).await,
        Err(ServiceError::InvalidInput(_))
    );
    assert_matches!(
        procurement.set_received_quantity(order_id, f.sugar, 1).await,
        Err(ServiceError::NotFound(_))
    );

    let items = procurement.get_order(order_id).await.unwrap().unwrap().items;
    assert_eq!(items[0].line.received_quantity, 7);
}

#[tokio::test]
async fn decline_changes_only_the_status() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f
        .app
        .create_order(f.supplier_id, &[(f.flour, 3, Some(dec!(12.5))), (f.sugar, 1, None)])
        .await;

    let before_order = f.app.order(order_id).await;
    let before_items = procurement.get_order(order_id).await.unwrap().unwrap().items;
    let (orders_before, lines_before) = (f.app.order_count().await, f.app.line_count().await);

    procurement.decline(order_id).await.unwrap();

    let after_order = f.app.order(order_id).await;
    assert_eq!(after_order.status, PurchaseOrderStatus::DeclinedByAmas);
    assert_eq!(
        purchase_order_without_status(&after_order),
        purchase_order_without_status(&before_order)
    );
    assert_eq!(
        procurement.get_order(order_id).await.unwrap().unwrap().items,
        before_items
    );
    assert_eq!(f.app.order_count().await, orders_before);
    assert_eq!(f.app.line_count().await, lines_before);
}

fn purchase_order_without_status(
    order: &amas_procurement::models::PurchaseOrder,
) -> amas_procurement::models::PurchaseOrder {
    let mut copy = order.clone();
    copy.status = PurchaseOrderStatus::Pending;
    copy
}

#[tokio::test]
async fn accept_clones_with_resolved_terms() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f
        .app
        .create_order(f.supplier_id, &[(f.flour, 3, Some(dec!(12.5))), (f.sugar, 4, None)])
        .await;
    f.app
        .state
        .services
        .approvals
        .set_order_approval(order_id, Approval::Approved)
        .await
        .unwrap();
    f.app
        .state
        .services
        .approvals
        .set_item_approval(order_id, f.sugar, Approval::Rejected)
        .await
        .unwrap();

    let proposed_delivery = Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap();
    procurement
        .record_supplier_proposal(
            order_id,
            SupplierProposal {
                proposed_delivery: Some(proposed_delivery),
                note: Some("Flour price dropped".into()),
                items: vec![LineProposal {
                    item_id: f.flour,
                    quantity: Some(5),
                    price: Some(dec!(9.75)),
                }],
            },
        )
        .await
        .unwrap();

    let new_id = procurement
        .accept(order_id)
        .await
        .unwrap()
        .expect("source exists");
    assert_ne!(new_id, order_id);

    let source = f.app.order(order_id).await;
    assert_eq!(source.status, PurchaseOrderStatus::AcceptedByAmas);
    assert!(source.responded_at.is_some());
    assert_eq!(source.supplier_note.as_deref(), Some("Flour price dropped"));

    let clone = procurement.get_order(new_id).await.unwrap().unwrap();
    assert_eq!(clone.order.status, PurchaseOrderStatus::Pending);
    assert_eq!(clone.order.supplier_id, f.supplier_id);
    assert_eq!(clone.order.expected_delivery, Some(proposed_delivery));
    assert_eq!(clone.order.created_by, "buyer@amas.test");
    assert_eq!(clone.order.original_id, Some(order_id));
    assert_eq!(clone.order.approval, Approval::Approved);

    assert_eq!(clone.items.len(), 2);
    assert_eq!(clone.items[0].line.ordered_quantity, Some(5));
    assert_eq!(clone.items[0].line.estimated_price, Some(dec!(9.75)));
    assert_eq!(clone.items[1].line.ordered_quantity, Some(4));
    assert_eq!(clone.items[1].line.estimated_price, None);
    assert_eq!(clone.items[1].line.approval, Approval::Rejected);
    assert_eq!(clone.items[0].line.supplier_proposed_quantity, None);
}

#[tokio::test]
async fn accept_without_proposal_keeps_no_expected_delivery() {
    let f = fixture().await;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 2, None)]).await;

    let new_id = f
        .app
        .state
        .services
        .procurement
        .accept(order_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(f.app.order(new_id).await.expected_delivery, None);
}

#[tokio::test]
async fn modify_uses_caller_terms() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f
        .app
        .create_order(f.supplier_id, &[(f.flour, 3, Some(dec!(12.5)))])
        .await;
    procurement
        .record_supplier_proposal(
            order_id,
            SupplierProposal {
                items: vec![LineProposal {
                    item_id: f.flour,
                    quantity: Some(1),
                    price: Some(dec!(20.5)),
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let new_delivery = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
    let new_id = procurement
        .modify(
            order_id,
            OrderModification {
                expected_delivery: Some(new_delivery),
                items: vec![NewOrderLine {
                    item_id: f.sugar,
                    quantity: 8,
                    estimated_price: Some(dec!(3.5)),
                    approval: Approval::Approved,
                }],
                created_by: Some("manager@amas.test".into()),
            },
        )
        .await
        .unwrap()
        .expect("source exists");

    assert_eq!(
        f.app.order(order_id).await.status,
        PurchaseOrderStatus::ModifiedByAmas
    );
    let clone = procurement.get_order(new_id).await.unwrap().unwrap();
    assert_eq!(clone.order.expected_delivery, Some(new_delivery));
    assert_eq!(clone.order.created_by, "manager@amas.test");
    assert_eq!(clone.order.original_id, Some(order_id));
    assert_eq!(clone.items.len(), 1);
    assert_eq!(clone.items[0].line.item_id, f.sugar);
    assert_eq!(clone.items[0].line.ordered_quantity, Some(8));
    assert_eq!(clone.items[0].line.estimated_price, Some(dec!(3.5)));
    assert_eq!(clone.items[0].line.approval, Approval::Approved);
}

#[tokio::test]
async fn amending_a_missing_order_returns_none() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    f.app.create_order(f.supplier_id, &[(f.flour, 1, None)]).await;
    let (orders, lines) = (f.app.order_count().await, f.app.line_count().await);

    assert_eq!(procurement.accept(9_999).await.unwrap(), None);
    let modified = procurement
        .modify(
            9_999,
            OrderModification {
                expected_delivery: None,
                items: vec![NewOrderLine {
                    item_id: f.flour,
                    quantity: 1,
                    estimated_price: None,
                    approval: Approval::Pending,
                }],
                created_by: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(modified, None);

    assert_eq!(f.app.order_count().await, orders);
    assert_eq!(f.app.line_count().await, lines);
}

#[tokio::test]
async fn second_accept_of_the_same_order_conflicts() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 1, None)]).await;

    procurement.accept(order_id).await.unwrap().unwrap();
    let orders = f.app.order_count().await;

    assert_matches!(
        procurement.accept(order_id).await,
        Err(ServiceError::Conflict(_))
    );
    assert_eq!(f.app.order_count().await, orders);
    assert_eq!(
        f.app.order(order_id).await.status,
        PurchaseOrderStatus::AcceptedByAmas
    );
}

#[tokio::test]
async fn closed_orders_cannot_be_amended_but_received_ones_can() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;

    let declined = f.app.create_order(f.supplier_id, &[(f.flour, 1, None)]).await;
    procurement.decline(declined).await.unwrap();
    assert_matches!(
        procurement.accept(declined).await,
        Err(ServiceError::Conflict(_))
    );
    assert_eq!(
        f.app.order(declined).await.status,
        PurchaseOrderStatus::DeclinedByAmas
    );

    let received = f.app.create_order(f.supplier_id, &[(f.flour, 1, None)]).await;
    procurement.mark_received(received).await.unwrap();
    assert!(procurement.accept(received).await.unwrap().is_some());
}

#[tokio::test]
async fn lineage_tracks_successive_amendments() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let first = f.app.create_order(f.supplier_id, &[(f.flour, 1, None)]).await;
    let second = procurement.accept(first).await.unwrap().unwrap();
    let third = procurement
        .modify(
            second,
            OrderModification {
                expected_delivery: None,
                items: vec![NewOrderLine {
                    item_id: f.flour,
                    quantity: 2,
                    estimated_price: None,
                    approval: Approval::Pending,
                }],
                created_by: None,
            },
        )
        .await
        .unwrap()
        .unwrap();

    let lineage = procurement.lineage(second).await.unwrap();
    let ids: Vec<i64> = lineage.orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![first, second, third]);
    assert_eq!(lineage.head, Some(third));
    assert_eq!(lineage.anomaly, None);

    assert_eq!(procurement.current_version(first).await.unwrap().id, third);
    assert_matches!(
        procurement.lineage(9_999).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn supplier_proposal_for_unknown_line_writes_nothing() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 3, None)]).await;

    let result = procurement
        .record_supplier_proposal(
            order_id,
            SupplierProposal {
                proposed_delivery: Some(delivery_date()),
                note: None,
                items: vec![
                    LineProposal {
                        item_id: f.flour,
                        quantity: Some(2),
                        price: None,
                    },
                    LineProposal {
                        item_id: f.sugar,
                        quantity: Some(2),
                        price: None,
                    },
                ],
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));

    let order = f.app.order(order_id).await;
    assert_eq!(order.responded_at, None);
    assert_eq!(order.supplier_proposed_delivery, None);
    let items = procurement.get_order(order_id).await.unwrap().unwrap().items;
    assert_eq!(items[0].line.supplier_proposed_quantity, None);
}

#[tokio::test]
async fn supplier_decline_archives_the_order() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 3, None)]).await;

    procurement
        .record_supplier_decline(order_id, Some("Out of stock".into()))
        .await
        .unwrap();

    let order = f.app.order(order_id).await;
    assert_eq!(order.status, PurchaseOrderStatus::DeclinedBySupplier);
    assert!(order.responded_at.is_some());
    assert_eq!(order.supplier_note.as_deref(), Some("Out of stock"));

    let archived = procurement.list_archived().await.unwrap();
    assert!(archived.iter().any(|s| s.order.id == order_id));
}

#[tokio::test]
async fn accept_treats_a_zero_ordered_quantity_as_unset() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f
        .app
        .create_order(f.supplier_id, &[(f.flour, 0, None), (f.sugar, 6, None)])
        .await;
    procurement
        .record_supplier_proposal(
            order_id,
            SupplierProposal {
                items: vec![LineProposal {
                    item_id: f.sugar,
                    quantity: Some(0),
                    price: None,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let new_id = procurement.accept(order_id).await.unwrap().unwrap();

    let items = procurement.get_order(new_id).await.unwrap().unwrap().items;
    assert_eq!(items[0].line.ordered_quantity, Some(1));
    // A supplier explicitly proposing zero is honoured.
    assert_eq!(items[1].line.ordered_quantity, Some(0));
}

#[tokio::test]
async fn failed_clone_insert_rolls_back_the_status_flip() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;
    let order_id = f.app.create_order(f.supplier_id, &[(f.flour, 3, None)]).await;
    let (orders, lines) = (f.app.order_count().await, f.app.line_count().await);

    let duplicate_line = || NewOrderLine {
        item_id: f.sugar,
        quantity: 2,
        estimated_price: None,
        approval: Approval::Pending,
    };
    let result = procurement
        .modify(
            order_id,
            OrderModification {
                expected_delivery: None,
                items: vec![duplicate_line(), duplicate_line()],
                created_by: None,
            },
        )
        .await;

    assert_matches!(result, Err(ServiceError::DatabaseError(_)));
    assert_eq!(f.app.order_count().await, orders);
    assert_eq!(f.app.line_count().await, lines);
    assert_eq!(
        f.app.order(order_id).await.status,
        PurchaseOrderStatus::Pending
    );
    // Still amendable after the failed attempt.
    assert!(procurement.accept(order_id).await.unwrap().is_some());
}

#[tokio::test]
async fn orders_for_unknown_suppliers_are_not_found() {
    let f = fixture().await;
    let result = f
        .app
        .state
        .services
        .procurement
        .create_order(new_order(9_999, &[(f.flour, 1, None)]))
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
    assert_eq!(f.app.order_count().await, 0);
}

#[tokio::test]
async fn prices_outside_the_stored_precision_are_rejected() {
    let f = fixture().await;
    let procurement = &f.app.state.services.procurement;

    for price in [dec!(12345678901234.5678), dec!(-3.5), dec!(2.123456)] {
        assert_matches!(
            procurement
                .create_order(new_order(f.supplier_id, &[(f.flour, 1, Some(price))]))
                .await,
            Err(ServiceError::ValidationError(_)),
            "{price}"
        );
    }
    assert_eq!(f.app.order_count().await, 0);

    let order_id = f
        .app
        .create_order(f.supplier_id, &[(f.flour, 1, Some(dec!(1234567.8125)))])
        .await;
    let items = procurement.get_order(order_id).await.unwrap().unwrap().items;
    assert_eq!(items[0].line.estimated_price, Some(dec!(1234567.8125)));
}

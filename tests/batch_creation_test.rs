mod common;

use amas_procurement::models::CartLine;
use rust_decimal_macros::dec;

use common::{delivery_date, TestApp};

fn cart_line(item_id: i64, quantity: i32, estimated_price: Option<rust_decimal::Decimal>) -> CartLine {
    CartLine {
        item_id,
        quantity,
        estimated_price,
    }
}

#[tokio::test]
async fn cart_is_split_into_one_order_per_supplier() {
    let app = TestApp::new().await;
    let mills = app.seed_supplier("Levant Mills").await;
    let dairy = app.seed_supplier("Byblos Dairy").await;
    let flour = app.seed_item("Flour 25kg").await;
    let milk = app.seed_item("Milk 1L").await;
    let butter = app.seed_item("Butter 5kg").await;
    let saffron = app.seed_item("Saffron 10g").await;
    app.map_item(flour, mills).await;
    app.map_item(milk, dairy).await;
    app.map_item(butter, dairy).await;

    let outcome = app
        .state
        .services
        .procurement
        .create_orders_by_supplier(
            vec![
                cart_line(flour, 10, Some(dec!(12.5))),
                cart_line(milk, 24, Some(dec!(0))),
                cart_line(butter, 2, None),
                cart_line(saffron, 1, Some(dec!(40.5))),
            ],
            Some(delivery_date()),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.unmapped_items, vec![saffron]);
    assert_eq!(outcome.orders.len(), 2);
    assert!(outcome.orders.iter().all(|o| o.error.is_none()));

    let dairy_outcome = outcome
        .orders
        .iter()
        .find(|o| o.supplier_id == dairy)
        .expect("dairy order");
    assert_eq!(dairy_outcome.line_count, 2);

    let dairy_order = app
        .state
        .services
        .procurement
        .get_order(dairy_outcome.order_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dairy_order.order.expected_delivery, Some(delivery_date()));
    assert_eq!(
        dairy_order.order.created_by,
        app.state.services.procurement.default_created_by()
    );
    // A zero price is treated as unknown.
    assert_eq!(dairy_order.items[0].line.estimated_price, None);
    assert_eq!(app.order_count().await, 2);
}

#[tokio::test]
async fn first_mapping_wins_for_items_with_several_suppliers() {
    let app = TestApp::new().await;
    let first = app.seed_supplier("Levant Mills").await;
    let second = app.seed_supplier("Tyre Grains").await;
    let flour = app.seed_item("Flour 25kg").await;
    app.map_item(flour, second).await;
    app.map_item(flour, first).await;

    let outcome = app
        .state
        .services
        .procurement
        .create_orders_by_supplier(vec![cart_line(flour, 1, None)], None, Some("ops".into()))
        .await
        .unwrap();

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].supplier_id, first);
}

#[tokio::test]
async fn latest_price_skips_unpriced_and_zero_lines() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Levant Mills").await;
    let flour = app.seed_item("Flour 25kg").await;
    let sugar = app.seed_item("Sugar 10kg").await;
    let catalog = &app.state.services.catalog;

    assert_eq!(catalog.latest_estimated_price(flour).await.unwrap(), None);

    app.create_order(supplier, &[(flour, 1, Some(dec!(12.5)))]).await;
    app.create_order(supplier, &[(flour, 1, Some(dec!(13.75)))]).await;
    app.create_order(supplier, &[(flour, 1, None)]).await;
    app.create_order(supplier, &[(flour, 1, Some(dec!(0)))]).await;
    app.create_order(supplier, &[(sugar, 1, Some(dec!(2.5)))]).await;

    assert_eq!(
        catalog.latest_estimated_price(flour).await.unwrap(),
        Some(dec!(13.75))
    );
}

#[tokio::test]
async fn catalog_lists_are_sorted() {
    let app = TestApp::new().await;
    app.seed_supplier("Tyre Grains").await;
    app.seed_supplier("Byblos Dairy").await;

    let names: Vec<String> = app
        .state
        .services
        .catalog
        .list_suppliers()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Byblos Dairy", "Tyre Grains"]);
}

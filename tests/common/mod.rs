#![allow(dead_code)]

use std::sync::Arc;

use amas_procurement::{
    config::AppConfig,
    db::{self, DbConfig},
    models::{
        item_entity, item_supplier_entity, purchase_order_entity, purchase_order_item_entity,
        suppliers, NewOrder, NewOrderLine,
    },
    AppState,
};
use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let state = AppState::new(Arc::new(pool), cfg);
        let router = amas_procurement::app_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        &self.state.db
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_supplier(&self, name: &str) -> i64 {
        suppliers::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed supplier")
        .id
    }

    pub async fn seed_item(&self, name: &str) -> i64 {
        item_entity::ActiveModel {
            name: Set(name.to_string()),
            average_required: Set(Some(10)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed item")
        .id
    }

    pub async fn map_item(&self, item_id: i64, supplier_id: i64) {
        item_supplier_entity::ActiveModel {
            item_id: Set(item_id),
            supplier_id: Set(supplier_id),
        }
        .insert(self.db())
        .await
        .expect("seed item/supplier mapping");
    }

    /// Creates a pending order through the service layer.
    pub async fn create_order(
        &self,
        supplier_id: i64,
        lines: &[(i64, i32, Option<Decimal>)],
    ) -> i64 {
        self.state
            .services
            .procurement
            .create_order(new_order(supplier_id, lines))
            .await
            .expect("create order")
    }

    pub async fn order_count(&self) -> u64 {
        purchase_order_entity::Entity::find()
            .count(self.db())
            .await
            .expect("count orders")
    }

    pub async fn line_count(&self) -> u64 {
        purchase_order_item_entity::Entity::find()
            .count(self.db())
            .await
            .expect("count order lines")
    }

    pub async fn order(&self, order_id: i64) -> purchase_order_entity::Model {
        purchase_order_entity::Entity::find_by_id(order_id)
            .one(self.db())
            .await
            .expect("load order")
            .expect("order exists")
    }
}

pub fn new_order(supplier_id: i64, lines: &[(i64, i32, Option<Decimal>)]) -> NewOrder {
    NewOrder {
        supplier_id,
        expected_delivery: Some(delivery_date()),
        items: lines
            .iter()
            .map(|&(item_id, quantity, estimated_price)| NewOrderLine {
                item_id,
                quantity,
                estimated_price,
                approval: Default::default(),
            })
            .collect(),
        created_by: "buyer@amas.test".to_string(),
        original_id: None,
        approval: Default::default(),
    }
}

/// Whole-second timestamp so it survives a round trip through SQLite text.
pub fn delivery_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

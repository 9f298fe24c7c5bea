use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::{Approval, CartLine, NewOrder, NewOrderLine, SupplierProposal},
    services::{parse_approval, procurement::OrderModification},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseOrderRequest {
    pub supplier_id: i64,
    #[serde(default)]
    pub expected_delivery: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub items: Vec<PurchaseOrderLineRequest>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub created_by: Option<String>,
    #[serde(default)]
    pub approval: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PurchaseOrderLineRequest {
    pub item_id: i64,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[serde(default)]
    pub estimated_price: Option<Decimal>,
    #[serde(default)]
    pub approval: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BatchCreateRequest {
    #[serde(default)]
    pub expected_delivery: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ReceivedQuantityRequest {
    #[validate(range(min = 0))]
    pub quantity: i32,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct SupplierDeclineRequest {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub approval: String,
}

fn parse_optional_approval(value: Option<&str>) -> Result<Approval, ApiError> {
    value
        .map(parse_approval)
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(map_service_error)
}

// Handler functions

/// Create a new purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let approval = parse_optional_approval(payload.approval.as_deref())?;
    let items = payload
        .items
        .into_iter()
        .map(|line| {
            Ok(NewOrderLine {
                item_id: line.item_id,
                quantity: line.quantity,
                estimated_price: line.estimated_price,
                approval: parse_optional_approval(line.approval.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let procurement = &state.services.procurement;
    let order = NewOrder {
        supplier_id: payload.supplier_id,
        expected_delivery: payload.expected_delivery,
        items,
        created_by: payload
            .created_by
            .unwrap_or_else(|| procurement.default_created_by().to_string()),
        original_id: None,
        approval,
    };

    let po_id = procurement
        .create_order(order)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", po_id);

    Ok(created_response(json!({ "id": po_id })))
}

/// Split a mixed cart into one order per supplier
pub async fn create_purchase_orders_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let outcome = state
        .services
        .procurement
        .create_orders_by_supplier(payload.lines, payload.expected_delivery, payload.created_by)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(outcome))
}

pub async fn list_active_purchase_orders(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .procurement
        .list_active()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

pub async fn list_archived_purchase_orders(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .procurement
        .list_archived()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

/// Get a purchase order with its lines
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .get_order(po_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase order {} not found", po_id)))?;

    Ok(success_response(po))
}

pub async fn get_purchase_order_lineage(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let lineage = state
        .services
        .procurement
        .lineage(po_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(lineage))
}

/// Mark a purchase order as received
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .procurement
        .mark_received(po_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "id": po_id, "status": "Received" })))
}

pub async fn complete_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .procurement
        .mark_completed(po_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "id": po_id, "status": "Completed" })))
}

pub async fn set_received_quantity(
    State(state): State<AppState>,
    Path((po_id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<ReceivedQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .procurement
        .set_received_quantity(po_id, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "id": po_id,
        "item_id": item_id,
        "received_quantity": payload.quantity
    })))
}

pub async fn record_supplier_proposal(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
    Json(payload): Json<SupplierProposal>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .procurement
        .record_supplier_proposal(po_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "id": po_id })))
}

pub async fn record_supplier_decline(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
    payload: Option<Json<SupplierDeclineRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&payload)?;

    state
        .services
        .procurement
        .record_supplier_decline(po_id, payload.note)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        json!({ "id": po_id, "status": "Declined by Supplier" }),
    ))
}

/// Accept the supplier's proposal. Responds with the id of the new order.
pub async fn accept_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let new_id = state
        .services
        .procurement
        .accept(po_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase order {} not found", po_id)))?;

    info!("Purchase order {} accepted as {}", po_id, new_id);

    Ok(created_response(json!({ "id": new_id, "original_id": po_id })))
}

pub async fn modify_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
    Json(payload): Json<OrderModification>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let new_id = state
        .services
        .procurement
        .modify(po_id, payload)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase order {} not found", po_id)))?;

    info!("Purchase order {} modified as {}", po_id, new_id);

    Ok(created_response(json!({ "id": new_id, "original_id": po_id })))
}

/// Decline the supplier's proposal
pub async fn decline_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .procurement
        .decline(po_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        json!({ "id": po_id, "status": "Declined by AMAS" }),
    ))
}

pub async fn set_order_approval(
    State(state): State<AppState>,
    Path(po_id): Path<i64>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let approval = parse_approval(&payload.approval).map_err(map_service_error)?;

    state
        .services
        .approvals
        .set_order_approval(po_id, approval)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "id": po_id, "approval": approval })))
}

pub async fn set_item_approval(
    State(state): State<AppState>,
    Path((po_id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let approval = parse_approval(&payload.approval).map_err(map_service_error)?;

    state
        .services
        .approvals
        .set_item_approval(po_id, item_id, approval)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "id": po_id,
        "item_id": item_id,
        "approval": approval
    })))
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_active_purchase_orders).post(create_purchase_order),
        )
        .route("/archived", get(list_archived_purchase_orders))
        .route("/batch", post(create_purchase_orders_batch))
        .route("/:id", get(get_purchase_order))
        .route("/:id/lineage", get(get_purchase_order_lineage))
        .route("/:id/receive", post(receive_purchase_order))
        .route("/:id/complete", post(complete_purchase_order))
        .route("/:id/items/:item_id/received", put(set_received_quantity))
        .route("/:id/supplier-proposal", post(record_supplier_proposal))
        .route("/:id/supplier-decline", post(record_supplier_decline))
        .route("/:id/accept", post(accept_purchase_order))
        .route("/:id/modify", post(modify_purchase_order))
        .route("/:id/decline", post(decline_purchase_order))
        .route("/:id/approval", put(set_order_approval))
        .route("/:id/items/:item_id/approval", put(set_item_approval))
}

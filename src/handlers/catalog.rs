use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

pub async fn list_suppliers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .services
        .catalog
        .list_suppliers()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(suppliers))
}

pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_items()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

/// Price to prefill a manual order line with. `null` when the item has
/// never been ordered at a positive price.
pub async fn latest_price(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let price = state
        .services
        .catalog
        .latest_estimated_price(item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({
        "item_id": item_id,
        "estimated_price": price
    })))
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers))
        .route("/items", get(list_items))
        .route("/items/:item_id/latest-price", get(latest_price))
}

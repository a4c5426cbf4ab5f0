//! Order lookup route handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use order_relay_core::{Order, OrderUid};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::lookup::lookup_order;
use crate::state::AppState;

/// Lookup query parameters.
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    /// Missing, empty and whitespace-only are rejected.
    #[serde(default, rename = "orderUID")]
    pub order_uid: String,
}

/// Lookup response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Option<Arc<Order>>,
}

/// `GET /order/?orderUID=<id>`
///
/// Cache first, then a bounded round trip to the resolver. An empty or
/// whitespace-only UID is a 400 and generates no bus traffic; any other value
/// is used as the key verbatim. A timeout or malformed reply is a 500.
#[instrument(skip(state, query), fields(order_uid = %query.order_uid))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderResponse>> {
    let uid = OrderUid::parse(&query.order_uid).map_err(|e| {
        warn!("Empty order UID");
        AppError::BadRequest(e.to_string())
    })?;

    let order = lookup_order(&state, &uid).await?;

    Ok(Json(OrderResponse {
        success: true,
        order: Some(order),
    }))
}

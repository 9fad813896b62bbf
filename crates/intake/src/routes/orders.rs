//! Order creation endpoint.

use axum::{Json, body::Bytes, extract::State};
use egpc_core::{CheckoutRequest, DraftOrderId, OrderId};
use serde::Serialize;
use serde_json::Value;

use crate::error::{IntakeError, Result};
use crate::services::OrderCreated;
use crate::state::AppState;

/// Success body sent to the storefront form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<u64>,
    pub draft_order_id: DraftOrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<OrderCreated> for OrderCreatedResponse {
    fn from(created: OrderCreated) -> Self {
        Self {
            success: true,
            order_id: created.order_id,
            order_number: created.order_number,
            draft_order_id: created.draft_order_id,
            message: created.message,
        }
    }
}

/// Create a cash-on-delivery order.
///
/// POST /api/create-order
///
/// The body is read raw rather than through `Json` so that forms posting a
/// JSON document as a JSON string (or without a content type) still work.
///
/// # Errors
///
/// Returns `IntakeError` if the body is invalid or Shopify rejects the order.
pub async fn create_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OrderCreatedResponse>> {
    let request = parse_checkout(&body)?;
    let created = state.intake().create_order(&request).await?;
    Ok(Json(created.into()))
}

/// Parse a checkout body, unwrapping one level of string encoding.
fn parse_checkout(body: &[u8]) -> Result<CheckoutRequest> {
    let invalid = |e: serde_json::Error| IntakeError::InvalidJson(e.to_string());

    let value = match serde_json::from_slice::<Value>(body).map_err(invalid)? {
        Value::String(inner) => serde_json::from_str::<Value>(&inner).map_err(invalid)?,
        other => other,
    };

    serde_json::from_value(value).map_err(invalid)
}

//! Admin REST request and response shapes.
//!
//! Only the fields the intake reads are modeled; Shopify sends many more
//! and serde ignores them.

use egpc_core::{AppliedDiscount, DraftOrderId, OrderId, ResolvedVariant, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `{"draft_order": ...}` request wrapper.
#[derive(Debug, Serialize)]
pub struct DraftOrderEnvelope<'a, T: Serialize> {
    pub draft_order: &'a T,
}

/// Partial draft order update carrying only a discount.
#[derive(Debug, Serialize)]
pub struct DiscountUpdate<'a> {
    pub applied_discount: &'a AppliedDiscount,
}

/// Product variant.
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub price: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub sku: Option<String>,
}

impl From<Variant> for ResolvedVariant {
    fn from(variant: Variant) -> Self {
        Self {
            id: variant.id,
            price: variant.price,
            title: variant.title,
        }
    }
}

/// Draft order as returned by create, update, get, and complete.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftOrder {
    pub id: DraftOrderId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Set once the draft order has been completed.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub subtotal_price: Option<Decimal>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// The order a draft order turned into.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Outcome of completing a draft order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub order_id: OrderId,
    pub order_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VariantResponse {
    #[serde(default)]
    pub variant: Option<Variant>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DraftOrderResponse {
    pub draft_order: DraftOrder,
}

/// The complete endpoint answers with the draft order; some API proxies
/// answer with the created order instead.
#[derive(Debug, Deserialize)]
pub(super) struct CompletionResponse {
    #[serde(default)]
    pub order: Option<OrderSummary>,
    #[serde(default)]
    pub draft_order: Option<DraftOrder>,
}

impl CompletionResponse {
    pub(super) fn into_result(self) -> Option<CompletionResult> {
        if let Some(order) = self.order {
            return Some(CompletionResult {
                order_id: order.id,
                order_number: order.order_number,
            });
        }
        self.draft_order
            .and_then(|draft| draft.order_id)
            .map(|order_id| CompletionResult {
                order_id,
                order_number: None,
            })
    }
}

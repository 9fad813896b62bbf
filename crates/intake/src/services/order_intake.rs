//! Checkout to COD order pipeline.
//!
//! One call to [`OrderIntake::create_order`] makes at most five Shopify
//! calls, strictly in sequence:
//!
//! ```text
//! validate ─► [legacy] GET variant ─► POST draft order ─► [total_price] PUT discount
//!          ─► PUT complete (payment_pending) ─► [unreadable body] GET draft order
//! ```
//!
//! Nothing is retried. A failure after the draft order was created leaves
//! that draft order open in Shopify.

use egpc_core::{
    AppliedDiscount, CheckoutItems, CheckoutRequest, DraftOrderId, DraftOrderPayload, OrderId,
    ResolvedVariant, ValidatedCheckout, ValidationRules, fixed_discount,
};
use rust_decimal::Decimal;
use tracing::{Span, instrument};

use crate::config::ShopifyAdminConfig;
use crate::error::{IntakeError, Result};
use crate::shopify::{AdminRestClient, DraftOrder, ShopifyError};

/// Message returned when Shopify completed the order but its reply could not be read.
pub const COMPLETION_UNCONFIRMED_MESSAGE: &str =
    "Order created, but Shopify's completion response could not be read.";

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    /// `None` only when the completion reply was unreadable and the
    /// follow-up fetch failed too.
    pub order_id: Option<OrderId>,
    pub order_number: Option<u64>,
    pub draft_order_id: DraftOrderId,
    /// Set when the order was created but could not be confirmed.
    pub message: Option<String>,
}

/// Order intake service.
#[derive(Clone)]
pub struct OrderIntake {
    client: AdminRestClient,
    shopify: ShopifyAdminConfig,
    rules: ValidationRules,
}

impl OrderIntake {
    /// Create a new order intake service.
    #[must_use]
    pub const fn new(
        client: AdminRestClient,
        shopify: ShopifyAdminConfig,
        rules: ValidationRules,
    ) -> Self {
        Self {
            client,
            shopify,
            rules,
        }
    }

    /// Turn a checkout submission into a completed, payment-pending order.
    ///
    /// # Errors
    ///
    /// - `IntakeError::Checkout` if the request is missing required fields
    /// - `IntakeError::BadRequest` if `shop` names a different store
    /// - `IntakeError::NotFound` if a legacy submission's variant does not exist
    /// - `IntakeError::Shopify` if any Shopify call fails
    #[instrument(
        skip(self, request),
        fields(cart = tracing::field::Empty, draft_order_id = tracing::field::Empty)
    )]
    pub async fn create_order(&self, request: &CheckoutRequest) -> Result<OrderCreated> {
        let checkout = request.validate(self.rules)?;
        Span::current().record("cart", checkout.items.is_cart());
        self.check_shop(&checkout)?;

        let variant = self.resolve_variant(&checkout).await?;
        let payload = DraftOrderPayload::from_checkout(&checkout, variant.as_ref());

        let draft = self.client.create_draft_order(&payload).await?;
        Span::current().record("draft_order_id", draft.id.as_u64());

        if let Some(total_price) = checkout.total_price {
            self.adjust_total(&draft, total_price).await?;
        }

        match self.client.complete_draft_order(draft.id).await {
            Ok(completed) => {
                tracing::info!(
                    order_id = %completed.order_id,
                    order_number = completed.order_number,
                    "COD order created"
                );
                Ok(OrderCreated {
                    order_id: Some(completed.order_id),
                    order_number: completed.order_number,
                    draft_order_id: draft.id,
                    message: None,
                })
            }
            Err(e) if e.is_unconfirmed_completion() => {
                Ok(self.recover_completed_order(draft.id, &e).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn check_shop(&self, checkout: &ValidatedCheckout) -> Result<()> {
        match checkout.shop.as_deref() {
            Some(shop) if !self.shopify.is_own_shop(shop) => {
                tracing::warn!(shop, configured = %self.shopify.shop_domain, "Checkout for another shop");
                Err(IntakeError::BadRequest(format!("Unknown shop: {shop}")))
            }
            _ => Ok(()),
        }
    }

    /// Legacy submissions price their single line from the variant.
    async fn resolve_variant(&self, checkout: &ValidatedCheckout) -> Result<Option<ResolvedVariant>> {
        let CheckoutItems::Variant { variant_id, .. } = &checkout.items else {
            return Ok(None);
        };

        self.client
            .get_variant(*variant_id)
            .await?
            .map(Some)
            .ok_or_else(|| IntakeError::NotFound(format!("variant {variant_id}")))
    }

    /// Discount the draft order down to the total the customer was shown.
    async fn adjust_total(&self, draft: &DraftOrder, total_price: Decimal) -> Result<()> {
        let Some(subtotal) = draft.subtotal_price else {
            tracing::warn!(draft_order_id = %draft.id, "Draft order has no subtotal, skipping discount");
            return Ok(());
        };

        let Some(amount) = fixed_discount(subtotal, total_price) else {
            tracing::debug!(%subtotal, %total_price, "No discount needed");
            return Ok(());
        };

        let discount = AppliedDiscount::fixed(amount);
        self.client.apply_discount(draft.id, &discount).await?;
        tracing::info!(%subtotal, %total_price, amount = %discount.amount, "Discount applied");
        Ok(())
    }

    /// Completion went through but its reply did not identify the order.
    ///
    /// Shopify has already turned the draft into an order, so the request
    /// succeeds whether or not the order ID can be recovered.
    async fn recover_completed_order(&self, id: DraftOrderId, cause: &ShopifyError) -> OrderCreated {
        tracing::warn!(draft_order_id = %id, error = %cause, "Completion response unreadable, re-fetching draft order");

        let order_id = match self.client.get_draft_order(id).await {
            Ok(draft) => draft.order_id,
            Err(e) => {
                tracing::warn!(draft_order_id = %id, error = %e, "Could not re-fetch completed draft order");
                None
            }
        };

        OrderCreated {
            order_id,
            order_number: None,
            draft_order_id: id,
            message: Some(COMPLETION_UNCONFIRMED_MESSAGE.to_string()),
        }
    }
}

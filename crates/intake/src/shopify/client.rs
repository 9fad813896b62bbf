//! Admin REST client.

use std::sync::Arc;

use egpc_core::{AppliedDiscount, DraftOrderId, DraftOrderPayload, ResolvedVariant, VariantId};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::ShopifyAdminConfig;

use super::ShopifyError;
use super::types::{
    CompletionResponse, CompletionResult, DiscountUpdate, DraftOrder, DraftOrderEnvelope,
    DraftOrderResponse, VariantResponse,
};

/// Seconds to report when Shopify rate limits without a `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Shopify sends `Retry-After` as fractional seconds (e.g. `2.0`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_retry_after(value: &str) -> Option<u64> {
    let secs = value.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| secs.ceil() as u64)
}

/// Shopify Admin REST API client.
///
/// Built once at startup and shared by every request. Cloning is cheap.
///
/// # Security
///
/// This client carries the Admin API access token, which has HIGH PRIVILEGE
/// access to the store. The token is sent as `X-Shopify-Access-Token` and
/// marked sensitive so it never shows up in debug output.
#[derive(Clone)]
pub struct AdminRestClient {
    inner: Arc<AdminRestClientInner>,
}

struct AdminRestClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AdminRestClient {
    /// Create a new Admin REST client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Unauthorized` if the access token is not a
    /// valid header value, or `ShopifyError::Http` if the HTTP client fails
    /// to build.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|_| ShopifyError::Unauthorized("malformed access token".to_string()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-Shopify-Access-Token", token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("egpc-intake/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminRestClientInner {
                client,
                base_url: config.admin_base_url(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    // =========================================================================
    // Request Execution
    // =========================================================================

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<String, ShopifyError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            tracing::warn!(resource, retry_after, "Shopify rate limit hit");
            return Err(ShopifyError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::error!(resource, status = status.as_u16(), body = %body, "Shopify rejected access token");
            return Err(ShopifyError::Unauthorized(format!(
                "{} on {resource}",
                status.as_u16()
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(resource, status = status.as_u16(), body = %body, "Shopify API error");
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ShopifyError> {
        let body = self.send(request, resource).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Get a product variant by ID.
    ///
    /// Returns `Ok(None)` if Shopify does not know the variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(variant_id = %id))]
    pub async fn get_variant(&self, id: VariantId) -> Result<Option<ResolvedVariant>, ShopifyError> {
        let request = self.inner.client.get(self.url(&format!("variants/{id}.json")));

        match self
            .send_json::<VariantResponse>(request, &format!("variant {id}"))
            .await
        {
            Ok(response) => Ok(response.variant.map(ResolvedVariant::from)),
            Err(ShopifyError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Draft Orders
    // =========================================================================

    /// Create a draft order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or Shopify rejects the payload.
    #[instrument(skip(self, payload), fields(line_items = payload.line_items.len(), tags = %payload.tags))]
    pub async fn create_draft_order(
        &self,
        payload: &DraftOrderPayload,
    ) -> Result<DraftOrder, ShopifyError> {
        let request = self
            .inner
            .client
            .post(self.url("draft_orders.json"))
            .json(&DraftOrderEnvelope {
                draft_order: payload,
            });

        let response: DraftOrderResponse = self.send_json(request, "draft orders").await?;
        tracing::info!(draft_order_id = %response.draft_order.id, "Draft order created");
        Ok(response.draft_order)
    }

    /// Apply a fixed-amount discount to an open draft order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or Shopify rejects the update.
    #[instrument(skip(self, discount), fields(draft_order_id = %id, amount = %discount.amount))]
    pub async fn apply_discount(
        &self,
        id: DraftOrderId,
        discount: &AppliedDiscount,
    ) -> Result<DraftOrder, ShopifyError> {
        let request = self
            .inner
            .client
            .put(self.url(&format!("draft_orders/{id}.json")))
            .json(&DraftOrderEnvelope {
                draft_order: &DiscountUpdate {
                    applied_discount: discount,
                },
            });

        let response: DraftOrderResponse = self
            .send_json(request, &format!("draft order {id}"))
            .await?;
        Ok(response.draft_order)
    }

    /// Get a draft order by ID.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the draft order does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(draft_order_id = %id))]
    pub async fn get_draft_order(&self, id: DraftOrderId) -> Result<DraftOrder, ShopifyError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("draft_orders/{id}.json")));

        let response: DraftOrderResponse = self
            .send_json(request, &format!("draft order {id}"))
            .await?;
        Ok(response.draft_order)
    }

    /// Complete a draft order with payment pending (cash on delivery).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Parse` if Shopify answered 2xx with a body that
    /// is not JSON, or `ShopifyError::MissingOrderId` if the JSON does not
    /// name the resulting order. Callers may treat both as a completed order
    /// (see [`ShopifyError::is_unconfirmed_completion`]); every other error
    /// is a failure.
    #[instrument(skip(self), fields(draft_order_id = %id))]
    pub async fn complete_draft_order(
        &self,
        id: DraftOrderId,
    ) -> Result<CompletionResult, ShopifyError> {
        let request = self.inner.client.put(self.url(&format!(
            "draft_orders/{id}/complete.json?payment_pending=true"
        )));

        let response: CompletionResponse = self
            .send_json(request, &format!("draft order {id}"))
            .await?;

        let result = response
            .into_result()
            .ok_or(ShopifyError::MissingOrderId(id))?;
        tracing::info!(order_id = %result.order_id, "Draft order completed");
        Ok(result)
    }
}

//! Shopify Admin REST API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Admin API access token.** The intake only needs
//! five endpoints and never exposes the token to the browser:
//!
//! ```text
//! GET  variants/{id}.json                               - Resolve a legacy variant
//! POST draft_orders.json                                - Create the draft order
//! PUT  draft_orders/{id}.json                           - Apply a fixed discount
//! GET  draft_orders/{id}.json                           - Recover the order ID
//! PUT  draft_orders/{id}/complete.json?payment_pending=true - Complete as COD
//! ```
//!
//! # Architecture
//!
//! - Plain `reqwest` + `serde` against the REST endpoints (no GraphQL codegen)
//! - One client per process, built from [`crate::config::ShopifyAdminConfig`]
//! - No retries: a failed call fails the request

mod client;
pub mod types;

pub use client::AdminRestClient;
pub use types::*;

use egpc_core::DraftOrderId;
use thiserror::Error;

/// Errors that can occur when calling the Shopify Admin REST API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A 2xx response whose body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Shopify rejected the call.
    #[error("Shopify API error {status}: {}", truncate_body(.body))]
    Api { status: u16, body: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Access token rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Completion answered 2xx JSON that names no resulting order.
    #[error("Completion of draft order {0} returned no order id")]
    MissingOrderId(DraftOrderId),
}

impl ShopifyError {
    /// Response body from Shopify, when the failure carried one.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether a completion call succeeded upstream but its reply did not
    /// say which order was created.
    #[must_use]
    pub const fn is_unconfirmed_completion(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::MissingOrderId(_))
    }
}

const MAX_DISPLAYED_BODY: usize = 500;

fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_DISPLAYED_BODY {
        return body;
    }
    let mut end = MAX_DISPLAYED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.get(..end).unwrap_or(body)
}

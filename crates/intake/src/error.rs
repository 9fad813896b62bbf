//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the intake as a JSON body
//! `{"success": false, "message": ..., "error": ...}` so the storefront form
//! can show a message without inspecting status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use egpc_core::CheckoutError;
use serde::Serialize;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Message returned for every server-side failure.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to create order.";

/// Message returned when the referenced variant does not exist.
pub const VARIANT_NOT_FOUND_MESSAGE: &str = "Product variant not found.";

/// Application-level error type for the order intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Request body failed validation.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Body was not JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// Request was well-formed but cannot be served.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced resource not found upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure body sent to the caller.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntakeError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Checkout(_) | Self::InvalidJson(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Shopify(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Checkout(err) => ErrorBody {
                success: false,
                message: err.to_string(),
                error: None,
            },
            Self::InvalidJson(detail) => ErrorBody {
                success: false,
                message: "Invalid JSON body.".to_string(),
                error: Some(detail.clone()),
            },
            Self::BadRequest(message) => ErrorBody {
                success: false,
                message: message.clone(),
                error: None,
            },
            Self::NotFound(_) => ErrorBody {
                success: false,
                message: VARIANT_NOT_FOUND_MESSAGE.to_string(),
                error: None,
            },
            Self::Shopify(err) => ErrorBody {
                success: false,
                message: ORDER_FAILED_MESSAGE.to_string(),
                error: Some(err.to_string()),
            },
            Self::Internal(detail) => ErrorBody {
                success: false,
                message: ORDER_FAILED_MESSAGE.to_string(),
                error: Some(detail.clone()),
            },
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Shopify(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            let upstream_body = match &self {
                Self::Shopify(err) => err.response_body(),
                _ => None,
            };
            tracing::error!(
                error = %self,
                upstream_body = upstream_body.unwrap_or_default(),
                sentry_event_id = %event_id,
                "Order intake failed"
            );
        } else {
            tracing::info!(error = %self, "Order intake rejected");
        }

        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `IntakeError`.
pub type Result<T> = std::result::Result<T, IntakeError>;

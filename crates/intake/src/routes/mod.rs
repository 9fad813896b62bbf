//! HTTP route handlers for the order intake.
//!
//! # Route Structure
//!
//! ```text
//! POST /api/create-order   - Create a COD order from the checkout form
//! POST /                   - Same handler, for deployments that mount the function at the root
//! GET  /health             - Liveness check (added in lib.rs)
//! OPTIONS *                - CORS preflight (answered by middleware)
//! ```

pub mod orders;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Path the storefront form posts to.
pub const CREATE_ORDER_PATH: &str = "/api/create-order";

/// Create all routes for the order intake.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(CREATE_ORDER_PATH, post(orders::create_order))
        .route("/", post(orders::create_order))
}

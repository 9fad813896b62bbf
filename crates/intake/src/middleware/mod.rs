//! HTTP middleware stack for the order intake.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (preflight short-circuit, headers on every response)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded on the span, echoed in the response)

pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

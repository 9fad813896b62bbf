//! Business logic services.
//!
//! # Services
//!
//! - `order_intake` - Turns a checkout form submission into a completed COD order

pub mod order_intake;

pub use order_intake::{COMPLETION_UNCONFIRMED_MESSAGE, OrderCreated, OrderIntake};

//! EGPC Core - Checkout types and pure transforms.
//!
//! This crate holds everything the order intake needs that does not touch
//! the network:
//! - [`checkout`] - The checkout request as the storefront form sends it, and its validation
//! - [`draft_order`] - The draft order payload submitted to Shopify
//! - [`discount`] - Fixed-amount discount computation
//! - [`types`] - Shopify identifier newtypes
//!
//! # Architecture
//!
//! The core crate contains only types and functions - no I/O, no HTTP
//! clients. Every transform here is deterministic so it can be tested
//! without a Shopify store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod discount;
pub mod draft_order;
pub mod types;

pub use checkout::{
    CheckoutError, CheckoutItems, CheckoutRequest, CustomerName, LineItemInput, Property,
    ValidatedCheckout, ValidationRules, properties_to_pairs, split_full_name,
};
pub use discount::{AppliedDiscount, fixed_discount};
pub use draft_order::{DraftOrderPayload, ResolvedVariant};
pub use types::*;

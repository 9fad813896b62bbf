//! Core types for the EGPC order intake.
//!
//! This module provides type-safe wrappers for Shopify identifiers.

pub mod id;

pub use id::*;

//! Newtype IDs for Shopify resources.
//!
//! Use the `define_shopify_id!` macro to create type-safe ID wrappers that
//! prevent accidentally passing a draft order ID where a variant ID belongs.
//!
//! Storefront forms are inconsistent about how they send IDs, so every ID
//! type deserializes from any of:
//! - a JSON number (`123`)
//! - a numeric string (`"123"`)
//! - a Shopify GID (`"gid://shopify/ProductVariant/123"`)

use core::fmt;

use serde::de::{self, Visitor};

/// Prefix shared by all Shopify global IDs.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a Shopify ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The input is not a positive integer.
    #[error("id must be a positive integer (got {0:?})")]
    NotNumeric(String),
    /// The input is zero.
    #[error("id must be greater than zero")]
    Zero,
    /// The GID names a different resource type.
    #[error("expected a {expected} id, got a {found} gid")]
    WrongResource {
        /// Resource type this ID belongs to.
        expected: &'static str,
        /// Resource type named in the GID.
        found: String,
    },
}

/// Parse a numeric Shopify ID from a plain number or a GID string.
///
/// # Errors
///
/// Returns an error if the input is empty, zero, non-numeric, or a GID for
/// a different resource type.
pub fn parse_shopify_id(input: &str, resource: &'static str) -> Result<u64, IdError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(IdError::Empty);
    }

    let numeric = match input.strip_prefix(GID_PREFIX) {
        Some(rest) => {
            let (kind, id) = rest
                .split_once('/')
                .ok_or_else(|| IdError::NotNumeric(input.to_string()))?;
            if kind != resource {
                return Err(IdError::WrongResource {
                    expected: resource,
                    found: kind.to_string(),
                });
            }
            id
        }
        None => input,
    };

    let id = numeric
        .parse::<u64>()
        .map_err(|_| IdError::NotNumeric(input.to_string()))?;
    if id == 0 {
        return Err(IdError::Zero);
    }
    Ok(id)
}

/// Serde visitor accepting numbers, numeric strings, and GIDs.
#[doc(hidden)]
pub struct ShopifyIdVisitor {
    resource: &'static str,
}

impl ShopifyIdVisitor {
    #[doc(hidden)]
    #[must_use]
    pub const fn new(resource: &'static str) -> Self {
        Self { resource }
    }
}

impl Visitor<'_> for ShopifyIdVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a positive {} id as a number, string, or gid", self.resource)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        if v == 0 {
            return Err(E::custom(IdError::Zero));
        }
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(IdError::NotNumeric(v.to_string())))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        parse_shopify_id(v, self.resource).map_err(E::custom)
    }
}

/// Macro to define a Shopify ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize` as a bare number, lenient `Deserialize` (see module docs)
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_u64()`, `to_gid()`
/// - `FromStr`, `Display`, and `From<u64>` implementations
///
/// # Example
///
/// ```rust
/// # use egpc_core::define_shopify_id;
/// define_shopify_id!(CollectionId, "Collection");
///
/// let id: CollectionId = "gid://shopify/Collection/42".parse().unwrap();
/// assert_eq!(id.as_u64(), 42);
/// ```
#[macro_export]
macro_rules! define_shopify_id {
    ($name:ident, $resource:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Shopify resource type used in GIDs.
            pub const RESOURCE: &'static str = $resource;

            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// Render as a Shopify GID.
            #[must_use]
            pub fn to_gid(&self) -> String {
                format!("{}{}/{}", $crate::types::id::GID_PREFIX, $resource, self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::types::id::parse_shopify_id(s, $resource).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                deserializer
                    .deserialize_any($crate::types::id::ShopifyIdVisitor::new($resource))
                    .map(Self)
            }
        }
    };
}

define_shopify_id!(VariantId, "ProductVariant");
define_shopify_id!(DraftOrderId, "DraftOrder");
define_shopify_id!(OrderId, "Order");

//! Checkout request submitted by the EGPC storefront form.
//!
//! The form has shipped two payload shapes over time and both are still in
//! the wild:
//!
//! ```text
//! Legacy:  { variantId, quantity?, customer: { name, email, phone },
//!            shippingAddress: { address1, city, province, country, zip } }
//! Cart:    { line_items: [{ variant_id, quantity, properties? }],
//!            customer: { first_name, last_name, email, phone? },
//!            shippingAddress: {..}, shop?, total_price? }
//! ```
//!
//! [`CheckoutRequest`] accepts either at the wire level. [`CheckoutRequest::validate`]
//! turns it into a [`ValidatedCheckout`] or rejects it before any Shopify
//! call is made.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::VariantId;

/// Errors raised while validating a checkout request.
///
/// Every variant is a client error; none of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Missing required fields: variantId or line_items")]
    MissingItems,
    #[error("Missing required fields: customer")]
    MissingCustomer,
    #[error("Missing required fields: customer.email")]
    MissingEmail,
    #[error("Missing required fields: customer name")]
    MissingName,
    #[error("Missing required fields: shippingAddress")]
    MissingShippingAddress,
    #[error("shippingAddress must be a JSON object")]
    InvalidShippingAddress,
    #[error("line_items[{index}].quantity must be at least 1")]
    ZeroQuantity { index: usize },
    #[error("Missing required fields: shop")]
    MissingShop,
    #[error("Missing required fields: total_price")]
    MissingTotalPrice,
    #[error("total_price cannot be negative")]
    NegativeTotalPrice,
}

/// Deployment-specific validation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationRules {
    /// Reject cart submissions that do not name the shop.
    pub require_shop: bool,
    /// Reject cart submissions that do not carry the displayed total.
    pub require_total_price: bool,
}

/// A custom line item property in the shape Shopify expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Line item properties as sent by the form.
///
/// Older themes send a list of `{name, value}`; newer ones send a plain
/// mapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LineItemProperties {
    Pairs(Vec<Property>),
    Map(Map<String, Value>),
}

impl LineItemProperties {
    /// Normalize into the `{name, value}` list Shopify requires.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<Property> {
        match self {
            Self::Pairs(pairs) => pairs.clone(),
            Self::Map(map) => properties_to_pairs(map),
        }
    }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineItemInput {
    #[serde(alias = "variantId")]
    pub variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub properties: Option<LineItemProperties>,
}

const fn default_quantity() -> u32 {
    1
}

/// Customer block. Legacy forms send `name`, cart forms send split names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Raw checkout payload, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default, rename = "variantId", alias = "variant_id")]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub line_items: Option<Vec<LineItemInput>>,
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default, rename = "shippingAddress", alias = "shipping_address")]
    pub shipping_address: Option<Value>,
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

/// First and last name as Shopify stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerName {
    pub first_name: String,
    pub last_name: String,
}

/// Validated customer details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCustomer {
    pub name: CustomerName,
    pub email: String,
    pub phone: Option<String>,
}

/// What the customer is buying.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutItems {
    /// Legacy single-variant submission. Price and title come from Shopify.
    Variant { variant_id: VariantId, quantity: u32 },
    /// Cart submission with caller-supplied lines.
    Lines(Vec<LineItemInput>),
}

impl CheckoutItems {
    /// Whether this came from the cart-based form.
    #[must_use]
    pub const fn is_cart(&self) -> bool {
        matches!(self, Self::Lines(_))
    }
}

/// A checkout request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCheckout {
    pub items: CheckoutItems,
    pub customer: ValidatedCustomer,
    pub shipping_address: Map<String, Value>,
    pub shop: Option<String>,
    pub total_price: Option<Decimal>,
}

impl CheckoutRequest {
    /// Validate the request and normalize it.
    ///
    /// Cart lines take precedence when a request carries both `line_items`
    /// and `variantId`.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] naming the first missing or invalid field.
    pub fn validate(&self, rules: ValidationRules) -> Result<ValidatedCheckout, CheckoutError> {
        let items = self.validate_items()?;
        let customer = self
            .customer
            .as_ref()
            .ok_or(CheckoutError::MissingCustomer)?
            .validate()?;
        let shipping_address = self.validate_shipping_address()?;

        let shop = non_empty(self.shop.as_deref()).map(str::to_string);
        if items.is_cart() {
            if rules.require_shop && shop.is_none() {
                return Err(CheckoutError::MissingShop);
            }
            if rules.require_total_price && self.total_price.is_none() {
                return Err(CheckoutError::MissingTotalPrice);
            }
        }
        if self.total_price.is_some_and(|t| t < Decimal::ZERO) {
            return Err(CheckoutError::NegativeTotalPrice);
        }

        Ok(ValidatedCheckout {
            items,
            customer,
            shipping_address,
            shop,
            total_price: self.total_price,
        })
    }

    fn validate_items(&self) -> Result<CheckoutItems, CheckoutError> {
        if let Some(lines) = self.line_items.as_ref().filter(|l| !l.is_empty()) {
            if let Some(index) = lines.iter().position(|l| l.quantity == 0) {
                return Err(CheckoutError::ZeroQuantity { index });
            }
            return Ok(CheckoutItems::Lines(lines.clone()));
        }

        let variant_id = self.variant_id.ok_or(CheckoutError::MissingItems)?;
        let quantity = self.quantity.unwrap_or_else(default_quantity);
        if quantity == 0 {
            return Err(CheckoutError::ZeroQuantity { index: 0 });
        }
        Ok(CheckoutItems::Variant {
            variant_id,
            quantity,
        })
    }

    fn validate_shipping_address(&self) -> Result<Map<String, Value>, CheckoutError> {
        match &self.shipping_address {
            None | Some(Value::Null) => Err(CheckoutError::MissingShippingAddress),
            Some(Value::Object(map)) if map.is_empty() => {
                Err(CheckoutError::MissingShippingAddress)
            }
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(CheckoutError::InvalidShippingAddress),
        }
    }
}

impl CustomerInput {
    fn validate(&self) -> Result<ValidatedCustomer, CheckoutError> {
        let email = non_empty(self.email.as_deref()).ok_or(CheckoutError::MissingEmail)?;

        let name = if let Some(first_name) = non_empty(self.first_name.as_deref()) {
            CustomerName {
                first_name: first_name.to_string(),
                last_name: non_empty(self.last_name.as_deref())
                    .unwrap_or_default()
                    .to_string(),
            }
        } else if let Some(full_name) = non_empty(self.name.as_deref()) {
            split_full_name(full_name)
        } else {
            return Err(CheckoutError::MissingName);
        };

        Ok(ValidatedCustomer {
            name,
            email: email.to_string(),
            phone: non_empty(self.phone.as_deref()).map(str::to_string),
        })
    }
}

/// Split a combined name into first and last name.
///
/// The first word becomes the first name; the remaining words, joined with
/// single spaces, become the last name. A single-word name yields an empty
/// last name rather than none.
#[must_use]
pub fn split_full_name(full_name: &str) -> CustomerName {
    let mut words = full_name.split_whitespace();
    let first_name = words.next().unwrap_or_default().to_string();
    let last_name = words.collect::<Vec<_>>().join(" ");
    CustomerName {
        first_name,
        last_name,
    }
}

/// Convert a properties mapping into `{name, value}` pairs.
///
/// Pairs come out in the mapping's insertion order. Non-string values are
/// rendered as JSON text; `null` becomes an empty string.
#[must_use]
pub fn properties_to_pairs(properties: &Map<String, Value>) -> Vec<Property> {
    properties
        .iter()
        .map(|(name, value)| Property {
            name: name.clone(),
            value: match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            },
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

//! Draft order payload submitted to the Shopify Admin REST API.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::checkout::{CheckoutItems, Property, ValidatedCheckout};
use crate::types::VariantId;

/// Tag applied to orders from the legacy single-variant form.
pub const LEGACY_TAGS: &str = "EGPC";
/// Tags applied to orders from the cart form.
pub const CART_TAGS: &str = "EGPC, One-Step-Checkout";
/// Address fields copied from the legacy form; anything else it sends is dropped.
const LEGACY_ADDRESS_FIELDS: &[&str] = &["address1", "city", "province", "country", "zip"];
/// Order note shown to staff in the Shopify admin.
pub const ORDER_NOTE: &str = "Pedido generado por formulario EGPC (Pago Contra Entrega)";

/// Variant details fetched from Shopify for legacy submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub id: VariantId,
    pub price: String,
    pub title: String,
}

/// Draft order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftLineItem {
    pub variant_id: VariantId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// Customer attached to the draft order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of a "create draft order" call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftOrderPayload {
    pub line_items: Vec<DraftLineItem>,
    pub customer: DraftCustomer,
    pub shipping_address: Map<String, Value>,
    pub email: String,
    pub use_customer_default_address: bool,
    pub tags: String,
    pub note: String,
    /// COD orders are confirmed by phone, not by Shopify's receipt email.
    pub send_receipt: bool,
}

impl DraftOrderPayload {
    /// Build the payload for a validated checkout.
    ///
    /// Legacy submissions use `variant` for the line's price and title. When
    /// it is `None` the line carries only the variant ID and Shopify prices it.
    #[must_use]
    pub fn from_checkout(checkout: &ValidatedCheckout, variant: Option<&ResolvedVariant>) -> Self {
        let line_items = match &checkout.items {
            CheckoutItems::Variant {
                variant_id,
                quantity,
            } => vec![DraftLineItem {
                variant_id: variant.map_or(*variant_id, |v| v.id),
                quantity: *quantity,
                price: variant.map(|v| v.price.clone()),
                title: variant.map(|v| v.title.clone()),
                properties: Vec::new(),
            }],
            CheckoutItems::Lines(lines) => lines
                .iter()
                .map(|line| DraftLineItem {
                    variant_id: line.variant_id,
                    quantity: line.quantity,
                    price: None,
                    title: None,
                    properties: line
                        .properties
                        .as_ref()
                        .map(|p| p.to_pairs())
                        .unwrap_or_default(),
                })
                .collect(),
        };

        let customer = &checkout.customer;
        let tags = if checkout.items.is_cart() {
            CART_TAGS
        } else {
            LEGACY_TAGS
        };

        Self {
            line_items,
            customer: DraftCustomer {
                first_name: customer.name.first_name.clone(),
                last_name: customer.name.last_name.clone(),
                email: customer.email.clone(),
                phone: customer.phone.clone(),
            },
            shipping_address: shipping_address_for(checkout),
            email: customer.email.clone(),
            use_customer_default_address: false,
            tags: tags.to_string(),
            note: ORDER_NOTE.to_string(),
            send_receipt: false,
        }
    }
}

/// The caller's address, with recipient fields filled from the customer.
///
/// Cart submissions pass their address through; legacy submissions keep
/// only the street, city, province, country, and zip.
fn shipping_address_for(checkout: &ValidatedCheckout) -> Map<String, Value> {
    let customer = &checkout.customer;
    let mut address = if checkout.items.is_cart() {
        checkout.shipping_address.clone()
    } else {
        checkout
            .shipping_address
            .iter()
            .filter(|(key, _)| LEGACY_ADDRESS_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    };

    let mut fill = |key: &str, value: &str| {
        let missing = match address.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            address.insert(key.to_string(), Value::String(value.to_string()));
        }
    };

    // An empty last name is sent as "", never omitted
    fill("first_name", &customer.name.first_name);
    fill("last_name", &customer.name.last_name);
    if let Some(phone) = &customer.phone {
        fill("phone", phone);
    }

    address
}

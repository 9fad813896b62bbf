//! Fixed-amount discount applied when the form's total undercuts Shopify's.
//!
//! The storefront can show a promotional total that Shopify does not know
//! about. The difference is applied to the draft order as a fixed discount
//! before completion so the COD amount matches what the customer saw.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Money amounts are sent to Shopify with two decimal places.
pub const MONEY_SCALE: u32 = 2;

const DISCOUNT_TITLE: &str = "EGPC";
const DISCOUNT_DESCRIPTION: &str = "Ajuste de precio formulario EGPC";

/// Compute the discount needed to bring `subtotal` down to `requested_total`.
///
/// Returns `None` when the requested total is equal to or above the
/// subtotal: the form can lower a price but never raise it.
#[must_use]
pub fn fixed_discount(subtotal: Decimal, requested_total: Decimal) -> Option<Decimal> {
    let mut discount = subtotal
        .checked_sub(requested_total)?
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    discount.rescale(MONEY_SCALE);
    (discount > Decimal::ZERO).then_some(discount)
}

/// How Shopify interprets a discount's `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountValueType {
    FixedAmount,
    Percentage,
}

/// Draft order `applied_discount` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedDiscount {
    pub title: String,
    pub description: String,
    pub value_type: DiscountValueType,
    pub value: String,
    pub amount: String,
}

impl AppliedDiscount {
    /// A fixed-amount discount tagged as coming from the EGPC form.
    #[must_use]
    pub fn fixed(amount: Decimal) -> Self {
        let formatted = format!("{amount:.2}");
        Self {
            title: DISCOUNT_TITLE.to_string(),
            description: DISCOUNT_DESCRIPTION.to_string(),
            value_type: DiscountValueType::FixedAmount,
            value: formatted.clone(),
            amount: formatted,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_discount_two_decimal_places() {
        let discount = fixed_discount(Decimal::from(50_000), Decimal::from(45_000)).unwrap();
        assert_eq!(discount.to_string(), "5000.00");
    }

    #[test]
    fn test_discount_rounds_fractional_cents() {
        let subtotal = Decimal::from_str("100.005").unwrap();
        let discount = fixed_discount(subtotal, Decimal::from(90)).unwrap();
        assert_eq!(discount.to_string(), "10.01");
    }

    #[test]
    fn test_no_discount_when_equal_or_higher() {
        assert_eq!(fixed_discount(Decimal::from(100), Decimal::from(100)), None);
        assert_eq!(fixed_discount(Decimal::from(100), Decimal::from(120)), None);
    }

    #[test]
    fn test_sub_cent_difference_is_not_a_discount() {
        let subtotal = Decimal::from_str("100.004").unwrap();
        assert_eq!(fixed_discount(subtotal, Decimal::from(100)), None);
    }

    #[test]
    fn test_applied_discount_serialization() {
        let discount = AppliedDiscount::fixed(Decimal::from(5000));
        let json = serde_json::to_value(&discount).unwrap();
        assert_eq!(json["value_type"], "fixed_amount");
        assert_eq!(json["value"], "5000.00");
        assert_eq!(json["amount"], "5000.00");
        assert_eq!(json["title"], "EGPC");
    }
}

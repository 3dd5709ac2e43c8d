//! Money calculation utilities using rust_decimal for precision
//!
//! Line totals and discounts are computed with `Decimal` internally,
//! then converted to `f64` for storage/serialization.

use rust_decimal::prelude::*;

use super::error::{FulfillmentError, FulfillmentResult};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item (€1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
pub const MAX_QUANTITY: i64 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> FulfillmentResult<()> {
    if !value.is_finite() {
        return Err(FulfillmentError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a unit price before it enters a monetary calculation
pub fn validate_unit_price(price: f64) -> FulfillmentResult<()> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(FulfillmentError::Validation(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(FulfillmentError::Validation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i64) -> FulfillmentResult<()> {
    if quantity < 1 || quantity > MAX_QUANTITY {
        return Err(FulfillmentError::Validation(format!(
            "quantity must be between 1 and {}, got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a percentage discount (0–100)
pub fn validate_discount_percent(discount: f64) -> FulfillmentResult<()> {
    require_finite(discount, "discount_percent")?;
    if !(0.0..=100.0).contains(&discount) {
        return Err(FulfillmentError::Validation(format!(
            "discount_percent must be between 0 and 100, got {}",
            discount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
///
/// Input values should be pre-validated via `require_finite()` at the
/// boundary. If NaN/Infinity somehow reaches here, logs an error and
/// returns ZERO to avoid silent data corruption.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// quantity × unit price, rounded for storage
pub fn line_subtotal(quantity: i64, unit_price: f64) -> f64 {
    to_f64(Decimal::from(quantity) * to_decimal(unit_price))
}

/// Apply a percentage discount (0–100) to a total
pub fn apply_discount_percent(total: f64, discount_percent: f64) -> f64 {
    let factor = Decimal::ONE - to_decimal(discount_percent) / Decimal::from(100);
    to_f64(to_decimal(total) * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_rounds_to_cents() {
        assert_eq!(line_subtotal(3, 3.335), 10.01);
        assert_eq!(line_subtotal(2, 10.0), 20.0);
    }

    #[test]
    fn test_apply_discount() {
        assert_eq!(apply_discount_percent(100.0, 10.0), 90.0);
        assert_eq!(apply_discount_percent(33.33, 50.0), 16.67);
        assert_eq!(apply_discount_percent(50.0, 0.0), 50.0);
        assert_eq!(apply_discount_percent(50.0, 100.0), 0.0);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(validate_unit_price(f64::NAN).is_err());
        assert!(validate_unit_price(f64::INFINITY).is_err());
        assert!(validate_unit_price(-1.0).is_err());
        assert!(validate_unit_price(9.5).is_ok());
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_discount_bounds() {
        assert!(validate_discount_percent(-0.1).is_err());
        assert!(validate_discount_percent(100.1).is_err());
        assert!(validate_discount_percent(25.0).is_ok());
    }
}

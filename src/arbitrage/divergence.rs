//! Cross-venue price divergence.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::venue::PriceSample;

/// Signed percentage divergence between two venue prices for one pair:
/// `((priceA - priceB) / priceB) * 100`, rounded to 2 decimal places.
///
/// Prices are fixed to the configured display precision before the
/// comparison so both venues are judged at the same granularity.
///
/// Precondition: `sample_b.price` is positive. A zero or negative price
/// cannot come out of a valid pool and is a caller contract violation.
/// A positive price that rounds to zero at the display precision is
/// below the comparable range and yields zero divergence.
pub fn price_divergence(sample_a: &PriceSample, sample_b: &PriceSample, price_units: u32) -> Decimal {
    let a = fix(sample_a.price, price_units);
    let b = fix(sample_b.price, price_units);

    if b.is_zero() {
        return Decimal::ZERO;
    }

    fix((a - b) / b * Decimal::ONE_HUNDRED, 2)
}

fn fix(value: Decimal, units: u32) -> Decimal {
    value.round_dp_with_strategy(units, RoundingStrategy::MidpointAwayFromZero)
}

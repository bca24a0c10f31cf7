//! Conversions between base-unit amounts and display-unit decimals.
//!
//! Base units are `U256` integers scaled by a token's decimal precision;
//! display units are [`Decimal`] values used for all accounting and logs.
//! Fractional remainders truncate toward zero in every conversion here,
//! so a value never rounds up into balance it does not have.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::error::ChainError;

/// Decimal precision of the native asset (ETH and friends).
pub const NATIVE_DECIMALS: u8 = 18;

/// Maximum significant digits a [`Decimal`] can carry.
const MAX_DIGITS: usize = 28;

/// Convert a base-unit amount into display units at the given precision.
///
/// Fractional digits that exceed `Decimal`'s 28-digit capacity are
/// truncated; an integer part wider than 28 digits is an error.
pub fn format_units(amount: U256, decimals: u8) -> Result<Decimal, ChainError> {
    let digits = amount.to_string();
    let decimals = decimals as usize;

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        // Left-pad: the whole value is fractional.
        let frac = format!("{:0>width$}", digits, width = decimals);
        ("0".to_string(), frac)
    };

    let int_digits = int_part.trim_start_matches('0').len();
    if int_digits > MAX_DIGITS {
        return Err(ChainError::Conversion(format!(
            "{amount} exceeds decimal capacity at {decimals} decimals"
        )));
    }

    let scale = frac_part.len().min(MAX_DIGITS - int_digits);
    let frac_part = &frac_part[..scale];

    let rendered = if frac_part.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_part}")
    };

    rendered
        .parse::<Decimal>()
        .map_err(|e| ChainError::Conversion(format!("parsing {rendered}: {e}")))
}

/// Convert a display-unit value into base units at the given precision.
///
/// Fractional digits beyond the token's precision are truncated.
/// Negative values are an error; base units are unsigned.
pub fn parse_units(value: Decimal, decimals: u8) -> Result<U256, ChainError> {
    if value.is_sign_negative() {
        return Err(ChainError::Conversion(format!(
            "negative amount {value} cannot be expressed in base units"
        )));
    }

    let rendered = value.to_string();
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rendered.as_str(), ""),
    };

    let decimals = decimals as usize;
    let frac_fixed = if frac_part.len() >= decimals {
        frac_part[..decimals].to_string()
    } else {
        format!("{:0<width$}", frac_part, width = decimals)
    };

    let combined = format!("{int_part}{frac_fixed}");
    let trimmed = combined.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(trimmed, 10)
        .map_err(|e| ChainError::Conversion(format!("parsing {value} as base units: {e}")))
}

/// Multiply a base-unit amount by a decimal fraction, truncating the
/// fractional base-unit remainder.
pub fn apply_fraction(amount: U256, fraction: Decimal) -> Result<U256, ChainError> {
    if fraction.is_sign_negative() {
        return Err(ChainError::Conversion(format!(
            "negative fraction {fraction}"
        )));
    }

    let mantissa = fraction.mantissa().unsigned_abs();
    let scale = U256::from(10u8).pow(U256::from(fraction.scale()));

    let scaled = amount
        .checked_mul(U256::from(mantissa))
        .ok_or_else(|| ChainError::Conversion(format!("{amount} * {fraction} overflows")))?;

    Ok(scaled / scale)
}

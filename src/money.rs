//! Money Conversion Module
//!
//! Conversion between the display decimal unit and the ledger's integer
//! base unit. All conversions MUST go through this module.
//!
//! ## Internal Representation
//! - On-ledger amounts are `u64` base units
//! - The scale factor is fixed: `10^9` base units per coin
//! - Conversion to base units truncates toward zero, never up; an amount
//!   that truncates below one base unit is rejected

use rust_decimal::prelude::*;
use thiserror::Error;

/// Base units per display coin (lamport-style fixed divisor)
pub const BASE_UNITS_PER_COIN: u64 = 1_000_000_000;

/// Decimal places of the base unit
pub const BASE_UNIT_DECIMALS: u32 = 9;

/// Money conversion errors
#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,
}

/// Convert a display amount to integer base units.
///
/// Truncates toward zero: `1.9999999999` becomes `1_999_999_999` units.
/// Rejects zero, negative, and sub-base-unit amounts.
pub fn to_base_units(amount: Decimal) -> Result<u64, MoneyError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }

    let scaled = amount
        .checked_mul(Decimal::from(BASE_UNITS_PER_COIN))
        .ok_or(MoneyError::Overflow)?;

    let units = scaled.trunc().to_u64().ok_or(MoneyError::Overflow)?;
    if units == 0 {
        return Err(MoneyError::InvalidAmount);
    }

    Ok(units)
}

/// Convert base units back to the display decimal unit. Exact.
pub fn from_base_units(units: u64) -> Decimal {
    Decimal::from(units) / Decimal::from(BASE_UNITS_PER_COIN)
}

/// Convert base units to a display string with a fixed number of decimals
pub fn format_base_units(units: u64, display_decimals: u32) -> String {
    format!(
        "{:.prec$}",
        from_base_units(units),
        prec = display_decimals as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn qa_to_base_units_exact() {
        assert_eq!(to_base_units(dec("1")).unwrap(), 1_000_000_000);
        assert_eq!(to_base_units(dec("0.5")).unwrap(), 500_000_000);
        assert_eq!(to_base_units(dec("0.000000001")).unwrap(), 1);
        assert_eq!(to_base_units(dec("1234.567890123")).unwrap(), 1_234_567_890_123);
    }

    #[test]
    fn qa_to_base_units_truncates_toward_zero() {
        // Excess precision must never round up
        assert_eq!(to_base_units(dec("1.9999999999")).unwrap(), 1_999_999_999);
        assert_eq!(to_base_units(dec("0.0000000019")).unwrap(), 1);
        assert_eq!(to_base_units(dec("0.123456789999")).unwrap(), 123_456_789);
    }

    #[test]
    fn qa_to_base_units_rejects_non_positive() {
        assert!(matches!(
            to_base_units(dec("0")),
            Err(MoneyError::InvalidAmount)
        ));
        assert!(matches!(
            to_base_units(dec("-1.5")),
            Err(MoneyError::InvalidAmount)
        ));
        // Truncates below one base unit
        assert!(matches!(
            to_base_units(dec("0.0000000001")),
            Err(MoneyError::InvalidAmount)
        ));
    }

    #[test]
    fn qa_to_base_units_overflow() {
        // u64::MAX base units is 18_446_744_073.709551615 coins
        assert_eq!(
            to_base_units(dec("18446744073.709551615")).unwrap(),
            u64::MAX
        );
        assert!(matches!(
            to_base_units(dec("18446744073.709551616")),
            Err(MoneyError::Overflow)
        ));
    }

    #[test]
    fn qa_from_base_units_roundtrip() {
        for units in [1u64, 999, 500_000_000, 1_000_000_000, 1_234_567_890_123] {
            assert_eq!(to_base_units(from_base_units(units)).unwrap(), units);
        }
    }

    #[test]
    fn qa_format_base_units() {
        assert_eq!(format_base_units(1_500_000_000, 4), "1.5000");
        assert_eq!(format_base_units(1_999_999_999, 2), "1.99");
        assert_eq!(format_base_units(1, 9), "0.000000001");
    }
}

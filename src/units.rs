//! Exact conversion between decimal display amounts and base-unit integers.
//!
//! Amounts are parsed digit by digit into a `U256`; no floating point is
//! involved at any step, so "0.123456789012345678" maps to exactly
//! 123456789012345678 base units.

use std::fmt;

use alloy_primitives::U256;

/// Decimals of the native asset held by the bank contract.
pub const ETH_DECIMALS: u8 = 18;
/// Fractional digits shown for balances.
pub const BALANCE_DISPLAY_PLACES: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    Empty,
    Negative,
    Malformed(String),
    TooManyDecimals { max: u8 },
    Overflow,
}

impl fmt::Display for UnitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "amount is empty"),
            Self::Negative => write!(f, "amount must not be negative"),
            Self::Malformed(raw) => write!(f, "'{raw}' is not a decimal amount"),
            Self::TooManyDecimals { max } => {
                write!(f, "amount has more than {max} fractional digits")
            }
            Self::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for UnitsError {}

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Parse a decimal string in display units into base units.
///
/// Accepts ASCII digits with at most one `.` (".5" and "5." are fine).
/// Surrounding whitespace is ignored; signs, exponents and digit
/// separators are rejected.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, UnitsError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(UnitsError::Empty);
    }
    if raw.starts_with('-') {
        return Err(UnitsError::Negative);
    }

    let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::Malformed(raw.to_string()));
    }
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(UnitsError::Malformed(raw.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals { max: decimals });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(frac);
    digits.extend(std::iter::repeat('0').take(decimals as usize - frac.len()));

    U256::from_str_radix(&digits, 10).map_err(|_| UnitsError::Overflow)
}

/// Format base units as a display amount with exactly `places` fractional
/// digits, rounding half up.
pub fn format_units_fixed(value: U256, decimals: u8, places: u8) -> String {
    let places = places.min(decimals);
    let scale = pow10(decimals - places);
    let mut scaled = value / scale;
    let remainder = value % scale;
    if scale > U256::from(1u64) && remainder >= scale - remainder {
        scaled = scaled.saturating_add(U256::from(1u64));
    }

    if places == 0 {
        return scaled.to_string();
    }

    let unit = pow10(places);
    let whole = scaled / unit;
    let frac = (scaled % unit).to_string();
    let padding = "0".repeat(places as usize - frac.len());
    format!("{whole}.{padding}{frac}")
}

/// Balance text shown in the bank panel: 4 places, "0.0000" when unknown.
pub fn balance_display(balance: Option<U256>) -> String {
    match balance {
        Some(value) => format_units_fixed(value, ETH_DECIMALS, BALANCE_DISPLAY_PLACES),
        None => format_units_fixed(U256::ZERO, ETH_DECIMALS, BALANCE_DISPLAY_PLACES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn whole_ether_is_exact() {
        assert_eq!(
            parse_units("1", ETH_DECIMALS).unwrap(),
            wei("1000000000000000000")
        );
    }

    #[test]
    fn fractional_amounts_have_no_float_drift() {
        assert_eq!(
            parse_units("0.1", ETH_DECIMALS).unwrap(),
            wei("100000000000000000")
        );
        assert_eq!(
            parse_units("0.123456789012345678", ETH_DECIMALS).unwrap(),
            wei("123456789012345678")
        );
        assert_eq!(
            parse_units("12345.000000000000000001", ETH_DECIMALS).unwrap(),
            wei("12345000000000000000001")
        );
    }

    #[test]
    fn leading_or_trailing_dot_is_accepted() {
        assert_eq!(
            parse_units(".5", ETH_DECIMALS).unwrap(),
            wei("500000000000000000")
        );
        assert_eq!(
            parse_units("2.", ETH_DECIMALS).unwrap(),
            wei("2000000000000000000")
        );
        assert_eq!(
            parse_units("  0.25 ", ETH_DECIMALS).unwrap(),
            wei("250000000000000000")
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_units("", ETH_DECIMALS), Err(UnitsError::Empty));
        assert_eq!(parse_units("   ", ETH_DECIMALS), Err(UnitsError::Empty));
        assert_eq!(parse_units("-1", ETH_DECIMALS), Err(UnitsError::Negative));
        for bad in [".", "abc", "1e18", "+1", "1,5", "1.2.3", "0x10", "1 000"] {
            assert!(
                matches!(parse_units(bad, ETH_DECIMALS), Err(UnitsError::Malformed(_))),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_excess_precision() {
        assert_eq!(
            parse_units("0.1234567890123456789", ETH_DECIMALS),
            Err(UnitsError::TooManyDecimals { max: 18 })
        );
    }

    #[test]
    fn rejects_values_beyond_uint256() {
        let huge = "1".repeat(80);
        assert_eq!(parse_units(&huge, ETH_DECIMALS), Err(UnitsError::Overflow));
    }

    #[test]
    fn formats_to_four_places() {
        assert_eq!(balance_display(None), "0.0000");
        assert_eq!(balance_display(Some(U256::ZERO)), "0.0000");
        assert_eq!(balance_display(Some(wei("1500000000000000000"))), "1.5000");
        assert_eq!(balance_display(Some(wei("123456789012345678"))), "0.1235");
        assert_eq!(balance_display(Some(wei("42000000000000000000000"))), "42000.0000");
    }

    #[test]
    fn rounds_half_up_on_exact_value() {
        assert_eq!(balance_display(Some(wei("50000000000000"))), "0.0001");
        assert_eq!(balance_display(Some(wei("49999999999999"))), "0.0000");
        assert_eq!(balance_display(Some(wei("999950000000000000"))), "1.0000");
    }

    #[test]
    fn zero_places_prints_integer_part() {
        assert_eq!(format_units_fixed(wei("2500000000000000000"), 18, 0), "3");
        assert_eq!(format_units_fixed(wei("7"), 0, 4), "7");
    }
}

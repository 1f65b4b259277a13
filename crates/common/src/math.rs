//! Fixed-point math utilities
//!
//! Amounts are non-negative integers scaled by 1e18. Every product that can
//! exceed `u128` is formed in `U256` and floored back down; all division
//! truncates toward zero.

use crate::error::{AmountParseError, MathError};
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for products of two amounts.
    pub struct U256(4);
}

/// Scaled quantity of the native asset or the token (18 decimals)
pub type Amount = u128;

/// Fixed-point precision (18 decimals)
pub const DECIMALS: u32 = 18;
pub const SCALE: Amount = 1_000_000_000_000_000_000;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: Amount = 10_000;

/// Convert whole units into a scaled amount
#[inline]
pub fn units(whole: u64) -> Amount {
    (whole as u128) * SCALE
}

/// Multiply two amounts without loss
#[inline]
pub fn wide_mul(a: Amount, b: Amount) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Narrow a U256 back to an amount
#[inline]
pub fn narrow(value: U256) -> Result<Amount, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}

/// Compute floor(a * b / denominator) with a 256-bit intermediate
#[inline]
pub fn mul_div_floor(a: Amount, b: Amount, denominator: Amount) -> Result<Amount, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    narrow(wide_mul(a, b) / U256::from(denominator))
}

/// Divide a U256 by an amount, rounding down
#[inline]
pub fn div_floor_wide(numerator: U256, denominator: Amount) -> Result<Amount, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    narrow(numerator / U256::from(denominator))
}

#[inline]
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn checked_sub(a: Amount, b: Amount) -> Result<Amount, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Apply a basis-point ratio: floor(value * bps / 10_000)
#[inline]
pub fn bps_mul(value: Amount, bps: u16) -> Result<Amount, MathError> {
    mul_div_floor(value, bps as Amount, BPS_SCALE)
}

/// Parse a decimal string ("0.01", "3000") into a scaled amount
pub fn parse_amount(text: &str) -> Result<Amount, AmountParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(AmountParseError::InvalidDigit(text.to_string()));
    }
    if frac.len() > DECIMALS as usize {
        return Err(AmountParseError::TooManyDecimals(frac.len()));
    }

    let whole_value: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountParseError::OutOfRange)?
    };
    let frac_value: Amount = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
        padded.parse().map_err(|_| AmountParseError::OutOfRange)?
    };

    whole_value
        .checked_mul(SCALE)
        .and_then(|scaled| scaled.checked_add(frac_value))
        .ok_or(AmountParseError::OutOfRange)
}

/// Format a scaled amount as a decimal string ("3.0", "0.003")
pub fn format_amount(amount: Amount) -> String {
    let whole = amount / SCALE;
    let frac = amount % SCALE;
    let digits = format!("{:0>width$}", frac, width = DECIMALS as usize);
    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Serde adapter: amounts as decimal strings ("4.8"), since TOML and JSON
/// integers cannot carry 18-decimal values
pub mod decimal {
    use super::{format_amount, parse_amount, Amount};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_amount(*amount))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_amount(&text).map_err(de::Error::custom)
    }

    pub mod option {
        use super::super::{format_amount, parse_amount, Amount};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            amount: &Option<Amount>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match amount {
                Some(amount) => serializer.serialize_some(&format_amount(*amount)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Amount>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => parse_amount(&text).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}


// ═══════════════════════════════════════════════════════════════
// KANI FORMAL VERIFICATION PROOFS
// ═══════════════════════════════════════════════════════════════

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// M1: mul_div_floor never rounds up
    ///
    /// Property: result * denominator <= a * b < (result + 1) * denominator
    #[kani::proof]
    #[kani::unwind(3)]
    fn m1_mul_div_floors() {
        let a: u64 = kani::any();
        let b: u64 = kani::any();
        let d: u64 = kani::any();
        kani::assume(d > 0);

        let q = mul_div_floor(a as u128, b as u128, d as u128).unwrap();
        let product = (a as u128) * (b as u128);

        assert!(q * (d as u128) <= product, "M1: floor must not exceed exact quotient");
        assert!(product - q * (d as u128) < d as u128, "M1: remainder below denominator");
    }

    /// M2: bps_mul never exceeds its input for ratios up to 100%
    #[kani::proof]
    #[kani::unwind(3)]
    fn m2_bps_bounded() {
        let value: u64 = kani::any();
        let bps: u16 = kani::any();
        kani::assume(bps <= 10_000);

        let scaled = bps_mul(value as u128, bps).unwrap();
        assert!(scaled <= value as u128, "M2: bps ratio must not inflate value");
    }
}

// crates/synthex-core/src/decimal.rs
//
// Fixed-point arithmetic for amounts, rates, and debt ratios.
//
// Amounts and rates carry 18 decimals (UNIT). Debt-ledger ratios and
// ownership fractions carry 27 decimals (PRECISE_UNIT) so that repeated
// compounding loses as little as possible. Every product is computed in a
// 256-bit intermediate and narrowed back to u128 with an overflow check.

use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// Number of decimals carried by amounts and rates.
pub const DECIMALS: u32 = 18;

/// 1.0 at 18 decimals.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// 1.0 at 27 decimals.
pub const PRECISE_UNIT: u128 = 1_000_000_000_000_000_000_000_000_000;

/// An 18-decimal fixed-point quantity (token amount or rate).
pub type Amount = u128;

fn narrow(value: U256) -> Result<u128, SynthError> {
    if value > U256::from(u128::MAX) {
        return Err(SynthError::Overflow(format!(
            "value {} does not fit in 128 bits",
            value
        )));
    }
    Ok(value.low_u128())
}

fn wide_product(a: u128, b: u128) -> U256 {
    // u128::MAX squared is below 2^256, so this cannot overflow.
    U256::from(a) * U256::from(b)
}

/// `a * b / d`, truncating.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, SynthError> {
    if d == 0 {
        return Err(SynthError::InvalidParameter("division by zero".to_string()));
    }
    narrow(wide_product(a, b) / U256::from(d))
}

/// `a * b / d`, rounding half up.
pub fn mul_div_round(a: u128, b: u128, d: u128) -> Result<u128, SynthError> {
    if d == 0 {
        return Err(SynthError::InvalidParameter("division by zero".to_string()));
    }
    let divisor = U256::from(d);
    let numerator = wide_product(a, b)
        .checked_add(divisor / 2)
        .ok_or_else(|| SynthError::Overflow("rounding term".to_string()))?;
    narrow(numerator / divisor)
}

/// `x * y` for two 18-decimal values, truncating.
pub fn multiply_decimal(x: u128, y: u128) -> Result<u128, SynthError> {
    mul_div(x, y, UNIT)
}

/// `x * y` for two 18-decimal values, rounding half up.
pub fn multiply_decimal_round(x: u128, y: u128) -> Result<u128, SynthError> {
    mul_div_round(x, y, UNIT)
}

/// `x / y` for two 18-decimal values, truncating.
pub fn divide_decimal(x: u128, y: u128) -> Result<u128, SynthError> {
    mul_div(x, UNIT, y)
}

/// `x / y` for two 18-decimal values, rounding half up.
pub fn divide_decimal_round(x: u128, y: u128) -> Result<u128, SynthError> {
    mul_div_round(x, UNIT, y)
}

/// `x * y` for two 27-decimal values, rounding half up.
pub fn multiply_precise_round(x: u128, y: u128) -> Result<u128, SynthError> {
    mul_div_round(x, y, PRECISE_UNIT)
}

/// `x / y` as a 27-decimal ratio, rounding half up. The operands may carry
/// any (equal) number of decimals.
pub fn divide_precise_round(x: u128, y: u128) -> Result<u128, SynthError> {
    mul_div_round(x, PRECISE_UNIT, y)
}

/// Raise an 18-decimal value to an integer power by repeated squaring.
///
/// Each multiplication truncates, so the result matches a step-by-step
/// evaluation in the same precision rather than the exact real power.
pub fn pow_decimal(mut x: u128, mut n: u64) -> Result<u128, SynthError> {
    let mut result = UNIT;
    while n > 0 {
        if n % 2 != 0 {
            result = multiply_decimal(result, x)?;
        }
        n /= 2;
        if n > 0 {
            x = multiply_decimal(x, x)?;
        }
    }
    Ok(result)
}

/// Parse a human-readable decimal string ("1000", "0.5") into an amount.
pub fn parse_units(text: &str) -> Result<Amount, SynthError> {
    let text = text.trim();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(SynthError::InvalidParameter(format!(
            "'{}' is not a decimal amount",
            text
        )));
    }
    if frac.len() > DECIMALS as usize {
        return Err(SynthError::InvalidParameter(format!(
            "'{}' has more than {} decimal places",
            text, DECIMALS
        )));
    }
    let digits = |s: &str| -> Result<u128, SynthError> {
        if s.is_empty() {
            return Ok(0);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SynthError::InvalidParameter(format!(
                "'{}' is not a decimal amount",
                text
            )));
        }
        s.parse::<u128>()
            .map_err(|e| SynthError::InvalidParameter(format!("'{}': {}", text, e)))
    };

    let whole_units = digits(whole)?
        .checked_mul(UNIT)
        .ok_or_else(|| SynthError::Overflow(format!("'{}' is too large", text)))?;
    let scale = 10u128.pow(DECIMALS - frac.len() as u32);
    let frac_units = digits(frac)? * scale;
    whole_units
        .checked_add(frac_units)
        .ok_or_else(|| SynthError::Overflow(format!("'{}' is too large", text)))
}

/// Display wrapper rendering an 18-decimal amount in whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Units(pub Amount);

impl Units {
    /// Create from a whole number of units.
    pub fn whole(units: u64) -> Self {
        Self(units as u128 * UNIT)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNIT;
        let frac = self.0 % UNIT;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

/// Serde adapter storing an amount as a decimal string ("0.2", "1000").
///
/// TOML integers are 64-bit, so configuration and scenario files carry
/// 18-decimal amounts in this form.
pub mod as_units {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_units, Amount, Units};

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Units(*amount).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_units(&text).map_err(serde::de::Error::custom)
    }
}

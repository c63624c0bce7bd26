//! Decimal strings to fixed-point integers.
//!
//! Pipelines report decimals such as `"1834.25"`; reports carry integers.
//! [`parse_fixed_point`] scales a decimal by `10^decimals` and truncates any
//! remaining fractional digits toward zero. Exponent notation is accepted,
//! since large floats print that way.

use num_bigint::BigInt;

use crate::{Result, TypesError};

/// Largest power of ten a parse may scale by.
pub const MAX_SCALE: u32 = 4096;

/// Parse a base-10 decimal string into an integer scaled by `10^decimals`.
///
/// Accepts an optional leading sign, an optional fractional part and an
/// optional `e`/`E` exponent, as printed for large floats (`"6e18"`).
/// Digits below `10^-decimals` are dropped, which truncates toward zero for
/// both signs.
///
/// # Errors
///
/// Returns [`TypesError::InvalidDecimal`] if the text contains no digits, any
/// character other than digits, one `.`, a leading sign and one exponent, or
/// would scale by more than `10^MAX_SCALE`.
///
/// # Examples
///
/// ```
/// use feeds_types::fixed_point::parse_fixed_point;
/// use feeds_types::BigInt;
///
/// assert_eq!(parse_fixed_point("1.5", 2).unwrap(), BigInt::from(150));
/// assert_eq!(parse_fixed_point("-1.99", 0).unwrap(), BigInt::from(-1));
/// assert_eq!(parse_fixed_point("2.5e3", 0).unwrap(), BigInt::from(2500));
/// ```
pub fn parse_fixed_point(text: &str, decimals: u32) -> Result<BigInt> {
    let invalid = || TypesError::InvalidDecimal(text.to_string());

    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (digits, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((digits, exp)) => (digits, parse_exponent(exp).ok_or_else(invalid)?),
        None => (unsigned, 0),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    // value = mantissa * 10^shift
    let mantissa = [int_part, frac_part].concat();
    let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid())?;
    let shift = exponent
        .checked_add(i64::from(decimals))
        .and_then(|s| s.checked_sub(frac_len))
        .ok_or_else(invalid)?;

    let magnitude = if shift >= 0 {
        let scale = u32::try_from(shift)
            .ok()
            .filter(|s| *s <= MAX_SCALE)
            .ok_or_else(invalid)?;
        parse_digits(&mantissa).ok_or_else(invalid)? * BigInt::from(10).pow(scale)
    } else {
        let dropped = usize::try_from(shift.unsigned_abs()).unwrap_or(usize::MAX);
        let kept = mantissa.len().saturating_sub(dropped);
        parse_digits(&mantissa[..kept]).ok_or_else(invalid)?
    };

    Ok(if negative { -magnitude } else { magnitude })
}

/// Signed exponent digits; `None` if empty or out of range.
fn parse_exponent(text: &str) -> Option<i64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Unsigned base-10 digits; empty text is zero.
fn parse_digits(digits: &str) -> Option<BigInt> {
    if digits.is_empty() {
        return Some(BigInt::from(0));
    }
    BigInt::parse_bytes(digits.as_bytes(), 10)
}

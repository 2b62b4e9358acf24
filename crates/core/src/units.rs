//! Token unit conversion and exact arithmetic over base-unit amounts.
//!
//! One display unit (TAC) equals `10^18` base units (utac). Amounts are held
//! as arbitrary-precision unsigned integers and never pass through floating
//! point. Every function here is total: malformed input resolves to zero so
//! that an odd chain response cannot take down a whole calculation.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decimal places between base units and display units.
pub const TOKEN_DECIMALS: u32 = 18;

/// Fractional digits used for per-validator display strings.
pub const DEFAULT_PRECISION: usize = 6;

/// Fractional digits used for dashboard summary figures.
pub const SUMMARY_PRECISION: usize = 1;

/// Largest decimal exponent accepted from chain input.
const MAX_EXPONENT: u64 = 4096;

/// Scale applied to rates that have no canonical fraction.
const RATE_SCALE: u64 = 1_000_000;

const RATE_EPSILON: f64 = 1e-9;

/// Rates with an exact fraction, as `(rate, numerator, denominator)`.
const CANONICAL_RATES: &[(f64, u64, u64)] = &[
    (0.0, 0, 1),
    (0.1, 1, 10),
    (0.2, 1, 5),
    (0.5, 1, 2),
    (0.8, 4, 5),
    (0.9, 9, 10),
    (1.0, 1, 1),
];

// =============================================================================
// Amount
// =============================================================================

/// Non-negative token quantity in base units.
///
/// Serialized as a decimal digit string so that values beyond 64 bits
/// survive JSON round trips.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    /// The zero amount.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Exact subtraction, `None` if `other` exceeds `self`.
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 >= other.0 {
            Some(Self(&self.0 - &other.0))
        } else {
            None
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

/// Error returned by the strict [`FromStr`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError(String);

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid amount '{}': expected decimal digits", self.0)
    }
}

impl std::error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Strict parse: digits only. Use [`clean_to_integer`] for chain data.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseAmountError(s.to_string()));
        }
        s.parse::<BigUint>()
            .map(Self)
            .map_err(|_| ParseAmountError(s.to_string()))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Amount> for &'a Amount {
    type Output = Amount;

    fn add(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| &acc + a)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// Floor a non-negative decimal to an integer amount; zero otherwise.
fn truncate_decimal(decimal: &BigDecimal) -> Amount {
    let (mantissa, scale) = decimal.as_bigint_and_exponent();
    truncate_scaled(&mantissa, scale)
}

/// Floor `mantissa * 10^-scale`. Exponents past [`MAX_EXPONENT`] yield zero.
fn truncate_scaled(mantissa: &BigInt, scale: i64) -> Amount {
    let Some(mantissa) = mantissa.to_biguint() else {
        return Amount::zero();
    };

    if scale <= 0 {
        let exp = scale.unsigned_abs();
        if exp > MAX_EXPONENT {
            return Amount::zero();
        }
        return Amount(mantissa * pow10(exp as u32));
    }

    let scale = scale as u64;
    if scale > mantissa.to_string().len() as u64 {
        return Amount::zero();
    }
    Amount(mantissa / pow10(scale as u32))
}

/// Clean a raw chain amount to an integer amount.
///
/// Accepts plain integers, decimals (`"123.999"`) and scientific notation
/// (`"1.5e2"`). Fractional parts are truncated toward zero. Negative, empty
/// or otherwise malformed input yields zero.
pub fn clean_to_integer(raw: &str) -> Amount {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Amount::zero();
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<BigUint>().map(Amount).unwrap_or_default();
    }

    match BigDecimal::from_str(trimmed) {
        Ok(decimal) => truncate_decimal(&decimal),
        Err(_) => Amount::zero(),
    }
}

/// Exact addition of two raw amounts, cleaning both first.
pub fn add_exact(a: &str, b: &str) -> Amount {
    clean_to_integer(a) + clean_to_integer(b)
}

/// Exact fraction for a rate.
///
/// Canonical rates (0.8, 0.9, ...) map to small fractions; any other rate is
/// floored at six decimal places. Non-finite or negative rates yield zero.
pub fn rate_fraction(rate: f64) -> (u64, u64) {
    if !rate.is_finite() || rate <= 0.0 {
        return (0, 1);
    }

    if let Some(&(_, num, den)) = CANONICAL_RATES
        .iter()
        .find(|(canonical, _, _)| (canonical - rate).abs() < RATE_EPSILON)
    {
        return (num, den);
    }

    let scaled = (rate * RATE_SCALE as f64 + RATE_EPSILON).floor();
    (scaled as u64, RATE_SCALE)
}

/// `floor(amount * rate)` using integer arithmetic only.
pub fn percentage_of(amount: &Amount, rate: f64) -> Amount {
    let (num, den) = rate_fraction(rate);
    if num == 0 {
        return Amount::zero();
    }
    Amount(&amount.0 * BigUint::from(num) / BigUint::from(den))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a base-unit amount in display units.
///
/// The integer part is thousands-separated. At most `precision` fractional
/// digits are kept (truncated, never rounded), trailing zeros are trimmed
/// down to a single digit. Precision 0 prints the integer part only.
pub fn format_units(amount: &Amount, precision: usize) -> String {
    let divisor = pow10(TOKEN_DECIMALS);
    let whole = &amount.0 / &divisor;
    let frac = &amount.0 % &divisor;

    let whole = group_thousands(&whole.to_string());
    if precision == 0 {
        return whole;
    }

    let frac = format!(
        "{:0>width$}",
        frac.to_string(),
        width = TOKEN_DECIMALS as usize
    );
    let mut kept: String = frac
        .chars()
        .take(precision.min(TOKEN_DECIMALS as usize))
        .collect();
    while kept.len() > 1 && kept.ends_with('0') {
        kept.pop();
    }

    format!("{whole}.{kept}")
}

/// Convert a display amount (e.g. `"1,234.5"`) to base units.
///
/// Digits beyond the 18th fractional place are truncated. Malformed or
/// negative input yields zero.
pub fn to_base_units(display: &str) -> Amount {
    let cleaned: String = display
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let (whole, frac) = cleaned.split_once('.').unwrap_or((cleaned, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if is_digits(whole) && is_digits(frac) {
        if whole.is_empty() && frac.is_empty() {
            return Amount::zero();
        }
        let frac: String = frac.chars().take(TOKEN_DECIMALS as usize).collect();
        let digits = format!(
            "{whole}{frac:0<width$}",
            width = TOKEN_DECIMALS as usize
        );
        return digits.parse::<BigUint>().map(Amount).unwrap_or_default();
    }

    // Scientific notation and other decimal spellings.
    let Ok(decimal) = BigDecimal::from_str(cleaned) else {
        return Amount::zero();
    };
    let (mantissa, scale) = decimal.as_bigint_and_exponent();
    match scale.checked_sub(TOKEN_DECIMALS as i64) {
        Some(scale) => truncate_scaled(&mantissa, scale),
        None => Amount::zero(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    // -------------------------------------------------------------------------
    // Cleaning
    // -------------------------------------------------------------------------

    #[test]
    fn test_clean_plain_integer() {
        assert_eq!(clean_to_integer("123456789").to_string(), "123456789");
        assert_eq!(clean_to_integer("  42  ").to_string(), "42");
    }

    #[test]
    fn test_clean_truncates_decimals() {
        // Chain APIs return DecCoin amounts with 18 fractional digits.
        assert_eq!(
            clean_to_integer("1234.999999999999999999").to_string(),
            "1234"
        );
        assert_eq!(clean_to_integer("0.999").to_string(), "0");
    }

    #[test]
    fn test_clean_scientific_notation() {
        assert_eq!(clean_to_integer("1.5e2").to_string(), "150");
        assert_eq!(clean_to_integer("1.5E2").to_string(), "150");
        assert_eq!(clean_to_integer("1.5e-2").to_string(), "0");
        assert_eq!(clean_to_integer("2e20").to_string(), "200000000000000000000");
    }

    #[test]
    fn test_clean_malformed_is_zero() {
        for raw in ["", "abc", "12abc", "-5", "NaN", "1.2.3", "1e99999999"] {
            assert!(clean_to_integer(raw).is_zero(), "expected zero for {raw:?}");
        }
    }

    #[test]
    fn test_clean_beyond_u128() {
        let huge = "123456789012345678901234567890123456789012345678901234567890";
        assert_eq!(clean_to_integer(huge).to_string(), huge);
    }

    // -------------------------------------------------------------------------
    // Addition
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_exact_commutative_and_associative() {
        let a = "987654321098765432109876543210";
        let b = "123456789012345678901234567890.75";
        let c = "555555555555555555555555555555";

        assert_eq!(add_exact(a, b), add_exact(b, a));

        let left = add_exact(&add_exact(a, b).to_string(), c);
        let right = add_exact(a, &add_exact(b, c).to_string());
        assert_eq!(left, right);
        assert_eq!(left.to_string(), "1666666665666666666566666666655");
    }

    #[test]
    fn test_add_exact_identity() {
        let a = "340282366920938463463374607431768211456";
        assert_eq!(add_exact(a, "0").to_string(), a);
        assert_eq!(add_exact(a, "garbage").to_string(), a);
    }

    // -------------------------------------------------------------------------
    // Percentages
    // -------------------------------------------------------------------------

    #[test]
    fn test_rate_fraction_canonical() {
        assert_eq!(rate_fraction(0.8), (4, 5));
        assert_eq!(rate_fraction(0.9), (9, 10));
        assert_eq!(rate_fraction(1.0 - 0.8), (1, 5));
        assert_eq!(rate_fraction(-0.1), (0, 1));
        assert_eq!(rate_fraction(f64::NAN), (0, 1));
    }

    #[test]
    fn test_rate_fraction_arbitrary_floors_at_six_places() {
        assert_eq!(rate_fraction(0.123456789), (123456, 1_000_000));
        assert_eq!(rate_fraction(0.75), (750000, 1_000_000));
    }

    #[test]
    fn test_percentage_of_floors() {
        assert_eq!(percentage_of(&amt("999"), 0.8).to_string(), "799");
        assert_eq!(percentage_of(&amt("1000"), 0.9).to_string(), "900");
        assert_eq!(percentage_of(&amt("7"), 0.333333).to_string(), "2");
        assert!(percentage_of(&amt("1000"), 0.0).is_zero());
    }

    // -------------------------------------------------------------------------
    // Formatting
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_truncates_not_rounds() {
        assert_eq!(format_units(&amt("1999999999999999999"), 6), "1.999999");
    }

    #[test]
    fn test_format_summary_precision() {
        assert_eq!(format_units(&amt("720000000000000000000"), 1), "720.0");
        assert_eq!(format_units(&amt("180000000000000000000"), 1), "180.0");
        assert_eq!(format_units(&amt("180960000000000000000"), 1), "180.9");
    }

    #[test]
    fn test_format_thousands_and_trimming() {
        assert_eq!(
            format_units(&amt("1234567500000000000000000"), 6),
            "1,234,567.5"
        );
        assert_eq!(format_units(&Amount::zero(), 6), "0.0");
        assert_eq!(format_units(&amt("1"), 18), "0.000000000000000001");
        assert_eq!(format_units(&amt("1500000000000000000000"), 0), "1,500");
    }

    #[test]
    fn test_format_parse_round_trip() {
        for raw in [
            "0",
            "1",
            "1000000000000000000",
            "123456789012345678901234567890",
            "900000000000000000000",
        ] {
            let a = amt(raw);
            assert_eq!(to_base_units(&format_units(&a, 18)), a, "round trip {raw}");
        }
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units("1").to_string(), "1000000000000000000");
        assert_eq!(to_base_units("1,234.5").to_string(), "1234500000000000000000");
        assert_eq!(to_base_units(".5").to_string(), "500000000000000000");
        assert_eq!(to_base_units("1e2").to_string(), "100000000000000000000");
        assert_eq!(
            to_base_units("0.0000000000000000019").to_string(),
            "1"
        );
        assert!(to_base_units("-1").is_zero());
        assert!(to_base_units("TAC").is_zero());
    }

    #[test]
    fn test_to_base_units_extreme_exponents_are_zero() {
        assert!(to_base_units("1e9223372036854775800").is_zero());
        assert!(to_base_units("1e-9223372036854775800").is_zero());
        assert!(to_base_units("1e4096").is_zero());
        assert_eq!(to_base_units("2.5e-1").to_string(), "250000000000000000");
        assert_eq!(to_base_units("1e-18").to_string(), "1");
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let a = amt("900000000000000000000");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"900000000000000000000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<Amount>("\"1.5\"").is_err());
    }
}

//! Money representation and boundary conversion.
//!
//! All balances and transfer amounts are carried internally as `i64`
//! minor units (cents). Binary floating point never touches a balance.
//! The API boundary accepts and returns amounts as strings with at most
//! two decimal places; conversion rounds half-away-from-zero, matching
//! currency semantics.
//!
//! ## Usage
//! ```ignore
//! let amount = Amount::parse("100.00")?;
//! assert_eq!(amount.minor_units(), 10_000);
//! assert_eq!(amount.to_string(), "100.00");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("amount cannot be negative")]
    Negative,

    #[error("too many decimal places: {provided} (max {max})")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("amount too large, would overflow")]
    Overflow,
}

const SCALE: u32 = 2;
const MINOR_PER_UNIT: i64 = 100;

/// A currency amount in minor units (cents).
///
/// `Amount` is plain data; sign and range rules (non-negative balances,
/// positive transfer amounts) are enforced by the transaction engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_minor_units(minor: i64) -> Self {
        Amount(minor)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Convert a decimal to minor units, rounding half-away-from-zero
    /// to two decimal places. Negative amounts are rejected at the
    /// boundary; internal arithmetic never produces them.
    pub fn from_decimal(d: Decimal) -> Result<Self, MoneyError> {
        if d.is_sign_negative() && !d.is_zero() {
            return Err(MoneyError::Negative);
        }

        let rounded = d.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        let scaled = rounded
            .checked_mul(Decimal::from(MINOR_PER_UNIT))
            .ok_or(MoneyError::Overflow)?;

        // After rounding to 2 dp the scaled value must be integral.
        debug_assert!(scaled.fract().is_zero());
        scaled.to_i64().map(Amount).ok_or(MoneyError::Overflow)
    }

    /// Strict string parse for client input.
    ///
    /// Rejects `.5` (use `0.5`), `5.` (use `5.0`), scientific notation,
    /// an explicit `+` sign, negative values, and more than two decimal
    /// places. No silent truncation.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if s.starts_with('-') {
            return Err(MoneyError::Negative);
        }
        if s.starts_with('+') {
            return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
        }
        if s.contains('e') || s.contains('E') {
            return Err(MoneyError::InvalidFormat(
                "scientific notation not allowed".into(),
            ));
        }
        if s.starts_with('.') {
            return Err(MoneyError::InvalidFormat(
                "missing leading zero (use 0.5, not .5)".into(),
            ));
        }
        if s.ends_with('.') {
            return Err(MoneyError::InvalidFormat(
                "missing fractional part (use 5.0, not 5.)".into(),
            ));
        }
        if let Some(frac) = s.split('.').nth(1) {
            if frac.len() as u32 > SCALE {
                return Err(MoneyError::PrecisionOverflow {
                    provided: frac.len() as u32,
                    max: SCALE,
                });
            }
        }

        let d = Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;
        Self::from_decimal(d)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl std::fmt::Display for Amount {
    /// Always renders with exactly two decimal places: `"123.45"`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // String form preserves the 2-dp contract across JSON clients.
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        // Only JSON strings are accepted; numbers would bypass the
        // strict format checks.
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(Amount::parse("100.00").unwrap().minor_units(), 10_000);
        assert_eq!(Amount::parse("0.01").unwrap().minor_units(), 1);
        assert_eq!(Amount::parse("1.5").unwrap().minor_units(), 150);
        assert_eq!(Amount::parse("300").unwrap().minor_units(), 30_000);
        assert_eq!(Amount::parse("0").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_parse_rejects_bad_formats() {
        for case in [".5", "5.", "1.5e3", "+1.23", "", "1.2.3", "1,000.00"] {
            assert!(Amount::parse(case).is_err(), "should reject {:?}", case);
        }
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Amount::parse("-1.00"), Err(MoneyError::Negative));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert_eq!(
            Amount::parse("1.234"),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
    }

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        let d = Decimal::from_str("1.005").unwrap();
        assert_eq!(Amount::from_decimal(d).unwrap().minor_units(), 101);

        let d = Decimal::from_str("1.004").unwrap();
        assert_eq!(Amount::from_decimal(d).unwrap().minor_units(), 100);
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Amount::from_minor_units(10_000).to_string(), "100.00");
        assert_eq!(Amount::from_minor_units(1).to_string(), "0.01");
        assert_eq!(Amount::from_minor_units(-150).to_string(), "-1.50");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_serde_string_roundtrip() {
        let a = Amount::parse("42.10").unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#""42.10""#);
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn test_serde_rejects_json_number() {
        let result: Result<Amount, _> = serde_json::from_str("42.1");
        assert!(result.is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::from_minor_units(i64::MAX);
        assert!(a.checked_add(Amount::from_minor_units(1)).is_none());
        let b = Amount::from_minor_units(100);
        assert_eq!(
            b.checked_sub(Amount::from_minor_units(30)).unwrap(),
            Amount::from_minor_units(70)
        );
    }
}

//! Credit card data model and pure limit rules.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core_types::{AccountId, CardId};
use crate::error::BankError;
use crate::money::Amount;

pub const MIN_LIMIT_MINOR: i64 = 20_000; // 200.00
pub const MAX_LIMIT_MINOR: i64 = 1_500_000; // 15000.00

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreditCard {
    #[schema(value_type = String)]
    pub id: CardId,
    #[schema(value_type = String)]
    pub account_id: AccountId,
    pub name: String,
    pub card_number: String,
    /// `"MM/YY"`.
    pub expiry: String,
    #[serde(skip)]
    pub password_hash: String,
    #[schema(value_type = String)]
    pub limit: Amount,
    #[schema(value_type = String)]
    pub available: Amount,
    #[schema(value_type = String)]
    pub used: Amount,
    pub blocked: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// 16 random digits.
pub fn generate_card_number<R: Rng>(rng: &mut R) -> String {
    (0..16).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}

/// Random expiry 2 to 5 years out, formatted `MM/YY`.
pub fn generate_expiry<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> String {
    let month = rng.gen_range(1..=12u32);
    let year = now.year() + rng.gen_range(2..=5);
    format!("{:02}/{:02}", month, year % 100)
}

/// Random initial limit in [200.00, 15000.00].
pub fn generate_limit<R: Rng>(rng: &mut R) -> Amount {
    Amount::from_minor_units(rng.gen_range(MIN_LIMIT_MINOR..=MAX_LIMIT_MINOR))
}

/// Check that a requested available amount respects `used <= available
/// <= limit`.
pub fn validate_adjust(card: &CreditCard, new_available: Amount) -> Result<(), BankError> {
    if new_available < card.used {
        return Err(BankError::LimitViolation(
            "available cannot drop below the amount already used",
        ));
    }
    if new_available > card.limit {
        return Err(BankError::LimitViolation(
            "available cannot exceed the card limit",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(limit: i64, available: i64, used: i64) -> CreditCard {
        CreditCard {
            id: CardId::new(),
            account_id: AccountId::new(),
            name: "Maria S".into(),
            card_number: "1234567890123456".into(),
            expiry: "01/30".into(),
            password_hash: String::new(),
            limit: Amount::from_minor_units(limit),
            available: Amount::from_minor_units(available),
            used: Amount::from_minor_units(used),
            blocked: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_card_number_is_16_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let n = generate_card_number(&mut rng);
            assert_eq!(n.len(), 16);
            assert!(n.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_expiry_shape_and_window() {
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        for _ in 0..100 {
            let e = generate_expiry(&mut rng, now);
            let (m, y) = e.split_once('/').expect("has a slash");
            let m: u32 = m.parse().expect("month");
            let y: i32 = y.parse().expect("year");
            assert!((1..=12).contains(&m));
            let full_year = 2000 + y;
            assert!(full_year >= now.year() + 2 && full_year <= now.year() + 5);
        }
    }

    #[test]
    fn test_limit_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let l = generate_limit(&mut rng);
            assert!(l >= Amount::from_minor_units(MIN_LIMIT_MINOR));
            assert!(l <= Amount::from_minor_units(MAX_LIMIT_MINOR));
        }
    }

    #[test]
    fn test_adjust_below_used_rejected() {
        let c = card(100_000, 50_000, 40_000);
        let err = validate_adjust(&c, Amount::from_minor_units(30_000)).unwrap_err();
        assert!(matches!(err, BankError::LimitViolation(_)));
    }

    #[test]
    fn test_adjust_above_limit_rejected() {
        let c = card(100_000, 50_000, 0);
        let err = validate_adjust(&c, Amount::from_minor_units(100_001)).unwrap_err();
        assert!(matches!(err, BankError::LimitViolation(_)));
    }

    #[test]
    fn test_adjust_within_bounds_accepted() {
        let c = card(100_000, 50_000, 40_000);
        assert!(validate_adjust(&c, Amount::from_minor_units(40_000)).is_ok());
        assert!(validate_adjust(&c, Amount::from_minor_units(100_000)).is_ok());
    }
}

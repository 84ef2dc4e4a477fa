//! Data models for users and accounts.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::core_types::UserId;

/// Registered user. Immutable after creation except phone and password.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Human-facing account number: five digits, a dash, one check digit,
/// e.g. `"48213-7"`.
pub fn generate_account_number<R: Rng>(rng: &mut R) -> String {
    let body: u32 = rng.gen_range(10_000..100_000);
    let digit: u32 = rng.gen_range(0..10);
    format!("{}-{}", body, digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_number_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let n = generate_account_number(&mut rng);
            let (body, digit) = n.split_once('-').expect("has a dash");
            assert_eq!(body.len(), 5);
            assert_eq!(digit.len(), 1);
            assert!(body.chars().all(|c| c.is_ascii_digit()));
            assert!(digit.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

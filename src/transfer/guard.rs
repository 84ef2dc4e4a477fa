//! Transfer authorization guard.
//!
//! Every balance-debiting operation passes through [`authorize`] before
//! any funds move: the caller must own the source account and must
//! supply the correct transfer password. "No password set" is surfaced
//! distinctly from "wrong password" so clients can prompt for setup
//! instead of retry.

use crate::auth::password;
use crate::error::BankError;
use crate::core_types::UserId;
use crate::store::AccountRow;

/// Ownership check alone, for operations that read but do not debit.
pub fn ensure_owner(account: &AccountRow, caller: UserId) -> Result<(), BankError> {
    if account.user_id != caller {
        return Err(BankError::Forbidden);
    }
    Ok(())
}

/// Full guard: ownership, password presence, password match.
pub fn authorize(account: &AccountRow, caller: UserId, supplied: &str) -> Result<(), BankError> {
    ensure_owner(account, caller)?;

    let stored = account
        .transfer_password_hash
        .as_deref()
        .ok_or(BankError::TransferPasswordNotSet)?;

    if !password::verify(supplied, stored) {
        return Err(BankError::TransferPasswordIncorrect);
    }
    Ok(())
}

/// Validate a password change against the stored hash.
///
/// Both the old-password check and the new-equals-old rejection go
/// through the opaque hash comparison, never plaintext equality.
pub fn validate_password_change(
    account: &AccountRow,
    caller: UserId,
    old_password: &str,
    new_password: &str,
) -> Result<(), BankError> {
    ensure_owner(account, caller)?;

    let stored = account
        .transfer_password_hash
        .as_deref()
        .ok_or(BankError::TransferPasswordNotSet)?;

    if !password::verify(old_password, stored) {
        return Err(BankError::TransferPasswordIncorrect);
    }
    if password::verify(new_password, stored) {
        return Err(BankError::Conflict);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::AccountId;
    use crate::money::Amount;

    fn account(owner: UserId, password: Option<&str>) -> AccountRow {
        AccountRow {
            id: AccountId::new(),
            user_id: owner,
            account_number: "12345-6".into(),
            balance: Amount::from_minor_units(30_000),
            transfer_password_hash: password.map(|p| password::hash(p).unwrap()),
        }
    }

    #[test]
    fn test_authorize_happy_path() {
        let owner = UserId::new();
        let acc = account(owner, Some("4321"));
        assert!(authorize(&acc, owner, "4321").is_ok());
    }

    #[test]
    fn test_authorize_rejects_non_owner() {
        let acc = account(UserId::new(), Some("4321"));
        let err = authorize(&acc, UserId::new(), "4321").unwrap_err();
        assert!(matches!(err, BankError::Forbidden));
    }

    #[test]
    fn test_no_password_set_is_distinct_from_wrong_password() {
        let owner = UserId::new();

        let unset = account(owner, None);
        assert!(matches!(
            authorize(&unset, owner, "4321").unwrap_err(),
            BankError::TransferPasswordNotSet
        ));

        let set = account(owner, Some("4321"));
        assert!(matches!(
            authorize(&set, owner, "9999").unwrap_err(),
            BankError::TransferPasswordIncorrect
        ));
    }

    #[test]
    fn test_change_requires_existing_password() {
        let owner = UserId::new();
        let acc = account(owner, None);
        assert!(matches!(
            validate_password_change(&acc, owner, "old", "new").unwrap_err(),
            BankError::TransferPasswordNotSet
        ));
    }

    #[test]
    fn test_change_rejects_wrong_old_password() {
        let owner = UserId::new();
        let acc = account(owner, Some("4321"));
        assert!(matches!(
            validate_password_change(&acc, owner, "wrong", "new").unwrap_err(),
            BankError::TransferPasswordIncorrect
        ));
    }

    #[test]
    fn test_change_rejects_new_equal_to_old() {
        let owner = UserId::new();
        let acc = account(owner, Some("4321"));
        assert!(matches!(
            validate_password_change(&acc, owner, "4321", "4321").unwrap_err(),
            BankError::Conflict
        ));
    }

    #[test]
    fn test_change_accepts_different_new_password() {
        let owner = UserId::new();
        let acc = account(owner, Some("4321"));
        assert!(validate_password_change(&acc, owner, "4321", "8765").is_ok());
    }
}

//! Request-level transfer operations: guard first, then engine.

use std::sync::Arc;

use crate::auth::password;
use crate::core_types::{AccountId, UserId};
use crate::error::BankError;
use crate::money::Amount;
use crate::store::{AccountRow, Ledger, PostingCategory};

use super::engine::{TransferEngine, TransferOutcome};
use super::guard;

#[derive(Clone)]
pub struct TransferService {
    ledger: Arc<dyn Ledger>,
    engine: TransferEngine,
}

impl TransferService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        let engine = TransferEngine::new(ledger.clone());
        Self { ledger, engine }
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    async fn account_by_number(&self, number: &str) -> Result<AccountRow, BankError> {
        self.ledger
            .account_by_number(number)
            .await?
            .ok_or(BankError::NotFound("account"))
    }

    /// Set the transfer password. No old password needed; this also
    /// covers the first-time setup after registration.
    pub async fn set_transfer_password(
        &self,
        account_number: &str,
        caller: UserId,
        new_password: &str,
    ) -> Result<(), BankError> {
        let account = self.account_by_number(account_number).await?;
        guard::ensure_owner(&account, caller)?;

        let hash = password::hash(new_password)?;
        self.ledger
            .set_transfer_password_hash(account.id, &hash)
            .await?;
        tracing::info!(account = %account.id, "transfer password set");
        Ok(())
    }

    /// Change an existing transfer password. Fails if none is set, if
    /// the old password does not verify, or if the new one equals the
    /// old.
    pub async fn change_transfer_password(
        &self,
        account_number: &str,
        caller: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), BankError> {
        let account = self.account_by_number(account_number).await?;
        guard::validate_password_change(&account, caller, old_password, new_password)?;

        let hash = password::hash(new_password)?;
        self.ledger
            .set_transfer_password_hash(account.id, &hash)
            .await?;
        tracing::info!(account = %account.id, "transfer password changed");
        Ok(())
    }

    /// Whether a transfer password is set on the account.
    pub async fn transfer_password_status(
        &self,
        account_number: &str,
        caller: UserId,
    ) -> Result<bool, BankError> {
        let account = self.account_by_number(account_number).await?;
        guard::ensure_owner(&account, caller)?;
        Ok(account.transfer_password_hash.is_some())
    }

    /// Direct transfer between two accounts addressed by number.
    pub async fn transfer(
        &self,
        from_number: &str,
        to_number: &str,
        transfer_password: &str,
        amount: Amount,
        caller: UserId,
    ) -> Result<TransferOutcome, BankError> {
        let source = self.account_by_number(from_number).await?;
        let dest = self.account_by_number(to_number).await?;

        guard::authorize(&source, caller, transfer_password)?;

        self.engine
            .move_funds(source.id, dest.id, amount, PostingCategory::Internal)
            .await
    }

    /// Guarded transfer to an already-resolved destination account.
    /// Used by the PIX-key path after directory lookup.
    pub async fn transfer_to_account(
        &self,
        source: AccountId,
        dest: AccountId,
        transfer_password: &str,
        amount: Amount,
        caller: UserId,
        category: PostingCategory,
    ) -> Result<TransferOutcome, BankError> {
        let account = self
            .ledger
            .account_by_id(source)
            .await?
            .ok_or(BankError::NotFound("account"))?;

        guard::authorize(&account, caller, transfer_password)?;

        self.engine.move_funds(source, dest, amount, category).await
    }

    /// Phone recharge: guarded one-sided debit.
    pub async fn recharge(
        &self,
        account_id: AccountId,
        phone: &str,
        transfer_password: &str,
        amount: Amount,
        caller: UserId,
    ) -> Result<Amount, BankError> {
        let account = self
            .ledger
            .account_by_id(account_id)
            .await?
            .ok_or(BankError::NotFound("account"))?;

        guard::authorize(&account, caller, transfer_password)?;

        self.engine.recharge(account.id, amount, phone).await
    }
}

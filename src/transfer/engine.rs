//! The atomic money-movement primitive.
//!
//! `TransferEngine` is the sole path through which balances change.
//! Direct transfers, PIX-key transfers and QR payments all funnel into
//! the same debit/credit sequence; phone recharge is the one-sided
//! variant. Every invocation runs inside a single [`LedgerTx`]: the
//! locked reads, the validation, both balance writes and both history
//! postings commit together or not at all.
//!
//! The two account rows are always locked in ascending id order, so two
//! concurrent transfers between the same pair of accounts in opposite
//! directions cannot deadlock.

use std::sync::Arc;

use crate::core_types::AccountId;
use crate::error::BankError;
use crate::money::Amount;
use crate::store::{
    AccountRow, Ledger, LedgerTx, NewPosting, PostingCategory, PostingDirection, QrStatus,
};

/// Result of a completed movement, with post-commit balances.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub source_account: AccountId,
    pub dest_account: AccountId,
    pub amount: Amount,
    pub source_balance: Amount,
    pub dest_balance: Amount,
}

#[derive(Clone)]
pub struct TransferEngine {
    ledger: Arc<dyn Ledger>,
}

impl TransferEngine {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Move `amount` from `source` to `dest` atomically.
    pub async fn move_funds(
        &self,
        source: AccountId,
        dest: AccountId,
        amount: Amount,
        category: PostingCategory,
    ) -> Result<TransferOutcome, BankError> {
        let mut tx = self.ledger.begin().await?;
        let outcome = debit_credit(tx.as_mut(), source, dest, amount, category).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Consume a pending QR payment request and move its bound amount.
    ///
    /// The QR row is locked first, so a second payment attempt blocks
    /// until the first commits and then observes `used`. Expiry is
    /// evaluated here, lazily; an expired QR aborts the scope with no
    /// writes.
    pub async fn pay_qr(
        &self,
        source: AccountId,
        payload: &str,
    ) -> Result<TransferOutcome, BankError> {
        let mut tx = self.ledger.begin().await?;

        let qr = tx
            .qr_for_update(payload)
            .await?
            .ok_or(BankError::NotFound("qr code"))?;

        match qr.status {
            QrStatus::Pending => {}
            QrStatus::Expired => return Err(BankError::Expired),
            // Already consumed: the caller lost the race with an
            // earlier payment.
            QrStatus::Used => return Err(BankError::Conflict),
        }
        if qr.is_expired_at(chrono::Utc::now()) {
            return Err(BankError::Expired);
        }

        let outcome =
            debit_credit(tx.as_mut(), source, qr.account_id, qr.amount, PostingCategory::Qr)
                .await?;
        tx.set_qr_status(qr.id, QrStatus::Used).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// One-sided debit (phone recharge). Same fund-sufficiency check
    /// and atomic scope, a single debit posting, no counterparty
    /// credit. Returns the new balance.
    pub async fn recharge(
        &self,
        source: AccountId,
        amount: Amount,
        phone: &str,
    ) -> Result<Amount, BankError> {
        if !amount.is_positive() {
            return Err(BankError::InvalidAmount);
        }

        let mut tx = self.ledger.begin().await?;
        let account = tx
            .account_for_update(source)
            .await?
            .ok_or(BankError::NotFound("account"))?;

        if account.balance < amount {
            return Err(BankError::InsufficientFunds);
        }
        let new_balance = account
            .balance
            .checked_sub(amount)
            .ok_or(BankError::Internal)?;

        tx.set_balance(source, new_balance).await?;
        tx.insert_posting(NewPosting {
            account_id: source,
            counterparty: format!("Recarga {}", phone),
            amount,
            category: PostingCategory::Recharge,
            direction: PostingDirection::Debit,
        })
        .await?;
        tx.commit().await?;

        tracing::info!(account = %source, amount = %amount, "recharge debited");
        Ok(new_balance)
    }
}

/// The core check-then-mutate sequence, inside the caller's scope.
async fn debit_credit(
    tx: &mut dyn LedgerTx,
    source: AccountId,
    dest: AccountId,
    amount: Amount,
    category: PostingCategory,
) -> Result<TransferOutcome, BankError> {
    if source == dest {
        return Err(BankError::SameAccount);
    }
    if !amount.is_positive() {
        return Err(BankError::InvalidAmount);
    }

    // Deterministic lock order by account id.
    let (first, second) = if source <= dest {
        (source, dest)
    } else {
        (dest, source)
    };
    let first_row = tx
        .account_for_update(first)
        .await?
        .ok_or(BankError::NotFound("account"))?;
    let second_row = tx
        .account_for_update(second)
        .await?
        .ok_or(BankError::NotFound("account"))?;
    let (source_row, dest_row) = if first == source {
        (first_row, second_row)
    } else {
        (second_row, first_row)
    };

    if source_row.balance < amount {
        return Err(BankError::InsufficientFunds);
    }
    let source_balance = source_row
        .balance
        .checked_sub(amount)
        .ok_or(BankError::Internal)?;
    let dest_balance = dest_row
        .balance
        .checked_add(amount)
        .ok_or(BankError::Internal)?;

    tx.set_balance(source, source_balance).await?;
    tx.set_balance(dest, dest_balance).await?;

    let source_name = display_name(tx, &source_row).await?;
    let dest_name = display_name(tx, &dest_row).await?;

    tx.insert_posting(NewPosting {
        account_id: source,
        counterparty: dest_name,
        amount,
        category,
        direction: PostingDirection::Debit,
    })
    .await?;
    tx.insert_posting(NewPosting {
        account_id: dest,
        counterparty: source_name,
        amount,
        category,
        direction: PostingDirection::Credit,
    })
    .await?;

    tracing::info!(
        source = %source,
        dest = %dest,
        amount = %amount,
        category = category.as_str(),
        "funds moved"
    );

    Ok(TransferOutcome {
        source_account: source,
        dest_account: dest,
        amount,
        source_balance,
        dest_balance,
    })
}

async fn display_name(
    tx: &mut dyn LedgerTx,
    account: &AccountRow,
) -> Result<String, BankError> {
    Ok(tx
        .owner_name(account.user_id)
        .await?
        .unwrap_or_else(|| account.account_number.clone()))
}

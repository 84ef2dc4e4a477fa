//! In-memory ledger store.
//!
//! Backs the integration tests and lets the transaction engine run
//! without PostgreSQL. A transaction holds the store-wide lock for its
//! whole scope and buffers writes; commit applies the buffer, dropping
//! the transaction discards it. That gives the same observable
//! semantics as the row-locked SQL store: serialized check-then-mutate,
//! nothing partial ever visible.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    AccountRow, Ledger, LedgerTx, NewPosting, PostingRow, QrRow, QrStatus, StoreError,
};
use crate::core_types::{AccountId, PostingId, QrId, UserId};
use crate::money::Amount;

#[derive(Default)]
struct MemState {
    users: HashMap<UserId, String>,
    accounts: HashMap<AccountId, AccountRow>,
    qrs: HashMap<QrId, QrRow>,
    postings: Vec<PostingRow>,
    fail_on_posting: bool,
}

#[derive(Clone, Default)]
pub struct MemLedger {
    state: Arc<Mutex<MemState>>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, id: UserId, name: &str) {
        self.state.lock().await.users.insert(id, name.to_string());
    }

    pub async fn insert_account(&self, account: AccountRow) {
        self.state.lock().await.accounts.insert(account.id, account);
    }

    pub async fn insert_qr(&self, qr: QrRow) {
        self.state.lock().await.qrs.insert(qr.id, qr);
    }

    pub async fn account(&self, id: AccountId) -> Option<AccountRow> {
        self.state.lock().await.accounts.get(&id).cloned()
    }

    pub async fn qr(&self, id: QrId) -> Option<QrRow> {
        self.state.lock().await.qrs.get(&id).cloned()
    }

    pub async fn postings_for(&self, account: AccountId) -> Vec<PostingRow> {
        self.state
            .lock()
            .await
            .postings
            .iter()
            .filter(|p| p.account_id == account)
            .cloned()
            .collect()
    }

    /// Make the next posting insert fail, to exercise mid-transaction
    /// abort paths.
    pub async fn set_fail_on_posting(&self, fail: bool) {
        self.state.lock().await.fail_on_posting = fail;
    }
}

#[async_trait]
impl Ledger for MemLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(MemLedgerTx {
            state: guard,
            balances: Vec::new(),
            postings: Vec::new(),
            qr_updates: Vec::new(),
        }))
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<AccountRow>, StoreError> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn account_by_number(&self, number: &str) -> Result<Option<AccountRow>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .accounts
            .values()
            .find(|a| a.account_number == number)
            .cloned())
    }

    async fn set_transfer_password_hash(
        &self,
        id: AccountId,
        hash: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(account) = state.accounts.get_mut(&id) {
            account.transfer_password_hash = Some(hash.to_string());
        }
        Ok(())
    }
}

struct MemLedgerTx {
    state: OwnedMutexGuard<MemState>,
    balances: Vec<(AccountId, Amount)>,
    postings: Vec<NewPosting>,
    qr_updates: Vec<(QrId, QrStatus)>,
}

#[async_trait]
impl LedgerTx for MemLedgerTx {
    async fn account_for_update(
        &mut self,
        id: AccountId,
    ) -> Result<Option<AccountRow>, StoreError> {
        let mut row = match self.state.accounts.get(&id) {
            Some(r) => r.clone(),
            None => return Ok(None),
        };
        // Overlay writes buffered earlier in this transaction.
        if let Some((_, balance)) = self.balances.iter().rev().find(|(a, _)| *a == id) {
            row.balance = *balance;
        }
        Ok(Some(row))
    }

    async fn set_balance(&mut self, id: AccountId, balance: Amount) -> Result<(), StoreError> {
        self.balances.push((id, balance));
        Ok(())
    }

    async fn insert_posting(&mut self, posting: NewPosting) -> Result<(), StoreError> {
        if self.state.fail_on_posting {
            return Err(StoreError::Injected("posting insert failure"));
        }
        self.postings.push(posting);
        Ok(())
    }

    async fn owner_name(&mut self, user: UserId) -> Result<Option<String>, StoreError> {
        Ok(self.state.users.get(&user).cloned())
    }

    async fn qr_for_update(&mut self, payload: &str) -> Result<Option<QrRow>, StoreError> {
        let mut row = match self.state.qrs.values().find(|q| q.payload == payload) {
            Some(r) => r.clone(),
            None => return Ok(None),
        };
        if let Some((_, status)) = self.qr_updates.iter().rev().find(|(id, _)| *id == row.id) {
            row.status = *status;
        }
        Ok(Some(row))
    }

    async fn set_qr_status(&mut self, id: QrId, status: QrStatus) -> Result<(), StoreError> {
        self.qr_updates.push((id, status));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        for (id, balance) in self.balances.drain(..) {
            if let Some(account) = self.state.accounts.get_mut(&id) {
                account.balance = balance;
            }
        }
        let now = Utc::now();
        for p in self.postings.drain(..) {
            self.state.postings.push(PostingRow {
                id: PostingId::new(),
                account_id: p.account_id,
                counterparty: p.counterparty,
                posted_at: now,
                amount: p.amount,
                category: p.category,
                direction: p.direction,
            });
        }
        for (id, status) in self.qr_updates.drain(..) {
            if let Some(qr) = self.state.qrs.get_mut(&id) {
                qr.status = status;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: i64) -> AccountRow {
        AccountRow {
            id: AccountId::new(),
            user_id: UserId::new(),
            account_number: "12345-6".into(),
            balance: Amount::from_minor_units(balance),
            transfer_password_hash: None,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let ledger = MemLedger::new();
        let a = account(10_000);
        let id = a.id;
        ledger.insert_account(a).await;

        {
            let mut tx = ledger.begin().await.unwrap();
            tx.set_balance(id, Amount::from_minor_units(1)).await.unwrap();
            // dropped without commit
        }

        let after = ledger.account(id).await.unwrap();
        assert_eq!(after.balance.minor_units(), 10_000);
    }

    #[tokio::test]
    async fn test_commit_applies_buffered_writes() {
        let ledger = MemLedger::new();
        let a = account(10_000);
        let id = a.id;
        ledger.insert_account(a).await;

        let mut tx = ledger.begin().await.unwrap();
        tx.set_balance(id, Amount::from_minor_units(5_000))
            .await
            .unwrap();
        // A re-read inside the same scope sees the buffered write.
        let seen = tx.account_for_update(id).await.unwrap().unwrap();
        assert_eq!(seen.balance.minor_units(), 5_000);
        tx.commit().await.unwrap();

        let after = ledger.account(id).await.unwrap();
        assert_eq!(after.balance.minor_units(), 5_000);
    }
}

//! PostgreSQL ledger store.
//!
//! `PgLedgerTx` wraps one sqlx transaction; `account_for_update` and
//! `qr_for_update` take row-level exclusive locks with
//! `SELECT ... FOR UPDATE`, so two in-flight transfers can never read
//! the same stale balance.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use std::time::Duration;

use super::{
    AccountRow, Ledger, LedgerTx, NewPosting, QrRow, QrStatus, StoreError,
};
use crate::core_types::{AccountId, PostingId, QrId, UserId};
use crate::money::Amount;

/// Create the shared connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    tracing::info!("PostgreSQL connection pool established");
    Ok(pool)
}

fn account_from_row(r: &PgRow) -> AccountRow {
    AccountRow {
        id: r.get("id"),
        user_id: r.get("user_id"),
        account_number: r.get("account_number"),
        balance: r.get("balance"),
        transfer_password_hash: r.get("transfer_password_hash"),
    }
}

fn qr_from_row(r: &PgRow) -> Result<QrRow, StoreError> {
    let status: String = r.get("status");
    let status = QrStatus::parse(&status)
        .ok_or_else(|| StoreError::Conflict(format!("unknown qr status: {}", status)))?;
    Ok(QrRow {
        id: r.get("id"),
        account_id: r.get("account_id"),
        key_value: r.get("key_value"),
        amount: r.get("amount"),
        txid: r.get("txid"),
        payload: r.get("payload"),
        expires_at: r.get("expires_at"),
        status,
    })
}

const ACCOUNT_COLS: &str = "id, user_id, account_number, balance, transfer_password_hash";
const QR_COLS: &str = "id, account_id, key_value, amount, txid, payload, expires_at, status";

pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<AccountRow>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn account_by_number(&self, number: &str) -> Result<Option<AccountRow>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE account_number = $1",
            ACCOUNT_COLS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn set_transfer_password_hash(
        &self,
        id: AccountId,
        hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET transfer_password_hash = $1 WHERE id = $2")
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn account_for_update(
        &mut self,
        id: AccountId,
    ) -> Result<Option<AccountRow>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1 FOR UPDATE",
            ACCOUNT_COLS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn set_balance(&mut self, id: AccountId, balance: Amount) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_posting(&mut self, posting: NewPosting) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO transfers (id, account_id, counterparty, amount, category, direction)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(PostingId::new())
        .bind(posting.account_id)
        .bind(&posting.counterparty)
        .bind(posting.amount)
        .bind(posting.category.as_str())
        .bind(posting.direction.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn owner_name(&mut self, user: UserId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT name FROM users WHERE id = $1")
            .bind(user)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(|r| r.get("name")))
    }

    async fn qr_for_update(&mut self, payload: &str) -> Result<Option<QrRow>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM pix_qrs WHERE payload = $1 FOR UPDATE",
            QR_COLS
        ))
        .bind(payload)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(qr_from_row).transpose()
    }

    async fn set_qr_status(&mut self, id: QrId, status: QrStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE pix_qrs SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

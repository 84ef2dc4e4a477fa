//! Ledger store abstraction.
//!
//! The transaction engine is the sole writer of balances and it only
//! talks to these traits, never to a concrete database. A [`LedgerTx`]
//! is one atomic scope: every read inside it sees row state under
//! write-intent locks, and nothing it writes is observable until
//! [`LedgerTx::commit`]. Dropping a transaction without committing
//! rolls everything back.
//!
//! Two implementations exist: [`postgres::PgLedger`] (sqlx transaction
//! with `SELECT ... FOR UPDATE`) and [`memory::MemLedger`] (in-process,
//! used by the integration tests).

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core_types::{AccountId, PostingId, QrId, UserId};
use crate::money::Amount;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("lock conflict: {0}")]
    Conflict(String),

    #[error("injected failure: {0}")]
    Injected(&'static str),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if let Some(code) = db.code() {
                // serialization_failure / deadlock_detected / lock_not_available
                if code == "40001" || code == "40P01" || code == "55P03" {
                    return StoreError::Conflict(code.into_owned());
                }
            }
        }
        StoreError::Database(e)
    }
}

/// Persisted account state as seen by the transfer core.
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: AccountId,
    pub user_id: UserId,
    pub account_number: String,
    pub balance: Amount,
    pub transfer_password_hash: Option<String>,
}

/// PIX QR lifecycle: `pending` is the only state a payment can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrStatus {
    Pending,
    Used,
    Expired,
}

impl QrStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QrStatus::Pending => "pending",
            QrStatus::Used => "used",
            QrStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QrStatus::Pending),
            "used" => Some(QrStatus::Used),
            "expired" => Some(QrStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QrRow {
    pub id: QrId,
    pub account_id: AccountId,
    pub key_value: String,
    pub amount: Amount,
    pub txid: String,
    pub payload: String,
    pub expires_at: DateTime<Utc>,
    pub status: QrStatus,
}

impl QrRow {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Movement category recorded on each posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingCategory {
    Internal,
    Pix,
    Qr,
    Recharge,
}

impl PostingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PostingCategory::Internal => "internal",
            PostingCategory::Pix => "pix",
            PostingCategory::Qr => "qr",
            PostingCategory::Recharge => "recharge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internal" => Some(PostingCategory::Internal),
            "pix" => Some(PostingCategory::Pix),
            "qr" => Some(PostingCategory::Qr),
            "recharge" => Some(PostingCategory::Recharge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingDirection {
    Debit,
    Credit,
}

impl PostingDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PostingDirection::Debit => "debit",
            PostingDirection::Credit => "credit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debit" => Some(PostingDirection::Debit),
            "credit" => Some(PostingDirection::Credit),
            _ => None,
        }
    }
}

/// One side of a movement, to be appended to the history ledger.
#[derive(Debug, Clone)]
pub struct NewPosting {
    pub account_id: AccountId,
    pub counterparty: String,
    pub amount: Amount,
    pub category: PostingCategory,
    pub direction: PostingDirection,
}

/// A committed history-ledger row. Append-only, never mutated.
#[derive(Debug, Clone)]
pub struct PostingRow {
    pub id: PostingId,
    pub account_id: AccountId,
    pub counterparty: String,
    pub posted_at: DateTime<Utc>,
    pub amount: Amount,
    pub category: PostingCategory,
    pub direction: PostingDirection,
}

/// One atomic read-validate-write scope over the ledger.
#[async_trait]
pub trait LedgerTx: Send {
    /// Load an account with write intent. The row stays locked until
    /// commit or rollback.
    async fn account_for_update(&mut self, id: AccountId)
    -> Result<Option<AccountRow>, StoreError>;

    async fn set_balance(&mut self, id: AccountId, balance: Amount) -> Result<(), StoreError>;

    async fn insert_posting(&mut self, posting: NewPosting) -> Result<(), StoreError>;

    /// Display name of an account's owning user, for counterparty
    /// resolution on postings.
    async fn owner_name(&mut self, user: UserId) -> Result<Option<String>, StoreError>;

    /// Load a QR payment request with write intent, keyed by payload.
    async fn qr_for_update(&mut self, payload: &str) -> Result<Option<QrRow>, StoreError>;

    async fn set_qr_status(&mut self, id: QrId, status: QrStatus) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Entry point to the ledger store.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;

    // Unlocked point reads used outside the transfer scope.
    async fn account_by_id(&self, id: AccountId) -> Result<Option<AccountRow>, StoreError>;
    async fn account_by_number(&self, number: &str) -> Result<Option<AccountRow>, StoreError>;

    /// Persist a new transfer-password hash for an account.
    async fn set_transfer_password_hash(
        &self,
        id: AccountId,
        hash: &str,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_status_roundtrip() {
        for s in [QrStatus::Pending, QrStatus::Used, QrStatus::Expired] {
            assert_eq!(QrStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(QrStatus::parse("bogus"), None);
    }

    #[test]
    fn test_posting_enums_roundtrip() {
        for c in [
            PostingCategory::Internal,
            PostingCategory::Pix,
            PostingCategory::Qr,
            PostingCategory::Recharge,
        ] {
            assert_eq!(PostingCategory::parse(c.as_str()), Some(c));
        }
        for d in [PostingDirection::Debit, PostingDirection::Credit] {
            assert_eq!(PostingDirection::parse(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_qr_expiry_boundary() {
        let now = Utc::now();
        let qr = QrRow {
            id: QrId::new(),
            account_id: AccountId::new(),
            key_value: "k".into(),
            amount: Amount::from_minor_units(100),
            txid: "t".into(),
            payload: "p".into(),
            expires_at: now,
            status: QrStatus::Pending,
        };
        assert!(qr.is_expired_at(now));
        assert!(!qr.is_expired_at(now - chrono::Duration::seconds(1)));
    }
}

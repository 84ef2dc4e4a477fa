//! QR payment requests: creation, lookup, removal, payment.
//!
//! A QR is born `pending` and leaves that state exactly once: `used`
//! when a payment consumes it, or `expired` once its deadline passes.
//! Expiry is lazy; nothing scans for stale rows. Whoever observes a
//! pending QR past its deadline flips it.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::payload::build_payload;
use super::repository::{PixKeyRepository, PixQrRepository};
use crate::account::UserRepository;
use crate::core_types::{AccountId, QrId, UserId};
use crate::error::BankError;
use crate::money::Amount;
use crate::store::{Ledger, QrRow, QrStatus};
use crate::transfer::engine::{TransferEngine, TransferOutcome};
use crate::transfer::guard;

const MERCHANT_CITY: &str = "SAO PAULO";
const MAX_TXID_LEN: usize = 25;

#[derive(Clone)]
pub struct PixQrService {
    pool: PgPool,
    ledger: Arc<dyn Ledger>,
    engine: TransferEngine,
}

impl PixQrService {
    pub fn new(pool: PgPool, ledger: Arc<dyn Ledger>) -> Self {
        let engine = TransferEngine::new(ledger.clone());
        Self {
            pool,
            ledger,
            engine,
        }
    }

    /// Create a pending payment request bound to one of the account's
    /// own PIX keys, for a fixed amount.
    pub async fn create_qr(
        &self,
        account: AccountId,
        caller: UserId,
        key_value: &str,
        amount: Amount,
        expires_in: Duration,
    ) -> Result<QrRow, BankError> {
        if !amount.is_positive() {
            return Err(BankError::InvalidAmount);
        }
        if expires_in <= Duration::zero() {
            return Err(BankError::InvalidRequest(
                "expiry must be in the future".into(),
            ));
        }

        let account_row = self
            .ledger
            .account_by_id(account)
            .await?
            .ok_or(BankError::NotFound("account"))?;
        guard::ensure_owner(&account_row, caller)?;

        let key = PixKeyRepository::get_by_value(&self.pool, key_value)
            .await?
            .ok_or(BankError::NotFound("pix key"))?;
        if key.account_id != account {
            return Err(BankError::Forbidden);
        }

        let merchant_name = UserRepository::get_by_id(&self.pool, account_row.user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| account_row.account_number.clone());

        let mut txid = Uuid::new_v4().simple().to_string();
        txid.truncate(MAX_TXID_LEN);
        let payload = build_payload(&key.key_value, &merchant_name, MERCHANT_CITY, amount, &txid);

        let qr = QrRow {
            id: QrId::new(),
            account_id: account,
            key_value: key.key_value,
            amount,
            txid,
            payload,
            expires_at: Utc::now() + expires_in,
            status: QrStatus::Pending,
        };
        PixQrRepository::insert(&self.pool, &qr).await?;

        tracing::info!(account = %account, txid = %qr.txid, amount = %amount, "qr created");
        Ok(qr)
    }

    /// Look up a QR by payload, lazily expiring it first.
    pub async fn get_qr(&self, payload: &str) -> Result<QrRow, BankError> {
        let mut qr = PixQrRepository::get_by_payload(&self.pool, payload)
            .await?
            .ok_or(BankError::NotFound("qr code"))?;

        if qr.status == QrStatus::Pending && qr.is_expired_at(Utc::now()) {
            if PixQrRepository::expire_if_pending(&self.pool, qr.id).await? {
                qr.status = QrStatus::Expired;
            } else {
                // A concurrent payment consumed the QR between our read
                // and the flip; re-read the committed terminal state.
                qr = PixQrRepository::get_by_payload(&self.pool, payload)
                    .await?
                    .ok_or(BankError::NotFound("qr code"))?;
            }
        }
        Ok(qr)
    }

    /// Remove a payment request that has not been consumed. A used or
    /// expired QR stays in the ledger record.
    pub async fn delete_qr(&self, payload: &str, caller: UserId) -> Result<(), BankError> {
        let qr = PixQrRepository::get_by_payload(&self.pool, payload)
            .await?
            .ok_or(BankError::NotFound("qr code"))?;

        let account_row = self
            .ledger
            .account_by_id(qr.account_id)
            .await?
            .ok_or(BankError::NotFound("account"))?;
        guard::ensure_owner(&account_row, caller)?;

        if qr.is_expired_at(Utc::now()) {
            return Err(BankError::Expired);
        }
        match qr.status {
            QrStatus::Pending => {}
            QrStatus::Expired => return Err(BankError::Expired),
            QrStatus::Used => return Err(BankError::Conflict),
        }

        // The delete re-checks `pending` itself; a payment committing
        // between the read above and here must keep its QR row.
        if !PixQrRepository::delete_if_pending(&self.pool, qr.id).await? {
            return Err(BankError::Conflict);
        }
        tracing::info!(txid = %qr.txid, "qr removed");
        Ok(())
    }

    /// Pay a QR: guard on the payer's account, then hand the payload to
    /// the engine, which re-checks the QR under lock and moves funds.
    pub async fn transfer_qr(
        &self,
        source_account: AccountId,
        caller: UserId,
        payload: &str,
        transfer_password: &str,
    ) -> Result<TransferOutcome, BankError> {
        let account_row = self
            .ledger
            .account_by_id(source_account)
            .await?
            .ok_or(BankError::NotFound("account"))?;
        guard::authorize(&account_row, caller, transfer_password)?;

        self.engine.pay_qr(source_account, payload).await
    }
}

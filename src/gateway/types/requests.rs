//! Request bodies and response views.
//!
//! Monetary fields travel as 2-decimal strings and are parsed through
//! [`Amount::parse`], so a malformed amount surfaces as the
//! `InvalidAmount` kind rather than a serde rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::PostingId;
use crate::error::BankError;
use crate::money::Amount;
use crate::pix::PixKeyType;
use crate::store::{PostingRow, QrRow};
use crate::transfer::TransferOutcome;

pub fn parse_amount(raw: &str) -> Result<Amount, BankError> {
    Amount::parse(raw).map_err(|_| BankError::InvalidAmount)
}

// ---------------------------------------------------------------------------
// Transfer password
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetTransferPasswordRequest {
    #[validate(length(min = 4, max = 64))]
    #[schema(example = "4321")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeTransferPasswordRequest {
    #[validate(length(min = 4, max = 64))]
    pub old_password: String,
    #[validate(length(min = 4, max = 64))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferPasswordStatus {
    pub is_set: bool,
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    #[validate(length(min = 3, max = 16))]
    #[schema(example = "48213-7")]
    pub to_account: String,
    #[schema(value_type = String, example = "100.00")]
    pub amount: String,
    pub transfer_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PixTransferRequest {
    #[validate(length(min = 1, max = 120))]
    #[schema(example = "maria@example.com")]
    pub key: String,
    #[schema(value_type = String, example = "50.00")]
    pub amount: String,
    pub transfer_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RechargeRequest {
    #[validate(length(min = 8, max = 20))]
    #[schema(example = "+5511998765432")]
    pub phone: String,
    #[schema(value_type = String, example = "20.00")]
    pub amount: String,
    pub transfer_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferView {
    #[schema(value_type = String, example = "100.00")]
    pub amount: Amount,
    #[schema(value_type = String, example = "200.00")]
    pub new_balance: Amount,
}

impl From<TransferOutcome> for TransferView {
    fn from(o: TransferOutcome) -> Self {
        Self {
            amount: o.amount,
            new_balance: o.source_balance,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceView {
    #[schema(example = "48213-7")]
    pub account_number: String,
    #[schema(value_type = String, example = "300.00")]
    pub balance: Amount,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatementEntry {
    #[schema(value_type = String)]
    pub id: PostingId,
    pub counterparty: String,
    #[schema(value_type = String)]
    pub posted_at: DateTime<Utc>,
    #[schema(value_type = String, example = "100.00")]
    pub amount: Amount,
    pub category: String,
    pub direction: String,
}

impl From<PostingRow> for StatementEntry {
    fn from(p: PostingRow) -> Self {
        Self {
            id: p.id,
            counterparty: p.counterparty,
            posted_at: p.posted_at,
            amount: p.amount,
            category: p.category.as_str().to_string(),
            direction: p.direction.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// PIX
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePixKeyRequest {
    pub key_type: PixKeyType,
    /// Ignored for `random`; required otherwise.
    #[schema(example = "maria@example.com")]
    pub key_value: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeletePixKeyRequest {
    pub key_value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQrRequest {
    #[validate(length(min = 1, max = 120))]
    pub key_value: String,
    #[schema(value_type = String, example = "75.00")]
    pub amount: String,
    /// Lifetime of the payment request, in seconds.
    #[validate(range(min = 1, max = 604_800))]
    #[schema(example = 3600)]
    pub expires_in_seconds: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayQrRequest {
    pub payload: String,
    pub transfer_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QrView {
    pub txid: String,
    pub payload: String,
    #[schema(value_type = String, example = "75.00")]
    pub amount: Amount,
    #[schema(value_type = String)]
    pub expires_at: DateTime<Utc>,
    pub status: String,
}

impl From<QrRow> for QrView {
    fn from(qr: QrRow) -> Self {
        Self {
            txid: qr.txid,
            payload: qr.payload,
            amount: qr.amount,
            expires_at: qr.expires_at,
            status: qr.status.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Credit cards
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCardRequest {
    #[validate(length(min = 2, max = 26))]
    #[schema(example = "MARIA SILVA")]
    pub name: String,
    #[validate(length(min = 4, max = 64))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustCardLimitRequest {
    #[schema(value_type = String, example = "1000.00")]
    pub new_available: String,
    pub transfer_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockCardRequest {
    pub blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_maps_to_invalid_amount() {
        assert!(parse_amount("100.00").is_ok());
        assert!(matches!(parse_amount(".5"), Err(BankError::InvalidAmount)));
        assert!(matches!(parse_amount("-1"), Err(BankError::InvalidAmount)));
        assert!(matches!(
            parse_amount("1.234"),
            Err(BankError::InvalidAmount)
        ));
    }
}

//! QR payment lifecycle against the in-memory ledger store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use pixbank::core_types::{AccountId, QrId, UserId};
use pixbank::error::BankError;
use pixbank::money::Amount;
use pixbank::store::memory::MemLedger;
use pixbank::store::{AccountRow, PostingCategory, QrRow, QrStatus};
use pixbank::transfer::TransferEngine;

struct Fixture {
    ledger: MemLedger,
    engine: TransferEngine,
    payer: AccountId,
    merchant: AccountId,
}

async fn fixture() -> Fixture {
    let ledger = MemLedger::new();

    let payer_user = UserId::new();
    let merchant_user = UserId::new();
    ledger.insert_user(payer_user, "Paulo Costa").await;
    ledger.insert_user(merchant_user, "Mercado Central").await;

    let payer = AccountId::new();
    let merchant = AccountId::new();
    ledger
        .insert_account(AccountRow {
            id: payer,
            user_id: payer_user,
            account_number: "30000-3".into(),
            balance: Amount::parse("500.00").unwrap(),
            transfer_password_hash: None,
        })
        .await;
    ledger
        .insert_account(AccountRow {
            id: merchant,
            user_id: merchant_user,
            account_number: "40000-4".into(),
            balance: Amount::parse("0.00").unwrap(),
            transfer_password_hash: None,
        })
        .await;

    let engine = TransferEngine::new(Arc::new(ledger.clone()));
    Fixture {
        ledger,
        engine,
        payer,
        merchant,
    }
}

fn qr(merchant: AccountId, amount: &str, payload: &str, expires_in_secs: i64) -> QrRow {
    QrRow {
        id: QrId::new(),
        account_id: merchant,
        key_value: "mercado@example.com".into(),
        amount: Amount::parse(amount).unwrap(),
        txid: format!("TX-{}", payload),
        payload: payload.into(),
        expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        status: QrStatus::Pending,
    }
}

#[tokio::test]
async fn test_pay_qr_moves_bound_amount_and_marks_used() {
    let f = fixture().await;
    let qr_row = qr(f.merchant, "75.00", "PAYLOAD-OK", 3600);
    let qr_id = qr_row.id;
    f.ledger.insert_qr(qr_row).await;

    let outcome = f
        .engine
        .pay_qr(f.payer, "PAYLOAD-OK")
        .await
        .expect("payment should succeed");
    assert_eq!(outcome.amount.minor_units(), 7_500);
    assert_eq!(outcome.source_balance.minor_units(), 42_500);

    assert_eq!(f.ledger.qr(qr_id).await.unwrap().status, QrStatus::Used);
    assert_eq!(
        f.ledger.account(f.merchant).await.unwrap().balance.minor_units(),
        7_500
    );

    let postings = f.ledger.postings_for(f.payer).await;
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].category, PostingCategory::Qr);
}

#[tokio::test]
async fn test_expired_qr_cannot_be_consumed() {
    let f = fixture().await;
    let qr_row = qr(f.merchant, "10.00", "PAYLOAD-EXPIRED", -60);
    f.ledger.insert_qr(qr_row).await;

    let err = f
        .engine
        .pay_qr(f.payer, "PAYLOAD-EXPIRED")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::Expired));

    // No money moved.
    assert_eq!(
        f.ledger.account(f.payer).await.unwrap().balance.minor_units(),
        50_000
    );
    assert_eq!(
        f.ledger.account(f.merchant).await.unwrap().balance.minor_units(),
        0
    );
}

#[tokio::test]
async fn test_used_qr_cannot_be_consumed_twice() {
    let f = fixture().await;
    let qr_row = qr(f.merchant, "10.00", "PAYLOAD-TWICE", 3600);
    f.ledger.insert_qr(qr_row).await;

    f.engine
        .pay_qr(f.payer, "PAYLOAD-TWICE")
        .await
        .expect("first payment should succeed");

    let err = f
        .engine
        .pay_qr(f.payer, "PAYLOAD-TWICE")
        .await
        .expect_err("second should fail");
    assert!(matches!(err, BankError::Conflict));

    // Exactly one debit, exactly one credit.
    assert_eq!(f.ledger.postings_for(f.payer).await.len(), 1);
    assert_eq!(f.ledger.postings_for(f.merchant).await.len(), 1);
    assert_eq!(
        f.ledger.account(f.merchant).await.unwrap().balance.minor_units(),
        1_000
    );
}

#[tokio::test]
async fn test_unknown_payload_is_not_found() {
    let f = fixture().await;

    let err = f
        .engine
        .pay_qr(f.payer, "NO-SUCH-PAYLOAD")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::NotFound(_)));
}

#[tokio::test]
async fn test_insufficient_funds_leaves_qr_pending() {
    let f = fixture().await;
    let qr_row = qr(f.merchant, "9999.00", "PAYLOAD-BIG", 3600);
    let qr_id = qr_row.id;
    f.ledger.insert_qr(qr_row).await;

    let err = f
        .engine
        .pay_qr(f.payer, "PAYLOAD-BIG")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::InsufficientFunds));

    // The QR must stay consumable after a failed attempt.
    assert_eq!(f.ledger.qr(qr_id).await.unwrap().status, QrStatus::Pending);
}

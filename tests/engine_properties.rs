//! Transfer core behavior against the in-memory ledger store.

use std::sync::Arc;

use pixbank::auth::password;
use pixbank::core_types::{AccountId, UserId};
use pixbank::error::BankError;
use pixbank::money::Amount;
use pixbank::store::memory::MemLedger;
use pixbank::store::{AccountRow, PostingCategory, PostingDirection};
use pixbank::transfer::TransferService;

const PASSWORD: &str = "4321";

struct Fixture {
    ledger: MemLedger,
    service: TransferService,
    alice: AccountId,
    alice_user: UserId,
    bob: AccountId,
}

/// Alice holds 300.00 with a transfer password set; Bob holds 0.00.
async fn fixture() -> Fixture {
    let ledger = MemLedger::new();

    let alice_user = UserId::new();
    let bob_user = UserId::new();
    ledger.insert_user(alice_user, "Alice Souza").await;
    ledger.insert_user(bob_user, "Bob Lima").await;

    let alice = AccountId::new();
    let bob = AccountId::new();
    ledger
        .insert_account(AccountRow {
            id: alice,
            user_id: alice_user,
            account_number: "10000-1".into(),
            balance: Amount::parse("300.00").unwrap(),
            transfer_password_hash: Some(password::hash(PASSWORD).unwrap()),
        })
        .await;
    ledger
        .insert_account(AccountRow {
            id: bob,
            user_id: bob_user,
            account_number: "20000-2".into(),
            balance: Amount::parse("0.00").unwrap(),
            transfer_password_hash: None,
        })
        .await;

    let service = TransferService::new(Arc::new(ledger.clone()));
    Fixture {
        ledger,
        service,
        alice,
        alice_user,
        bob,
    }
}

async fn balances(f: &Fixture) -> (i64, i64) {
    let a = f.ledger.account(f.alice).await.unwrap().balance.minor_units();
    let b = f.ledger.account(f.bob).await.unwrap().balance.minor_units();
    (a, b)
}

#[tokio::test]
async fn test_transfer_moves_funds_and_writes_paired_postings() {
    let f = fixture().await;

    let outcome = f
        .service
        .transfer(
            "10000-1",
            "20000-2",
            PASSWORD,
            Amount::parse("100.00").unwrap(),
            f.alice_user,
        )
        .await
        .expect("transfer should succeed");

    assert_eq!(outcome.source_balance.minor_units(), 20_000);
    assert_eq!(outcome.dest_balance.minor_units(), 10_000);
    assert_eq!(balances(&f).await, (20_000, 10_000));

    let debit = f.ledger.postings_for(f.alice).await;
    assert_eq!(debit.len(), 1);
    assert_eq!(debit[0].direction, PostingDirection::Debit);
    assert_eq!(debit[0].amount.minor_units(), 10_000);
    assert_eq!(debit[0].counterparty, "Bob Lima");
    assert_eq!(debit[0].category, PostingCategory::Internal);

    let credit = f.ledger.postings_for(f.bob).await;
    assert_eq!(credit.len(), 1);
    assert_eq!(credit[0].direction, PostingDirection::Credit);
    assert_eq!(credit[0].counterparty, "Alice Souza");
}

#[tokio::test]
async fn test_conservation_across_transfers() {
    let f = fixture().await;
    let before = {
        let (a, b) = balances(&f).await;
        a + b
    };

    for raw in ["10.00", "25.50", "0.01"] {
        f.service
            .transfer(
                "10000-1",
                "20000-2",
                PASSWORD,
                Amount::parse(raw).unwrap(),
                f.alice_user,
            )
            .await
            .expect("transfer should succeed");
    }

    let (a, b) = balances(&f).await;
    assert_eq!(a + b, before);
}

#[tokio::test]
async fn test_insufficient_funds_leaves_balances_unchanged() {
    let f = fixture().await;

    let err = f
        .service
        .transfer(
            "10000-1",
            "20000-2",
            PASSWORD,
            Amount::parse("300.01").unwrap(),
            f.alice_user,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::InsufficientFunds));

    assert_eq!(balances(&f).await, (30_000, 0));
    assert!(f.ledger.postings_for(f.alice).await.is_empty());
}

#[tokio::test]
async fn test_same_account_rejected() {
    let f = fixture().await;

    let err = f
        .service
        .transfer(
            "10000-1",
            "10000-1",
            PASSWORD,
            Amount::parse("10.00").unwrap(),
            f.alice_user,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::SameAccount));
    assert_eq!(balances(&f).await, (30_000, 0));
}

#[tokio::test]
async fn test_zero_amount_rejected() {
    let f = fixture().await;

    let err = f
        .service
        .transfer(
            "10000-1",
            "20000-2",
            PASSWORD,
            Amount::parse("0.00").unwrap(),
            f.alice_user,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::InvalidAmount));
}

#[tokio::test]
async fn test_missing_transfer_password_is_distinct_failure() {
    let f = fixture().await;
    let bob_user = f.ledger.account(f.bob).await.unwrap().user_id;

    // Bob never set a transfer password; his outbound transfer must
    // fail with the dedicated kind, not a wrong-password error.
    let err = f
        .service
        .transfer(
            "20000-2",
            "10000-1",
            "anything",
            Amount::parse("1.00").unwrap(),
            bob_user,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::TransferPasswordNotSet));
    assert_eq!(balances(&f).await, (30_000, 0));
}

#[tokio::test]
async fn test_wrong_transfer_password_rejected() {
    let f = fixture().await;

    let err = f
        .service
        .transfer(
            "10000-1",
            "20000-2",
            "wrong",
            Amount::parse("10.00").unwrap(),
            f.alice_user,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::TransferPasswordIncorrect));
    assert_eq!(balances(&f).await, (30_000, 0));
}

#[tokio::test]
async fn test_non_owner_cannot_transfer() {
    let f = fixture().await;

    let err = f
        .service
        .transfer(
            "10000-1",
            "20000-2",
            PASSWORD,
            Amount::parse("10.00").unwrap(),
            UserId::new(),
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::Forbidden));
}

#[tokio::test]
async fn test_mid_transaction_failure_rolls_back_everything() {
    let f = fixture().await;
    f.ledger.set_fail_on_posting(true).await;

    let err = f
        .service
        .transfer(
            "10000-1",
            "20000-2",
            PASSWORD,
            Amount::parse("100.00").unwrap(),
            f.alice_user,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::Internal));

    // Balances updated in the same scope as the failed posting must not
    // be observable.
    assert_eq!(balances(&f).await, (30_000, 0));
    assert!(f.ledger.postings_for(f.alice).await.is_empty());
    assert!(f.ledger.postings_for(f.bob).await.is_empty());
}

#[tokio::test]
async fn test_recharge_is_one_sided_debit() {
    let f = fixture().await;

    let new_balance = f
        .service
        .recharge(
            f.alice,
            "+5511998765432",
            PASSWORD,
            Amount::parse("20.00").unwrap(),
            f.alice_user,
        )
        .await
        .expect("recharge should succeed");
    assert_eq!(new_balance.minor_units(), 28_000);

    let postings = f.ledger.postings_for(f.alice).await;
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].direction, PostingDirection::Debit);
    assert_eq!(postings[0].category, PostingCategory::Recharge);
    assert_eq!(postings[0].counterparty, "Recarga +5511998765432");
}

#[tokio::test]
async fn test_set_then_change_transfer_password() {
    let f = fixture().await;
    let bob_user = f.ledger.account(f.bob).await.unwrap().user_id;

    // Change before any set fails with the dedicated kind.
    let err = f
        .service
        .change_transfer_password("20000-2", bob_user, "old", "new-pass")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::TransferPasswordNotSet));

    f.service
        .set_transfer_password("20000-2", bob_user, "first-pass")
        .await
        .expect("set should succeed");
    assert!(
        f.service
            .transfer_password_status("20000-2", bob_user)
            .await
            .unwrap()
    );

    // New equal to old is rejected.
    let err = f
        .service
        .change_transfer_password("20000-2", bob_user, "first-pass", "first-pass")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BankError::Conflict));

    f.service
        .change_transfer_password("20000-2", bob_user, "first-pass", "second-pass")
        .await
        .expect("change should succeed");
}

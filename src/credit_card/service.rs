//! Credit card operations.
//!
//! Issuing a card takes a card password of its own; limit adjustment is
//! a money-related change and so verifies against the *account's*
//! transfer password, same as every other guarded operation.

use std::sync::Arc;

use sqlx::PgPool;

use super::models::{self, CreditCard};
use super::repository::CardRepository;
use crate::auth::password;
use crate::core_types::{AccountId, CardId, UserId};
use crate::error::BankError;
use crate::money::Amount;
use crate::store::Ledger;
use crate::transfer::guard;

#[derive(Clone)]
pub struct CardService {
    pool: PgPool,
    ledger: Arc<dyn Ledger>,
}

impl CardService {
    pub fn new(pool: PgPool, ledger: Arc<dyn Ledger>) -> Self {
        Self { pool, ledger }
    }

    async fn owned_account(
        &self,
        account: AccountId,
        caller: UserId,
    ) -> Result<crate::store::AccountRow, BankError> {
        let row = self
            .ledger
            .account_by_id(account)
            .await?
            .ok_or(BankError::NotFound("account"))?;
        guard::ensure_owner(&row, caller)?;
        Ok(row)
    }

    async fn owned_card(
        &self,
        card: CardId,
        caller: UserId,
    ) -> Result<CreditCard, BankError> {
        let card = CardRepository::get_by_id(&self.pool, card)
            .await?
            .ok_or(BankError::NotFound("card"))?;
        self.owned_account(card.account_id, caller).await?;
        Ok(card)
    }

    /// Issue a new card: random number, expiry and limit; available
    /// starts at the limit, used at zero.
    pub async fn create_card(
        &self,
        account: AccountId,
        caller: UserId,
        name: &str,
        card_password: &str,
    ) -> Result<CreditCard, BankError> {
        self.owned_account(account, caller).await?;

        let (card_number, expiry, limit) = {
            let mut rng = rand::thread_rng();
            (
                models::generate_card_number(&mut rng),
                models::generate_expiry(&mut rng, chrono::Utc::now()),
                models::generate_limit(&mut rng),
            )
        };

        let card = CreditCard {
            id: CardId::new(),
            account_id: account,
            name: name.to_string(),
            card_number,
            expiry,
            password_hash: password::hash(card_password)?,
            limit,
            available: limit,
            used: Amount::from_minor_units(0),
            blocked: false,
            created_at: chrono::Utc::now(),
        };
        CardRepository::insert(&self.pool, &card).await?;

        tracing::info!(account = %account, card = %card.id, "credit card issued");
        Ok(card)
    }

    pub async fn list_cards(
        &self,
        account: AccountId,
        caller: UserId,
    ) -> Result<Vec<CreditCard>, BankError> {
        self.owned_account(account, caller).await?;
        Ok(CardRepository::list_for_account(&self.pool, account).await?)
    }

    /// Change the available amount, guarded by the account's transfer
    /// password and bounded by `used <= available <= limit`.
    pub async fn adjust_available(
        &self,
        card_id: CardId,
        caller: UserId,
        new_available: Amount,
        transfer_password: &str,
    ) -> Result<CreditCard, BankError> {
        let mut card = CardRepository::get_by_id(&self.pool, card_id)
            .await?
            .ok_or(BankError::NotFound("card"))?;

        let account = self
            .ledger
            .account_by_id(card.account_id)
            .await?
            .ok_or(BankError::NotFound("account"))?;
        guard::authorize(&account, caller, transfer_password)?;

        models::validate_adjust(&card, new_available)?;
        CardRepository::set_available(&self.pool, card_id, new_available).await?;
        card.available = new_available;

        tracing::info!(card = %card_id, available = %new_available, "card limit adjusted");
        Ok(card)
    }

    pub async fn set_block(
        &self,
        card_id: CardId,
        caller: UserId,
        blocked: bool,
    ) -> Result<CreditCard, BankError> {
        let mut card = self.owned_card(card_id, caller).await?;
        CardRepository::set_blocked(&self.pool, card_id, blocked).await?;
        card.blocked = blocked;
        tracing::info!(card = %card_id, blocked, "card block flag changed");
        Ok(card)
    }

    pub async fn delete_card(&self, card_id: CardId, caller: UserId) -> Result<(), BankError> {
        self.owned_card(card_id, caller).await?;
        CardRepository::delete(&self.pool, card_id).await?;
        tracing::info!(card = %card_id, "card deleted");
        Ok(())
    }
}

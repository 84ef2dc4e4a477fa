//! Credit card persistence.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::CreditCard;
use crate::core_types::{AccountId, CardId};
use crate::error::BankError;
use crate::money::Amount;
use crate::store::StoreError;

const CARD_COLS: &str = "id, account_id, card_name, card_number, valid_thru, password_hash, \
                         card_limit, available, used, blocked, created_at";

fn card_from_row(r: &PgRow) -> CreditCard {
    CreditCard {
        id: r.get("id"),
        account_id: r.get("account_id"),
        name: r.get("card_name"),
        card_number: r.get("card_number"),
        expiry: r.get("valid_thru"),
        password_hash: r.get("password_hash"),
        limit: r.get("card_limit"),
        available: r.get("available"),
        used: r.get("used"),
        blocked: r.get("blocked"),
        created_at: r.get("created_at"),
    }
}

pub struct CardRepository;

impl CardRepository {
    pub async fn insert(pool: &PgPool, card: &CreditCard) -> Result<(), BankError> {
        let result = sqlx::query(
            r#"INSERT INTO credit_cards
               (id, account_id, card_name, card_number, valid_thru, password_hash,
                card_limit, available, used, blocked)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(card.id)
        .bind(card.account_id)
        .bind(&card.name)
        .bind(&card.card_number)
        .bind(&card.expiry)
        .bind(&card.password_hash)
        .bind(card.limit)
        .bind(card.available)
        .bind(card.used)
        .bind(card.blocked)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(BankError::DuplicateKey("card number collision".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_id(pool: &PgPool, id: CardId) -> Result<Option<CreditCard>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM credit_cards WHERE id = $1",
            CARD_COLS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.as_ref().map(card_from_row))
    }

    pub async fn list_for_account(
        pool: &PgPool,
        account: AccountId,
    ) -> Result<Vec<CreditCard>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM credit_cards WHERE account_id = $1 ORDER BY created_at",
            CARD_COLS
        ))
        .bind(account)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(card_from_row).collect())
    }

    pub async fn set_available(
        pool: &PgPool,
        id: CardId,
        available: Amount,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE credit_cards SET available = $1 WHERE id = $2")
            .bind(available)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_blocked(pool: &PgPool, id: CardId, blocked: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE credit_cards SET blocked = $1 WHERE id = $2")
            .bind(blocked)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: CardId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credit_cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

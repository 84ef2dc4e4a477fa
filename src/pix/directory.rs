//! PIX key directory: registration, lookup, removal.

use sqlx::PgPool;
use uuid::Uuid;

use super::models::{PixKey, PixKeyType};
use super::repository::PixKeyRepository;
use crate::core_types::{AccountId, PixKeyId};
use crate::error::BankError;

#[derive(Clone)]
pub struct PixDirectory {
    pool: PgPool,
}

impl PixDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a key for an account. `Random` keys get a generated
    /// value; any caller-supplied value is ignored for that type.
    ///
    /// Uniqueness is two-fold: one key per type per account, and one
    /// account per value across the directory. The pre-checks give
    /// precise errors; the database constraints are what actually hold
    /// under races, surfacing as [`BankError::DuplicateKey`].
    pub async fn create_key(
        &self,
        account: AccountId,
        key_type: PixKeyType,
        key_value: Option<String>,
    ) -> Result<PixKey, BankError> {
        let value = match key_type {
            PixKeyType::Random => Uuid::new_v4().to_string(),
            _ => key_value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    BankError::InvalidRequest("key value required for this key type".into())
                })?,
        };

        if PixKeyRepository::get_by_account_and_type(&self.pool, account, key_type)
            .await?
            .is_some()
        {
            return Err(BankError::DuplicateKey(format!(
                "account already has a {} key",
                key_type.as_str()
            )));
        }
        if PixKeyRepository::get_by_value(&self.pool, &value)
            .await?
            .is_some()
        {
            return Err(BankError::DuplicateKey(
                "key value already registered".into(),
            ));
        }

        let key = PixKey {
            id: PixKeyId::new(),
            account_id: account,
            key_type,
            key_value: value,
            created_at: chrono::Utc::now(),
        };
        PixKeyRepository::insert(&self.pool, &key).await?;

        tracing::info!(account = %account, key_type = key_type.as_str(), "pix key registered");
        Ok(key)
    }

    pub async fn list_keys(&self, account: AccountId) -> Result<Vec<PixKey>, BankError> {
        Ok(PixKeyRepository::list_for_account(&self.pool, account).await?)
    }

    /// Resolve a key value to its registered key, for addressing a
    /// transfer.
    pub async fn resolve(&self, value: &str) -> Result<PixKey, BankError> {
        PixKeyRepository::get_by_value(&self.pool, value)
            .await?
            .ok_or(BankError::NotFound("pix key"))
    }

    /// Remove a key owned by `account`. A key still referenced by
    /// pending QR payment requests cannot be removed.
    pub async fn delete_key(&self, account: AccountId, value: &str) -> Result<(), BankError> {
        let key = PixKeyRepository::get_by_value(&self.pool, value)
            .await?
            .ok_or(BankError::NotFound("pix key"))?;
        if key.account_id != account {
            return Err(BankError::Forbidden);
        }

        // Existence and ownership are established above; the delete
        // itself refuses while any pending QR references the key, so a
        // QR created concurrently cannot orphan itself.
        if !PixKeyRepository::delete_unreferenced(&self.pool, value).await? {
            return Err(BankError::KeyInUse);
        }
        tracing::info!(account = %account, "pix key removed");
        Ok(())
    }
}

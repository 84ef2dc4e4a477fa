//! PIX key data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{AccountId, PixKeyId};

/// Closed enumeration of PIX key types. At most one key per type per
/// account, including `Random`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyType {
    Cpf,
    Email,
    Phone,
    Random,
}

impl PixKeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PixKeyType::Cpf => "cpf",
            PixKeyType::Email => "email",
            PixKeyType::Phone => "phone",
            PixKeyType::Random => "random",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cpf" => Some(PixKeyType::Cpf),
            "email" => Some(PixKeyType::Email),
            "phone" => Some(PixKeyType::Phone),
            "random" => Some(PixKeyType::Random),
            _ => None,
        }
    }
}

/// A registered PIX key. The key value is globally unique: one account
/// per value, across the whole directory.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PixKey {
    #[schema(value_type = String)]
    pub id: PixKeyId,
    #[schema(value_type = String)]
    pub account_id: AccountId,
    pub key_type: PixKeyType,
    pub key_value: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_roundtrip() {
        for t in [
            PixKeyType::Cpf,
            PixKeyType::Email,
            PixKeyType::Phone,
            PixKeyType::Random,
        ] {
            assert_eq!(PixKeyType::parse(t.as_str()), Some(t));
        }
        assert_eq!(PixKeyType::parse("aleatoria"), None);
    }
}

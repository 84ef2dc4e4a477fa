//! Core identifier types.
//!
//! Every persisted entity is keyed by an opaque UUID. Newtypes keep the
//! different id spaces from being mixed up at compile time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Registered user.
    UserId
);
uuid_id!(
    /// Bank account (1:1 with a user).
    AccountId
);
uuid_id!(
    /// PIX key registration.
    PixKeyId
);
uuid_id!(
    /// PIX QR payment request.
    QrId
);
uuid_id!(
    /// History-ledger posting (one side of a movement).
    PostingId
);
uuid_id!(
    /// Credit card.
    CardId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_and_roundtrip() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);

        let s = a.to_string();
        let back: AccountId = s.parse().unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}

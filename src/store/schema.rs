//! PostgreSQL schema bootstrap.
//!
//! Idempotent DDL applied at startup. Balance and credit columns are
//! BIGINT minor units; the `balance >= 0` check is a last line of
//! defense behind the engine's own validation.

use anyhow::{Context, Result};
use sqlx::PgPool;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            UUID PRIMARY KEY,
    name          TEXT NOT NULL,
    cpf           TEXT NOT NULL UNIQUE,
    phone         TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id                     UUID PRIMARY KEY,
    user_id                UUID NOT NULL UNIQUE REFERENCES users(id),
    account_number         TEXT NOT NULL UNIQUE,
    balance                BIGINT NOT NULL CHECK (balance >= 0),
    transfer_password_hash TEXT,
    created_at             TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_PIX_KEYS: &str = r#"
CREATE TABLE IF NOT EXISTS pix_keys (
    id         UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id),
    key_type   TEXT NOT NULL,
    key_value  TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (account_id, key_type)
)
"#;

const CREATE_PIX_QRS: &str = r#"
CREATE TABLE IF NOT EXISTS pix_qrs (
    id         UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id),
    key_value  TEXT NOT NULL,
    amount     BIGINT NOT NULL,
    txid       TEXT NOT NULL UNIQUE,
    payload    TEXT NOT NULL UNIQUE,
    expires_at TIMESTAMPTZ NOT NULL,
    status     TEXT NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_TRANSFERS: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    id           UUID PRIMARY KEY,
    account_id   UUID NOT NULL REFERENCES accounts(id),
    counterparty TEXT NOT NULL,
    posted_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    amount       BIGINT NOT NULL,
    category     TEXT NOT NULL,
    direction    TEXT NOT NULL
)
"#;

const CREATE_TRANSFERS_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS transfers_account_posted_idx
    ON transfers (account_id, posted_at DESC)
"#;

const CREATE_CREDIT_CARDS: &str = r#"
CREATE TABLE IF NOT EXISTS credit_cards (
    id            UUID PRIMARY KEY,
    account_id    UUID NOT NULL REFERENCES accounts(id),
    card_name     TEXT NOT NULL,
    card_number   TEXT NOT NULL UNIQUE,
    valid_thru    TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    card_limit    BIGINT NOT NULL,
    available     BIGINT NOT NULL,
    used          BIGINT NOT NULL,
    blocked       BOOLEAN NOT NULL DEFAULT FALSE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_REVOKED_TOKENS: &str = r#"
CREATE TABLE IF NOT EXISTS revoked_tokens (
    jti        TEXT PRIMARY KEY,
    expires_at TIMESTAMPTZ NOT NULL
)
"#;

/// Apply the schema. Safe to run on every startup.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing PostgreSQL schema...");

    for (name, ddl) in [
        ("users", CREATE_USERS),
        ("accounts", CREATE_ACCOUNTS),
        ("pix_keys", CREATE_PIX_KEYS),
        ("pix_qrs", CREATE_PIX_QRS),
        ("transfers", CREATE_TRANSFERS),
        ("transfers index", CREATE_TRANSFERS_IDX),
        ("credit_cards", CREATE_CREDIT_CARDS),
        ("revoked_tokens", CREATE_REVOKED_TOKENS),
    ] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create {}", name))?;
    }

    tracing::info!("PostgreSQL schema initialized");
    Ok(())
}

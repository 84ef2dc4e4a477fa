//! PixBank - Banking Backend
//!
//! A banking backend with an atomic ledger/transfer core.
//!
//! # Modules
//!
//! - [`core_types`] - Opaque entity identifiers
//! - [`money`] - Fixed-point currency amounts
//! - [`error`] - Service-wide error taxonomy
//! - [`store`] - Ledger store abstraction (Postgres + in-memory)
//! - [`account`] - Users and accounts
//! - [`auth`] - Login credentials, JWT sessions, revocation
//! - [`transfer`] - Guard, engine, history, orchestration
//! - [`pix`] - Key directory, EMV payloads, QR payment requests
//! - [`credit_card`] - Card issuance and limit management
//! - [`gateway`] - HTTP API
//! - [`config`] / [`logging`] - Runtime configuration and tracing setup

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod error;
pub mod logging;
pub mod money;

pub mod account;
pub mod auth;
pub mod credit_card;
pub mod gateway;
pub mod pix;
pub mod store;
pub mod transfer;

// Convenient re-exports at crate root
pub use core_types::{AccountId, CardId, PixKeyId, PostingId, QrId, UserId};
pub use error::BankError;
pub use money::Amount;
pub use store::{Ledger, LedgerTx};
pub use transfer::{TransferEngine, TransferOutcome, TransferService};

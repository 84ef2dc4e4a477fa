//! The ledger/transfer core.
//!
//! - [`guard`] - ownership + transfer-password authorization
//! - [`engine`] - the atomic money-movement primitive
//! - [`history`] - history-ledger queries
//! - [`service`] - request-level orchestration of guard + engine

pub mod engine;
pub mod guard;
pub mod history;
pub mod service;

pub use engine::{TransferEngine, TransferOutcome};
pub use service::TransferService;

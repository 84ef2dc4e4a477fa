//! Credit card issuance and limit management.

pub mod models;
pub mod repository;
pub mod service;

pub use models::CreditCard;
pub use service::CardService;

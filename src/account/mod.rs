//! User and account management.

pub mod models;
pub mod repository;

pub use models::User;
pub use repository::{AccountRepository, UserRepository};

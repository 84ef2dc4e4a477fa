//! PIX: key directory, EMV payloads, QR payment requests.

pub mod directory;
pub mod models;
pub mod payload;
pub mod qr;
pub mod repository;

pub use directory::PixDirectory;
pub use models::{PixKey, PixKeyType};
pub use qr::PixQrService;

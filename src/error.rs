//! Service-wide error taxonomy.
//!
//! Expected business failures are values, never panics: every operation
//! returns `Result<_, BankError>` and the gateway maps each variant to a
//! stable machine-readable kind plus an HTTP status. Unexpected store
//! failures collapse into `Internal` without leaking driver detail; the
//! full error is logged server-side at the point of conversion.

use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("access denied to this resource")]
    Forbidden,

    #[error("missing or invalid credentials")]
    Unauthorized,

    #[error("transfer password not set; set it before transferring")]
    TransferPasswordNotSet,

    #[error("transfer password incorrect")]
    TransferPasswordIncorrect,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("cannot transfer to the same account")]
    SameAccount,

    #[error("{0}")]
    DuplicateKey(String),

    #[error("pix key is referenced by an active qr code")]
    KeyInUse,

    #[error("{0}")]
    LimitViolation(&'static str),

    #[error("qr code has expired")]
    Expired,

    #[error("concurrent modification, please retry")]
    Conflict,

    #[error("internal error")]
    Internal,
}

impl BankError {
    /// Stable machine-readable failure kind for the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            BankError::NotFound(_) => "NotFound",
            BankError::Forbidden => "Forbidden",
            BankError::Unauthorized => "Unauthorized",
            BankError::TransferPasswordNotSet => "TransferPasswordNotSet",
            BankError::TransferPasswordIncorrect => "TransferPasswordIncorrect",
            BankError::InvalidAmount => "InvalidAmount",
            BankError::InvalidRequest(_) => "InvalidRequest",
            BankError::InsufficientFunds => "InsufficientFunds",
            BankError::SameAccount => "SameAccount",
            BankError::DuplicateKey(_) => "DuplicateKey",
            BankError::KeyInUse => "KeyInUse",
            BankError::LimitViolation(_) => "LimitViolation",
            BankError::Expired => "Expired",
            BankError::Conflict => "Conflict",
            BankError::Internal => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BankError::NotFound(_) => StatusCode::NOT_FOUND,
            BankError::Forbidden => StatusCode::FORBIDDEN,
            BankError::Unauthorized => StatusCode::UNAUTHORIZED,
            BankError::TransferPasswordNotSet => StatusCode::PRECONDITION_FAILED,
            BankError::TransferPasswordIncorrect => StatusCode::UNAUTHORIZED,
            BankError::InvalidAmount => StatusCode::BAD_REQUEST,
            BankError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BankError::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
            BankError::SameAccount => StatusCode::BAD_REQUEST,
            BankError::DuplicateKey(_) => StatusCode::CONFLICT,
            BankError::KeyInUse => StatusCode::CONFLICT,
            BankError::LimitViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BankError::Expired => StatusCode::GONE,
            BankError::Conflict => StatusCode::CONFLICT,
            BankError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for BankError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::Conflict(_) => BankError::Conflict,
            _ => {
                tracing::error!("store failure: {:?}", e);
                BankError::Internal
            }
        }
    }
}

impl From<sqlx::Error> for BankError {
    fn from(e: sqlx::Error) -> Self {
        BankError::from(StoreError::from(e))
    }
}

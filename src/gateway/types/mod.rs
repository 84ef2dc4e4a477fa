//! Gateway wire types: envelope, errors, request/response bodies.

pub mod requests;
pub mod response;

pub use requests::*;
pub use response::{ApiEnvelope, ApiError, ApiResult};

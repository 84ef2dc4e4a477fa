//! Uniform response envelope and error mapping.
//!
//! Every endpoint answers `{success, message, error_kind?, data?}`.
//! `error_kind` carries the stable machine-readable variant name from
//! [`BankError`] so clients can branch without parsing messages.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::BankError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_kind: None,
            data: Some(data),
        }
    }
}

impl ApiEnvelope<()> {
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_kind: None,
            data: None,
        }
    }
}

/// Wrapper making [`BankError`] usable as an axum rejection.
#[derive(Debug)]
pub struct ApiError(pub BankError);

impl From<BankError> for ApiError {
    fn from(e: BankError) -> Self {
        ApiError(e)
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(e: crate::store::StoreError) -> Self {
        ApiError(BankError::from(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = ApiEnvelope::<()> {
            success: false,
            message: self.0.to_string(),
            error_kind: Some(self.0.kind().to_string()),
            data: None,
        };
        (self.0.status(), Json(envelope)).into_response()
    }
}

/// Validation failures on request bodies map to a 400 with the first
/// offending field in the message.
pub fn validation_error(e: validator::ValidationErrors) -> ApiError {
    tracing::debug!("request validation failed: {}", e);
    let message = match e.field_errors().keys().next() {
        Some(field) => format!("invalid value for field `{}`", field),
        None => "request validation failed".to_string(),
    };
    ApiError(BankError::InvalidRequest(message))
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiEnvelope<T>>), ApiError>;

pub fn ok<T: Serialize>(message: &str, data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiEnvelope::ok(message, data))))
}

pub fn created<T: Serialize>(message: &str, data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(message, data))))
}

pub fn ok_empty(message: &str) -> ApiResult<()> {
    Ok((StatusCode::OK, Json(ApiEnvelope::ok_empty(message))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_carries_kind() {
        let e = ApiError(BankError::InsufficientFunds);
        let envelope = ApiEnvelope::<()> {
            success: false,
            message: e.0.to_string(),
            error_kind: Some(e.0.kind().to_string()),
            data: None,
        };
        let json = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "InsufficientFunds");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_validation_error_names_offending_field() {
        use validator::Validate;

        #[derive(Validate)]
        struct Req {
            #[validate(length(min = 4))]
            password: String,
        }

        let errors = Req {
            password: "x".into(),
        }
        .validate()
        .expect_err("too short");
        let api = validation_error(errors);
        match api.0 {
            BankError::InvalidRequest(msg) => assert!(msg.contains("password"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_ok_envelope_omits_error_kind() {
        let envelope = ApiEnvelope::ok("done", 42);
        let json = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error_kind").is_none());
    }
}

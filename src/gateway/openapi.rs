//! OpenAPI / Swagger UI documentation.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::credit_card::CreditCard;
use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::types::{
    AdjustCardLimitRequest, BalanceView, BlockCardRequest, ChangeTransferPasswordRequest,
    CreateCardRequest, CreatePixKeyRequest, CreateQrRequest, DeletePixKeyRequest, PayQrRequest,
    PixTransferRequest, QrView, RechargeRequest, SetTransferPasswordRequest, StatementEntry,
    TransferPasswordStatus, TransferRequest, TransferView,
};
use crate::pix::{PixKey, PixKeyType};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PixBank API",
        version = "1.0.0",
        description = "Banking backend: accounts, internal and PIX transfers, QR payments, phone recharge, credit cards.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::register,
        crate::gateway::handlers::auth::login,
        crate::gateway::handlers::auth::logout,
        crate::gateway::handlers::auth::me,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::get_balance,
        crate::gateway::handlers::account::get_statement,
        crate::gateway::handlers::transfer::set_password,
        crate::gateway::handlers::transfer::change_password,
        crate::gateway::handlers::transfer::password_status,
        crate::gateway::handlers::transfer::transfer,
        crate::gateway::handlers::transfer::recharge,
        crate::gateway::handlers::pix::create_key,
        crate::gateway::handlers::pix::list_keys,
        crate::gateway::handlers::pix::get_key,
        crate::gateway::handlers::pix::delete_key,
        crate::gateway::handlers::pix::pix_transfer,
        crate::gateway::handlers::pix::create_qr,
        crate::gateway::handlers::pix::get_qr,
        crate::gateway::handlers::pix::delete_qr,
        crate::gateway::handlers::pix::pay_qr,
        crate::gateway::handlers::credit_card::create_card,
        crate::gateway::handlers::credit_card::list_cards,
        crate::gateway::handlers::credit_card::block_card,
        crate::gateway::handlers::credit_card::adjust_limit,
        crate::gateway::handlers::credit_card::delete_card,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserProfile,
            BalanceView,
            StatementEntry,
            SetTransferPasswordRequest,
            ChangeTransferPasswordRequest,
            TransferPasswordStatus,
            TransferRequest,
            PixTransferRequest,
            RechargeRequest,
            TransferView,
            PixKey,
            PixKeyType,
            CreatePixKeyRequest,
            DeletePixKeyRequest,
            CreateQrRequest,
            PayQrRequest,
            QrView,
            CreditCard,
            CreateCardRequest,
            AdjustCardLimitRequest,
            BlockCardRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login, sessions"),
        (name = "Account", description = "Balance and statement queries"),
        (name = "Transfer", description = "Transfer password, direct transfers, recharge"),
        (name = "PIX", description = "PIX keys, QR payment requests, PIX transfers"),
        (name = "Cards", description = "Credit card issuance and limits"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "PixBank API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("PixBank API"));
    }

    #[test]
    fn test_core_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/transfer"));
        assert!(paths.paths.contains_key("/api/v1/pix/qr/pay"));
        assert!(paths.paths.contains_key("/api/v1/cards/{id}/limit"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}

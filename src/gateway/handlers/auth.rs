//! Registration, login, logout, profile.

use axum::{Extension, Json, extract::State};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserProfile};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiEnvelope;
use crate::gateway::types::response::{self, ApiResult, validation_error};

/// Register a new user and open their account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiEnvelope<AuthResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "CPF, phone or email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    req.validate().map_err(validation_error)?;
    let resp = state.auth.register(req).await?;
    response::created("registered", resp)
}

/// Login with CPF and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiEnvelope<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let resp = state.auth.login(req).await?;
    response::ok("logged in", resp)
}

/// Revoke the presented token
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<()> {
    state.auth.logout(&claims).await?;
    response::ok_empty("logged out")
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Profile", body = ApiEnvelope<UserProfile>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<UserProfile> {
    let profile = state.auth.me(claims.user_id()?).await?;
    response::ok("profile", profile)
}

//! JWT bearer-token middleware.
//!
//! Verifies the token, rejects revoked `jti`s, and injects [`Claims`]
//! as a request extension for handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::service::Claims;
use crate::error::BankError;
use crate::gateway::{state::AppState, types::ApiError};

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(BankError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(BankError::Unauthorized)?;

    let claims: Claims = state.auth.verify_token(token)?;

    if state.auth.is_revoked(&claims.jti).await? {
        return Err(BankError::Unauthorized.into());
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

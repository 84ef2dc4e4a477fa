//! HTTP handlers, grouped by resource.

pub mod account;
pub mod auth;
pub mod credit_card;
pub mod health;
pub mod pix;
pub mod transfer;

use crate::auth::Claims;
use crate::core_types::UserId;
use crate::error::BankError;
use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;
use crate::store::AccountRow;

/// The caller's user id, from the JWT claims injected by the
/// middleware.
fn caller_id(claims: &Claims) -> Result<UserId, ApiError> {
    Ok(claims.user_id()?)
}

/// The caller's own account. Every user has exactly one.
async fn caller_account(state: &AppState, claims: &Claims) -> Result<AccountRow, ApiError> {
    let user_id = claims.user_id()?;
    let account = crate::account::AccountRepository::get_by_user(&state.pool, user_id)
        .await
        .map_err(BankError::from)?
        .ok_or(BankError::NotFound("account"))?;
    Ok(account)
}

//! Account and statement queries.

use axum::{
    Extension,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::Claims;
use crate::core_types::AccountId;
use crate::error::BankError;
use crate::gateway::state::AppState;
use crate::gateway::types::response::{self, ApiResult};
use crate::gateway::types::{ApiEnvelope, BalanceView, StatementEntry};
use crate::transfer::guard;
use crate::transfer::history::HistoryRepository;

use super::{caller_account, caller_id};

/// The caller's account summary
#[utoipa::path(
    get,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Account summary", body = ApiEnvelope<BalanceView>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_jwt" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<BalanceView> {
    let account = caller_account(&state, &claims).await?;
    response::ok(
        "account",
        BalanceView {
            account_number: account.account_number,
            balance: account.balance,
        },
    )
}

/// Balance of one of the caller's accounts
#[utoipa::path(
    get,
    path = "/api/v1/account/{id}/balance",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Balance", body = ApiEnvelope<BalanceView>),
        (status = 403, description = "Account owned by another user"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Account"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<AccountId>,
) -> ApiResult<BalanceView> {
    let account = state
        .ledger
        .account_by_id(id)
        .await
        .map_err(BankError::from)?
        .ok_or(BankError::NotFound("account"))?;
    guard::ensure_owner(&account, caller_id(&claims)?)?;

    response::ok(
        "balance",
        BalanceView {
            account_number: account.account_number,
            balance: account.balance,
        },
    )
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StatementQuery {
    /// Maximum number of entries, newest first. Defaults to 50.
    pub limit: Option<i64>,
}

/// History-ledger entries for an account, newest first
#[utoipa::path(
    get,
    path = "/api/v1/account/{id}/statement",
    params(
        ("id" = String, Path, description = "Account id"),
        StatementQuery
    ),
    responses(
        (status = 200, description = "Statement", body = ApiEnvelope<Vec<StatementEntry>>),
        (status = 403, description = "Account owned by another user"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Account"
)]
pub async fn get_statement(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<AccountId>,
    Query(query): Query<StatementQuery>,
) -> ApiResult<Vec<StatementEntry>> {
    let account = state
        .ledger
        .account_by_id(id)
        .await
        .map_err(BankError::from)?
        .ok_or(BankError::NotFound("account"))?;
    guard::ensure_owner(&account, caller_id(&claims)?)?;

    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let postings = HistoryRepository::list_for_account(&state.pool, id, limit).await?;
    let entries: Vec<StatementEntry> = postings.into_iter().map(StatementEntry::from).collect();
    response::ok("statement", entries)
}

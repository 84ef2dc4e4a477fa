//! Transfer password management, direct transfers, recharge.

use axum::{Extension, Json, extract::State};
use std::sync::Arc;
use validator::Validate;

use crate::auth::Claims;
use crate::gateway::state::AppState;
use crate::gateway::types::response::{self, ApiResult, validation_error};
use crate::gateway::types::{
    ApiEnvelope, ChangeTransferPasswordRequest, RechargeRequest, SetTransferPasswordRequest,
    TransferPasswordStatus, TransferRequest, TransferView, parse_amount,
};

use super::{caller_account, caller_id};

/// Set the transfer password (first time or reset after support flow)
#[utoipa::path(
    put,
    path = "/api/v1/transfer/password",
    request_body = SetTransferPasswordRequest,
    responses(
        (status = 200, description = "Password set"),
        (status = 400, description = "Invalid input")
    ),
    security(("bearer_jwt" = [])),
    tag = "Transfer"
)]
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SetTransferPasswordRequest>,
) -> ApiResult<()> {
    req.validate().map_err(validation_error)?;
    let account = caller_account(&state, &claims).await?;
    state
        .transfers
        .set_transfer_password(&account.account_number, caller_id(&claims)?, &req.password)
        .await?;
    response::ok_empty("transfer password set")
}

/// Change the transfer password, verifying the old one
#[utoipa::path(
    post,
    path = "/api/v1/transfer/password/change",
    request_body = ChangeTransferPasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Old password incorrect"),
        (status = 409, description = "New password equals old"),
        (status = 412, description = "No transfer password set yet")
    ),
    security(("bearer_jwt" = [])),
    tag = "Transfer"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangeTransferPasswordRequest>,
) -> ApiResult<()> {
    req.validate().map_err(validation_error)?;
    let account = caller_account(&state, &claims).await?;
    state
        .transfers
        .change_transfer_password(
            &account.account_number,
            caller_id(&claims)?,
            &req.old_password,
            &req.new_password,
        )
        .await?;
    response::ok_empty("transfer password changed")
}

/// Whether a transfer password has been set
#[utoipa::path(
    get,
    path = "/api/v1/transfer/password/status",
    responses(
        (status = 200, description = "Status", body = ApiEnvelope<TransferPasswordStatus>)
    ),
    security(("bearer_jwt" = [])),
    tag = "Transfer"
)]
pub async fn password_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<TransferPasswordStatus> {
    let account = caller_account(&state, &claims).await?;
    let is_set = state
        .transfers
        .transfer_password_status(&account.account_number, caller_id(&claims)?)
        .await?;
    response::ok("status", TransferPasswordStatus { is_set })
}

/// Direct transfer to another account by number
#[utoipa::path(
    post,
    path = "/api/v1/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer completed", body = ApiEnvelope<TransferView>),
        (status = 400, description = "Invalid amount or same account"),
        (status = 401, description = "Transfer password incorrect"),
        (status = 404, description = "Destination account not found"),
        (status = 412, description = "No transfer password set"),
        (status = 422, description = "Insufficient funds")
    ),
    security(("bearer_jwt" = [])),
    tag = "Transfer"
)]
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferView> {
    req.validate().map_err(validation_error)?;
    let amount = parse_amount(&req.amount)?;
    let account = caller_account(&state, &claims).await?;

    let outcome = state
        .transfers
        .transfer(
            &account.account_number,
            &req.to_account,
            &req.transfer_password,
            amount,
            caller_id(&claims)?,
        )
        .await?;
    response::ok("transfer completed", TransferView::from(outcome))
}

/// Phone recharge: debits the account, no counterparty credit
#[utoipa::path(
    post,
    path = "/api/v1/transfer/recharge",
    request_body = RechargeRequest,
    responses(
        (status = 200, description = "Recharge completed", body = ApiEnvelope<TransferView>),
        (status = 401, description = "Transfer password incorrect"),
        (status = 412, description = "No transfer password set"),
        (status = 422, description = "Insufficient funds")
    ),
    security(("bearer_jwt" = [])),
    tag = "Transfer"
)]
pub async fn recharge(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RechargeRequest>,
) -> ApiResult<TransferView> {
    req.validate().map_err(validation_error)?;
    let amount = parse_amount(&req.amount)?;
    let account = caller_account(&state, &claims).await?;

    let new_balance = state
        .transfers
        .recharge(
            account.id,
            &req.phone,
            &req.transfer_password,
            amount,
            caller_id(&claims)?,
        )
        .await?;
    response::ok(
        "recharge completed",
        TransferView {
            amount,
            new_balance,
        },
    )
}

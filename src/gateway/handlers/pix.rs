//! PIX keys, QR payment requests, PIX transfers.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Duration;
use std::sync::Arc;
use validator::Validate;

use crate::auth::Claims;
use crate::gateway::state::AppState;
use crate::gateway::types::response::{self, ApiResult, validation_error};
use crate::gateway::types::{
    ApiEnvelope, CreatePixKeyRequest, CreateQrRequest, DeletePixKeyRequest, PayQrRequest,
    PixTransferRequest, QrView, TransferView, parse_amount,
};
use crate::pix::PixKey;
use crate::store::PostingCategory;

use super::{caller_account, caller_id};

/// Register a PIX key on the caller's account
#[utoipa::path(
    post,
    path = "/api/v1/pix/keys",
    request_body = CreatePixKeyRequest,
    responses(
        (status = 201, description = "Key registered", body = ApiEnvelope<PixKey>),
        (status = 400, description = "Missing key value"),
        (status = 409, description = "Key type or value already taken")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn create_key(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePixKeyRequest>,
) -> ApiResult<PixKey> {
    let account = caller_account(&state, &claims).await?;
    let key = state
        .pix_directory
        .create_key(account.id, req.key_type, req.key_value)
        .await?;
    response::created("pix key registered", key)
}

/// List the caller's PIX keys
#[utoipa::path(
    get,
    path = "/api/v1/pix/keys",
    responses(
        (status = 200, description = "Keys", body = ApiEnvelope<Vec<PixKey>>)
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Vec<PixKey>> {
    let account = caller_account(&state, &claims).await?;
    let keys = state.pix_directory.list_keys(account.id).await?;
    response::ok("pix keys", keys)
}

/// Resolve a PIX key to its registered entry
#[utoipa::path(
    get,
    path = "/api/v1/pix/keys/{value}",
    params(("value" = String, Path, description = "Key value")),
    responses(
        (status = 200, description = "Key", body = ApiEnvelope<PixKey>),
        (status = 404, description = "Key not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn get_key(
    State(state): State<Arc<AppState>>,
    Path(value): Path<String>,
) -> ApiResult<PixKey> {
    let key = state.pix_directory.resolve(&value).await?;
    response::ok("pix key", key)
}

/// Remove one of the caller's PIX keys
#[utoipa::path(
    delete,
    path = "/api/v1/pix/keys",
    request_body = DeletePixKeyRequest,
    responses(
        (status = 200, description = "Key removed"),
        (status = 404, description = "Key not found"),
        (status = 409, description = "Key referenced by a pending QR")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DeletePixKeyRequest>,
) -> ApiResult<()> {
    let account = caller_account(&state, &claims).await?;
    state
        .pix_directory
        .delete_key(account.id, &req.key_value)
        .await?;
    response::ok_empty("pix key removed")
}

/// Transfer to a PIX key; destination resolved via the directory
#[utoipa::path(
    post,
    path = "/api/v1/pix/transfer",
    request_body = PixTransferRequest,
    responses(
        (status = 200, description = "Transfer completed", body = ApiEnvelope<TransferView>),
        (status = 400, description = "Invalid amount or same account"),
        (status = 401, description = "Transfer password incorrect"),
        (status = 404, description = "Key not found"),
        (status = 412, description = "No transfer password set"),
        (status = 422, description = "Insufficient funds")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn pix_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PixTransferRequest>,
) -> ApiResult<TransferView> {
    req.validate().map_err(validation_error)?;
    let amount = parse_amount(&req.amount)?;
    let account = caller_account(&state, &claims).await?;

    let key = state.pix_directory.resolve(&req.key).await?;
    let outcome = state
        .transfers
        .transfer_to_account(
            account.id,
            key.account_id,
            &req.transfer_password,
            amount,
            caller_id(&claims)?,
            PostingCategory::Pix,
        )
        .await?;
    response::ok("pix transfer completed", TransferView::from(outcome))
}

/// Create a QR payment request bound to one of the caller's keys
#[utoipa::path(
    post,
    path = "/api/v1/pix/qr",
    request_body = CreateQrRequest,
    responses(
        (status = 201, description = "QR created", body = ApiEnvelope<QrView>),
        (status = 403, description = "Key belongs to another account"),
        (status = 404, description = "Key not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn create_qr(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateQrRequest>,
) -> ApiResult<QrView> {
    req.validate().map_err(validation_error)?;
    let amount = parse_amount(&req.amount)?;
    let account = caller_account(&state, &claims).await?;

    let qr = state
        .pix_qr
        .create_qr(
            account.id,
            caller_id(&claims)?,
            &req.key_value,
            amount,
            Duration::seconds(req.expires_in_seconds),
        )
        .await?;
    response::created("qr created", QrView::from(qr))
}

/// Look up a QR payment request by payload
#[utoipa::path(
    get,
    path = "/api/v1/pix/qr/{payload}",
    params(("payload" = String, Path, description = "Encoded payload")),
    responses(
        (status = 200, description = "QR", body = ApiEnvelope<QrView>),
        (status = 404, description = "QR not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn get_qr(
    State(state): State<Arc<AppState>>,
    Path(payload): Path<String>,
) -> ApiResult<QrView> {
    let qr = state.pix_qr.get_qr(&payload).await?;
    response::ok("qr", QrView::from(qr))
}

/// Remove a still-pending QR payment request
#[utoipa::path(
    delete,
    path = "/api/v1/pix/qr/{payload}",
    params(("payload" = String, Path, description = "Encoded payload")),
    responses(
        (status = 200, description = "QR removed"),
        (status = 404, description = "QR not found"),
        (status = 409, description = "QR already used"),
        (status = 410, description = "QR expired")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn delete_qr(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(payload): Path<String>,
) -> ApiResult<()> {
    state.pix_qr.delete_qr(&payload, caller_id(&claims)?).await?;
    response::ok_empty("qr removed")
}

/// Pay a QR payment request
#[utoipa::path(
    post,
    path = "/api/v1/pix/qr/pay",
    request_body = PayQrRequest,
    responses(
        (status = 200, description = "Payment completed", body = ApiEnvelope<TransferView>),
        (status = 401, description = "Transfer password incorrect"),
        (status = 404, description = "QR not found"),
        (status = 409, description = "QR already used"),
        (status = 410, description = "QR expired"),
        (status = 412, description = "No transfer password set"),
        (status = 422, description = "Insufficient funds")
    ),
    security(("bearer_jwt" = [])),
    tag = "PIX"
)]
pub async fn pay_qr(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PayQrRequest>,
) -> ApiResult<TransferView> {
    let account = caller_account(&state, &claims).await?;
    let outcome = state
        .pix_qr
        .transfer_qr(
            account.id,
            caller_id(&claims)?,
            &req.payload,
            &req.transfer_password,
        )
        .await?;
    response::ok("qr payment completed", TransferView::from(outcome))
}

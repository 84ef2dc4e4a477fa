//! Credit card endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;
use validator::Validate;

use crate::auth::Claims;
use crate::core_types::CardId;
use crate::credit_card::CreditCard;
use crate::gateway::state::AppState;
use crate::gateway::types::response::{self, ApiResult, validation_error};
use crate::gateway::types::{
    AdjustCardLimitRequest, ApiEnvelope, BlockCardRequest, CreateCardRequest, parse_amount,
};

use super::{caller_account, caller_id};

/// Issue a new credit card on the caller's account
#[utoipa::path(
    post,
    path = "/api/v1/cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card issued", body = ApiEnvelope<CreditCard>),
        (status = 400, description = "Invalid input")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn create_card(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCardRequest>,
) -> ApiResult<CreditCard> {
    req.validate().map_err(validation_error)?;
    let account = caller_account(&state, &claims).await?;
    let card = state
        .cards
        .create_card(account.id, caller_id(&claims)?, &req.name, &req.password)
        .await?;
    response::created("card issued", card)
}

/// List the caller's cards
#[utoipa::path(
    get,
    path = "/api/v1/cards",
    responses(
        (status = 200, description = "Cards", body = ApiEnvelope<Vec<CreditCard>>)
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Vec<CreditCard>> {
    let account = caller_account(&state, &claims).await?;
    let cards = state
        .cards
        .list_cards(account.id, caller_id(&claims)?)
        .await?;
    response::ok("cards", cards)
}

/// Block or unblock a card
#[utoipa::path(
    patch,
    path = "/api/v1/cards/{id}/block",
    params(("id" = String, Path, description = "Card id")),
    request_body = BlockCardRequest,
    responses(
        (status = 200, description = "Block flag updated", body = ApiEnvelope<CreditCard>),
        (status = 404, description = "Card not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn block_card(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<CardId>,
    Json(req): Json<BlockCardRequest>,
) -> ApiResult<CreditCard> {
    let card = state
        .cards
        .set_block(id, caller_id(&claims)?, req.blocked)
        .await?;
    response::ok("card block flag updated", card)
}

/// Adjust the card's available amount, guarded by the account's
/// transfer password
#[utoipa::path(
    patch,
    path = "/api/v1/cards/{id}/limit",
    params(("id" = String, Path, description = "Card id")),
    request_body = AdjustCardLimitRequest,
    responses(
        (status = 200, description = "Available amount updated", body = ApiEnvelope<CreditCard>),
        (status = 401, description = "Transfer password incorrect"),
        (status = 404, description = "Card not found"),
        (status = 412, description = "No transfer password set"),
        (status = 422, description = "Outside the used..limit window")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn adjust_limit(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<CardId>,
    Json(req): Json<AdjustCardLimitRequest>,
) -> ApiResult<CreditCard> {
    let new_available = parse_amount(&req.new_available)?;
    let card = state
        .cards
        .adjust_available(id, caller_id(&claims)?, new_available, &req.transfer_password)
        .await?;
    response::ok("card available amount updated", card)
}

/// Delete a card
#[utoipa::path(
    delete,
    path = "/api/v1/cards/{id}",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card deleted"),
        (status = 404, description = "Card not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Cards"
)]
pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<CardId>,
) -> ApiResult<()> {
    state.cards.delete_card(id, caller_id(&claims)?).await?;
    response::ok_empty("card deleted")
}

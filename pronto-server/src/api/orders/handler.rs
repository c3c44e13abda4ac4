//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, AppResult};
use shared::models::{
    ModificationCreate, Order, OrderAudit, OrderCreate, OrderModification, TransitionRequest,
    TransitionResult,
};

use crate::api::run_blocking;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::{ModificationOutcome, TransitionPayload};

/// Place an order for a session (staff on behalf of the table)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let order = run_blocking(move || orders.place_order(req, &actor)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(move || orders.get_order(id)).await?;
    Ok(Json(order))
}

/// Move an order to `to_status` under the token's active scope
pub async fn transition(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(req): Json<TransitionRequest>,
) -> AppResult<Json<TransitionResult>> {
    let actor = user.actor()?;
    let to = req
        .to_status
        .ok_or_else(|| AppError::required_field("to_status"))?;
    let payload = TransitionPayload::from(req);

    let orders = state.orders.clone();
    let result = run_blocking(move || orders.transition(id, to, &actor, payload)).await?;
    Ok(Json(result))
}

/// Transition history, oldest first
pub async fn audit(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Vec<OrderAudit>>> {
    let orders = state.orders.clone();
    let entries = run_blocking(move || {
        orders.get_order(id)?;
        orders.order_audit(id)
    })
    .await?;
    Ok(Json(entries))
}

pub async fn list_modifications(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Vec<OrderModification>>> {
    let orders = state.orders.clone();
    let list = run_blocking(move || orders.list_modifications(id)).await?;
    Ok(Json(list))
}

/// Staff proposal; always pending until the customer reviews it
pub async fn create_modification(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(req): Json<ModificationCreate>,
) -> AppResult<(StatusCode, Json<ModificationOutcome>)> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let outcome = run_blocking(move || orders.create_modification(id, req.changes, &actor)).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn approve_modification(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<ModificationOutcome>> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let outcome = run_blocking(move || orders.approve_modification(id, &actor)).await?;
    Ok(Json(outcome))
}

pub async fn reject_modification(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<ModificationOutcome>> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let outcome = run_blocking(move || orders.reject_modification(id, &actor)).await?;
    Ok(Json(outcome))
}

//! Dining Session API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::{
    DiningSession, FinalizePaymentRequest, MergeSessionsRequest, MergeSessionsResult,
    MoveTableRequest, MoveTableResult, Order, SplitBillDetail, SplitCreate,
};

use crate::api::run_blocking;
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// Open session payload
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub table_id: u64,
}

pub async fn open(
    State(state): State<ServerState>,
    Json(req): Json<OpenSessionRequest>,
) -> AppResult<(StatusCode, Json<DiningSession>)> {
    let orders = state.orders.clone();
    let session = run_blocking(move || orders.open_session(req.table_id)).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<DiningSession>> {
    let orders = state.orders.clone();
    let session = run_blocking(move || orders.get_session(id)).await?;
    Ok(Json(session))
}

pub async fn orders(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.clone();
    let list = run_blocking(move || orders.session_orders(id)).await?;
    Ok(Json(list))
}

/// Move delivered orders to awaiting payment
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<DiningSession>> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let session = run_blocking(move || orders.request_checkout(id, &actor)).await?;
    Ok(Json(session))
}

/// Pay every served order and close the session
pub async fn finalize(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(req): Json<FinalizePaymentRequest>,
) -> AppResult<Json<DiningSession>> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let session = run_blocking(move || orders.finalize_payment(id, req, &actor)).await?;
    Ok(Json(session))
}

pub async fn move_to_table(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<MoveTableRequest>,
) -> AppResult<Json<MoveTableResult>> {
    let orders = state.orders.clone();
    let result = run_blocking(move || orders.move_session_to_table(id, &req.table_number)).await?;
    Ok(Json(result))
}

pub async fn merge(
    State(state): State<ServerState>,
    Json(req): Json<MergeSessionsRequest>,
) -> AppResult<Json<MergeSessionsResult>> {
    let orders = state.orders.clone();
    let result = run_blocking(move || orders.merge_sessions(&req.session_ids)).await?;
    Ok(Json(result))
}

pub async fn create_split(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<SplitCreate>,
) -> AppResult<(StatusCode, Json<SplitBillDetail>)> {
    let orders = state.orders.clone();
    let detail = run_blocking(move || orders.create_split(id, req)).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

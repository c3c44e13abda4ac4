//! Split Bill API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;
use shared::models::{PayPersonRequest, PayPersonResult, SplitBillDetail};

use crate::api::run_blocking;
use crate::auth::CurrentUser;
use crate::core::ServerState;

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<SplitBillDetail>> {
    let orders = state.orders.clone();
    let detail = run_blocking(move || orders.get_split(id)).await?;
    Ok(Json(detail))
}

/// Record one payer's share; the last payment settles the session
pub async fn pay_person(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(person_id): Path<u64>,
    Json(req): Json<PayPersonRequest>,
) -> AppResult<Json<PayPersonResult>> {
    let actor = user.actor()?;
    let orders = state.orders.clone();
    let result =
        run_blocking(move || orders.pay_person(person_id, req.payment_method, &actor)).await?;
    Ok(Json(result))
}

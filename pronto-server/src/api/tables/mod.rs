//! Dining Table API
//!
//! Mounted only on the admin and system consoles.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::DiningTable;

use crate::api::run_blocking;
use crate::core::ServerState;

pub fn routes() -> Router<ServerState> {
    Router::new().route("/tables", post(create))
}

/// Create table payload
#[derive(Debug, Deserialize)]
pub struct TableCreate {
    pub table_number: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    4
}

async fn create(
    State(state): State<ServerState>,
    Json(req): Json<TableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    let orders = state.orders.clone();
    let table = run_blocking(move || orders.add_table(&req.table_number, req.capacity)).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

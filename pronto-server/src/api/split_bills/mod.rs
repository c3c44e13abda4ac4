//! Split Bill API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Routes mounted under every console namespace
pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/split-bills/{id}", get(handler::get_by_id))
        .route("/split-bills/people/{person_id}/pay", post(handler::pay_person))
}

/// Legacy unscoped read routes
pub fn legacy_router() -> Router<ServerState> {
    Router::new().route("/api/split-bills/{id}", get(handler::get_by_id))
}

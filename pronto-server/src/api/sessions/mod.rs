//! Dining Session API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Routes mounted under every console namespace
pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/sessions", post(handler::open))
        .route("/sessions/merge", post(handler::merge))
        .route("/sessions/{id}", get(handler::get_by_id))
        .route("/sessions/{id}/orders", get(handler::orders))
        .route("/sessions/{id}/checkout", post(handler::checkout))
        .route("/sessions/{id}/finalize", post(handler::finalize))
        .route("/sessions/{id}/move", post(handler::move_to_table))
        .route("/sessions/{id}/split-bills", post(handler::create_split))
}

/// Legacy unscoped read routes
pub fn legacy_router() -> Router<ServerState> {
    Router::new()
        .route("/api/sessions/{id}", get(handler::get_by_id))
        .route("/api/sessions/{id}/orders", get(handler::orders))
}

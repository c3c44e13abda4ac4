//! Order API Module
//!
//! Console routes (`/<scope>/api/...`) act on behalf of the token's active
//! scope; the legacy `/api/orders` surface is read-only.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Routes mounted under every console namespace
pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", post(handler::create))
        .route("/orders/{id}", get(handler::get_by_id))
        .route("/orders/{id}/transition", post(handler::transition))
        .route("/orders/{id}/audit", get(handler::audit))
        .route(
            "/orders/{id}/modifications",
            get(handler::list_modifications).post(handler::create_modification),
        )
        .route("/modifications/{id}/approve", post(handler::approve_modification))
        .route("/modifications/{id}/reject", post(handler::reject_modification))
}

/// Legacy unscoped read routes
pub fn legacy_router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/audit", get(handler::audit))
}

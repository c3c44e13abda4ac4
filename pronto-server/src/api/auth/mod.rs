//! Authentication Routes
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/auth/login | POST | 无 |
//! | /api/auth/refresh | POST | 刷新令牌 (限流) |
//! | /api/auth/logout | POST | 无 (总是成功) |
//! | /api/auth/revoke | POST | 刷新令牌 |
//! | /api/auth/me | GET | 访问令牌 |
//! | /api/auth/switch-scope | POST | 访问令牌 |
//! | /<scope>/api/auth/me | GET | 访问令牌 + 作用域 |

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::refresh_rate_limit;
use crate::core::ServerState;

/// Build authentication router
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Token lifecycle - exempt from require_auth and the scope guard
        .route("/api/auth/login", post(handler::login))
        .route(
            "/api/auth/refresh",
            post(handler::refresh).layer(middleware::from_fn_with_state(
                state.clone(),
                refresh_rate_limit,
            )),
        )
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/revoke", post(handler::revoke))
        // Protected routes (handled by global require_auth middleware)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/switch-scope", post(handler::switch_scope))
}

/// Routes mounted under every console namespace
pub fn console_routes() -> Router<ServerState> {
    Router::new().route("/auth/me", get(handler::me))
}

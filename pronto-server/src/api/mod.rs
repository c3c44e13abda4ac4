//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公共)
//! - [`auth`] - 登录、令牌刷新 / 撤销、作用域切换
//! - [`orders`] - 订单、状态迁移、改单
//! - [`sessions`] - 用餐会话、结账、换桌、并桌
//! - [`split_bills`] - 分单
//! - [`tables`] - 桌台 (admin / system 控制台)
//!
//! # 命名空间
//!
//! 每个控制台挂在 `/<scope>/api` 下，路由集合相同；令牌的 `active_scope`
//! 必须与命名空间一致，工作流按该 scope 判定动作者。`/api/...` 只保留
//! 只读接口，不做作用域检查。

use axum::{Router, middleware};
use shared::error::AppError;
use shared::models::Scope;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_role, require_scope};
use crate::core::ServerState;

pub mod auth;
pub mod health;
pub mod orders;
pub mod sessions;
pub mod split_bills;
pub mod tables;

/// 在阻塞线程池中执行存储 / 密码哈希调用
///
/// redb 写事务会互相等待，不能占住 async 工作线程。
pub(crate) async fn run_blocking<T, E, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(Into::into)
}

/// 单个控制台的路由，要求持有该控制台对应的角色
fn console_router(scope: Scope) -> Router<ServerState> {
    let mut router = Router::new()
        .merge(auth::console_routes())
        .merge(orders::routes())
        .merge(sessions::routes())
        .merge(split_bills::routes());
    if scope.is_administrative() {
        router = router.merge(tables::routes());
    }
    router.route_layer(middleware::from_fn(require_role(scope.role())))
}

/// Build a router with all routes registered (no global middleware)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    let mut router = Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(orders::legacy_router())
        .merge(sessions::legacy_router())
        .merge(split_bills::legacy_router());

    for scope in Scope::ALL {
        router = router.nest(&format!("/{}/api", scope), console_router(scope));
    }
    router
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: &ServerState) -> Router {
    build_router(state)
        // 作用域守卫 - 在认证之后执行
        .layer(middleware::from_fn(require_scope))
        // JWT 认证 - 注入 CurrentUser
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone())
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

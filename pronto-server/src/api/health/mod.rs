//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 (含数据库读) | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use shared::models::DiningTable;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    /// 版本号
    version: &'static str,
    environment: String,
    /// 数据库状态 (ok | error)
    database: &'static str,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let store = state.store.clone();
    let database = match tokio::task::spawn_blocking(move || store.list::<DiningTable>()).await {
        Ok(Ok(_)) => "ok",
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Health check: database read failed");
            "error"
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check: task failed");
            "error"
        }
    };

    Json(HealthResponse {
        status: if database == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        database,
    })
}

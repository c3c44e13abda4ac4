//! Pronto Server - 桌台服务餐厅核心
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT 访问 / 刷新令牌、撤销表、作用域守卫、角色策略
//! - **订单** (`orders`): 订单状态机、改单引擎、分单结算、会话操作
//! - **存储** (`store`): 嵌入式 redb，每个业务操作一个写事务
//! - **HTTP API** (`api`): 各控制台 `/<scope>/api/...` 路由
//!
//! # 模块结构
//!
//! ```text
//! pronto-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # 令牌、作用域、角色、中间件
//! ├── orders/        # 状态机、改单、分单、会话
//! ├── store/         # redb 存储层
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod orders;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService, TokenService};
pub use core::{Config, Server, ServerError, ServerState};
pub use orders::{Actor, OrderService};
pub use shared::error::{Ack, AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
pub use store::Store;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 `.env`，按 `LOG_LEVEL` / `LOG_DIR` / `LOG_JSON` 初始化日志
pub fn setup_environment() {
    if let Err(e) = dotenv::dotenv() {
        // .env 文件可选
        eprintln!("No .env file loaded: {}", e);
    }

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    let json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ____                  __
   / __ \_________  ____ / /_____
  / /_/ / ___/ __ \/ __ \/ __/ __ \
 / ____/ /  / /_/ / / / / /_/ /_/ /
/_/   /_/   \____/_/ /_/\__/\____/
    "#
    );
}

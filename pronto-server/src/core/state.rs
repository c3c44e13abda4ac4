use std::sync::Arc;
use std::time::Duration;

use crate::auth::{JwtService, RateLimiter, RedbRevocationStore, TokenService};
use crate::core::{Config, Result};
use crate::orders::{BroadcastNotifier, OrderService};
use crate::store::Store;

/// 撤销表和限流表的清理周期
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Store | redb 存储 |
/// | tokens | TokenService | 令牌签发 / 轮换 / 撤销 |
/// | orders | OrderService | 订单、会话、改单、分单 |
/// | notifier | Arc<BroadcastNotifier> | 工作流通知 |
/// | rate_limiter | Arc<RateLimiter> | 刷新令牌限流 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// redb 存储
    pub store: Store,
    /// 令牌服务 (撤销表持久化在 store 中)
    pub tokens: TokenService,
    /// 订单业务入口
    pub orders: OrderService,
    /// 通知广播
    pub notifier: Arc<BroadcastNotifier>,
    /// 刷新令牌限流
    pub rate_limiter: Arc<RateLimiter>,
}

impl ServerState {
    /// 在已打开的存储上组装全部服务
    pub fn new(config: Config, store: Store) -> Self {
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let tokens = TokenService::new(
            jwt,
            Arc::new(RedbRevocationStore::new(store.clone())),
            Arc::new(store.clone()),
        );

        let notifier = Arc::new(BroadcastNotifier::default());
        let orders = OrderService::new(
            store.clone(),
            Arc::new(store.clone()),
            notifier.clone(),
            config.tax_policy(),
            config.workflow_policy(),
        );

        let rate_limiter = Arc::new(RateLimiter::new(
            config.refresh_rate_limit,
            config.refresh_rate_window(),
        ));

        Self {
            config,
            store,
            tokens,
            orders,
            notifier,
            rate_limiter,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 工作目录 (确保存在)
    /// 2. 数据库 (work_dir/pronto.redb)
    /// 3. 各服务
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.database_path();
        let store = Store::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        Ok(Self::new(config.clone(), store))
    }

    /// 启动后台任务
    ///
    /// - 定期清除已过期的撤销记录
    /// - 定期清除过期的限流窗口
    pub fn start_background_tasks(&self) {
        let tokens = self.tokens.clone();
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let now = chrono::Utc::now().timestamp();
                match tokens.revocations().purge_expired(now) {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "Expired revocations purged"),
                    Err(e) => tracing::warn!(error = %e, "Revocation purge failed"),
                }
                rate_limiter.cleanup();
            }
        });
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> &JwtService {
        self.tokens.jwt()
    }
}

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{JwtConfig, JwtError};
use crate::orders::{TaxPolicy, WorkflowPolicy};

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/pronto | 工作目录 (数据库) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录，设置后按天滚动写文件 |
/// | TAX_RATE | 0.16 | 税率 |
/// | TAX_INCLUDED | false | 菜单价格是否含税 |
/// | WAITER_CAN_COLLECT | true | 服务员是否可以收款 |
/// | REFRESH_RATE_LIMIT | 10 | 刷新令牌窗口内最大次数 |
/// | REFRESH_RATE_WINDOW_SECS | 60 | 刷新令牌限流窗口 (秒) |
/// | COOKIE_SECURE | production 时为 true | 令牌 cookie 是否带 `Secure` |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pronto HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// JWT 认证配置
    pub jwt: JwtConfig,

    // === 业务配置 ===
    pub tax_rate: f64,
    pub tax_included: bool,
    pub waiter_can_collect: bool,

    // === 刷新令牌限流 ===
    pub refresh_rate_limit: u32,
    pub refresh_rate_window_secs: u64,

    pub cookie_secure: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值。生产环境缺少 `JWT_SECRET` 时失败。
    pub fn from_env() -> Result<Self, JwtError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/pronto".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            jwt: JwtConfig::from_env()?,
            tax_rate: env_parse("TAX_RATE", 0.16),
            tax_included: env_parse("TAX_INCLUDED", false),
            waiter_can_collect: env_parse("WAITER_CAN_COLLECT", true),
            refresh_rate_limit: env_parse("REFRESH_RATE_LIMIT", 10),
            refresh_rate_window_secs: env_parse("REFRESH_RATE_WINDOW_SECS", 60),
            cookie_secure: env_parse("COOKIE_SECURE", is_production),
            environment,
        })
    }

    /// 固定 JWT 密钥、默认业务配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16, jwt: JwtConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
            jwt,
            tax_rate: 0.16,
            tax_included: false,
            waiter_can_collect: true,
            refresh_rate_limit: 10,
            refresh_rate_window_secs: 60,
            cookie_secure: false,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 数据库文件路径: work_dir/pronto.redb
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("pronto.redb")
    }

    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy::new(self.tax_rate, self.tax_included)
    }

    pub fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            waiter_can_collect: self.waiter_can_collect,
        }
    }

    pub fn refresh_rate_window(&self) -> Duration {
        Duration::from_secs(self.refresh_rate_window_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = Config::with_overrides("/tmp/pronto", 8080, JwtConfig::with_secret("s"));
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/pronto/pronto.redb"));
        assert!(!config.is_production());
        assert_eq!(config.refresh_rate_window(), Duration::from_secs(60));
        assert!(config.workflow_policy().waiter_can_collect);
    }

    #[test]
    fn test_env_parse_fallback() {
        assert_eq!(env_parse("PRONTO_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}

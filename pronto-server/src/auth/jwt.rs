//! JWT 令牌服务
//!
//! 访问令牌携带完整身份；刷新令牌只携带 `sub` + `jti` + 过期时间，
//! 仅用于换发新的令牌对。

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use shared::models::{Employee, Role, Scope, deserialize_roles};
use thiserror::Error;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (至少 32 字节)
    pub secret: String,
    /// 访问令牌有效期 (分钟)
    pub access_minutes: i64,
    /// 刷新令牌有效期 (天)
    pub refresh_days: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl JwtConfig {
    /// 从环境变量加载
    ///
    /// | 变量 | 默认值 |
    /// |------|--------|
    /// | `JWT_SECRET` | 开发环境随机生成；生产环境必须设置 |
    /// | `JWT_ACCESS_MINUTES` | 15 |
    /// | `JWT_REFRESH_DAYS` | 7 |
    /// | `JWT_ISSUER` | pronto-server |
    /// | `JWT_AUDIENCE` | pronto-consoles |
    pub fn from_env() -> Result<Self, JwtError> {
        let secret = String::from_utf8(load_jwt_secret()?)
            .map_err(|_| JwtError::ConfigError("JWT_SECRET must be valid UTF-8".to_string()))?;

        Ok(Self {
            secret,
            access_minutes: env_i64("JWT_ACCESS_MINUTES", 15),
            refresh_days: env_i64("JWT_REFRESH_DAYS", 7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pronto-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "pronto-consoles".to_string()),
        })
    }

    /// 固定密钥的配置 (测试、嵌入式部署)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_minutes: 15,
            refresh_days: 7,
            issuer: "pronto-server".to_string(),
            audience: "pronto-consoles".to_string(),
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// 访问令牌 Claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 员工 ID
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub additional_roles: BTreeSet<Role>,
    #[serde(default)]
    pub active_scope: Option<Scope>,
    pub token_type: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// 刷新令牌 Claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub token_type: String,
    /// 撤销标识
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl RefreshClaims {
    pub fn employee_id(&self) -> Result<u64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("subject is not an employee id".to_string()))
    }
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌类型错误: 需要 {expected}")]
    WrongTokenType { expected: &'static str },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> Result<String, JwtError> {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let mut bytes = [0u8; 64];
    SystemRandom::new().fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(bytes
        .iter()
        .map(|b| ALLOWED[*b as usize % ALLOWED.len()] as char)
        .collect())
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret() -> Result<Vec<u8>, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret.into_bytes())
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "⚠️  JWT_SECRET not set! Generating secure temporary key for development."
                );
                Ok(generate_secure_printable_jwt_secret()?.into_bytes())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production!".to_string(),
                ))
            }
        }
    }
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// 访问令牌有效期 (秒)
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_minutes * 60
    }

    /// 为员工签发访问令牌
    pub fn issue_access(
        &self,
        employee: &Employee,
        active_scope: Option<Scope>,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: employee.id.to_string(),
            name: employee.display_name.clone(),
            email: employee.email.clone(),
            role: employee.primary_role,
            additional_roles: employee.additional_roles.clone(),
            active_scope,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.access_minutes)).timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        self.encode(&claims)
    }

    /// 签发刷新令牌，返回令牌与其 Claims (调用方需要 jti/exp)
    pub fn issue_refresh(&self, employee_id: u64) -> Result<(String, RefreshClaims), JwtError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: employee_id.to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.refresh_days)).timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        Ok((self.encode(&claims)?, claims))
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<T>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 验证访问令牌
    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let claims: AccessClaims = self.decode(token).map_err(|e| match e {
            // 刷新令牌缺少身份字段，解码失败
            JwtError::InvalidToken(_) if self.peek_type(token) == Some(REFRESH_TOKEN_TYPE) => {
                JwtError::WrongTokenType {
                    expected: ACCESS_TOKEN_TYPE,
                }
            }
            other => other,
        })?;
        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(JwtError::WrongTokenType {
                expected: ACCESS_TOKEN_TYPE,
            });
        }
        Ok(claims)
    }

    /// 验证刷新令牌
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        let claims: RefreshClaims = self.decode(token)?;
        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(JwtError::WrongTokenType {
                expected: REFRESH_TOKEN_TYPE,
            });
        }
        Ok(claims)
    }

    fn peek_type(&self, token: &str) -> Option<&'static str> {
        #[derive(Deserialize)]
        struct TypeOnly {
            token_type: String,
        }
        match self.decode::<TypeOnly>(token).ok()?.token_type.as_str() {
            ACCESS_TOKEN_TYPE => Some(ACCESS_TOKEN_TYPE),
            REFRESH_TOKEN_TYPE => Some(REFRESH_TOKEN_TYPE),
            _ => None,
        }
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// 当前用户上下文 (从访问令牌解析)
///
/// 由认证中间件创建并注入请求扩展。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: u64,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub additional_roles: BTreeSet<Role>,
    pub active_scope: Option<Scope>,
    pub token_id: String,
}

impl TryFrom<AccessClaims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("subject is not an employee id".to_string()))?;
        Ok(Self {
            id,
            display_name: claims.name,
            email: claims.email,
            role: claims.role,
            additional_roles: claims.additional_roles,
            active_scope: claims.active_scope,
            token_id: claims.jti,
        })
    }
}

impl CurrentUser {
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            additional_roles: self.additional_roles.clone(),
            active_scope: self.active_scope,
        }
    }
}

//! 认证授权模块
//!
//! 提供令牌签发与轮换、作用域守卫、角色策略和中间件：
//! - [`JwtService`] - 访问 / 刷新令牌编解码
//! - [`TokenService`] - 登录、刷新轮换、撤销、作用域切换
//! - [`RevocationStore`] - 刷新令牌撤销表
//! - [`scope_guard`] - `/<scope>/api/...` 命名空间检查
//! - [`role_policy`] - 扁平角色检查 (super_admin 例外)
//! - [`require_auth`] / [`require_scope`] / [`require_role`] - 中间件

pub mod cookies;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod rate_limit;
pub mod revocation;
pub mod scope;
pub mod tokens;

pub use jwt::{AccessClaims, CurrentUser, JwtConfig, JwtError, JwtService, RefreshClaims};
pub use middleware::{require_auth, require_role, require_scope};
pub use policy::{RoleHolder, can_assume_scope, role_policy};
pub use rate_limit::{RateLimiter, refresh_rate_limit};
pub use revocation::{
    InMemoryRevocationStore, RedbRevocationStore, RevocationError, RevocationStore,
};
pub use scope::{ScopeDecision, scope_guard};
pub use tokens::{AuthError, EmployeeDirectory, IssuedTokens, TokenService, register_employee};

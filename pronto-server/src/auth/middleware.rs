//! 认证中间件
//!
//! 为 JWT 认证、作用域守卫和角色检查提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, Scope};

use crate::auth::scope::{self, ScopeDecision};
use crate::auth::{CurrentUser, JwtError, cookies, role_policy};
use crate::core::ServerState;
use crate::security_log;

/// API 路径: `/api/...` 或 `/<scope>/api/...`
fn is_api_path(path: &str) -> bool {
    if path.starts_with("/api/") {
        return true;
    }
    Scope::from_path(path).is_some_and(|s| {
        path.trim_start_matches('/')
            .strip_prefix(s.as_str())
            .is_some_and(|rest| rest.starts_with("/api/"))
    })
}

/// 认证中间件 - 要求用户登录
///
/// 令牌优先取 `Authorization: Bearer <token>`，其次取 `access_token` cookie。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 API 路径 (让它们正常返回 404)
/// - login / logout / refresh / revoke
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无令牌 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 / 刷新令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !is_api_path(path) || scope::is_exempt(path) {
        return Ok(next.run(req).await);
    }

    let Some(token) = cookies::access_token_from(req.headers()) else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::unauthorized());
    };

    match state.get_jwt_service().validate_access(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 作用域守卫中间件
///
/// 必须在 [`require_auth`] 之后执行。`/<scope>/api/...` 要求令牌的
/// `active_scope` 与命名空间完全一致，其他角色不能代替。
pub async fn require_scope(req: Request, next: Next) -> Result<Response, AppError> {
    let path = req.uri().path();
    if !is_api_path(path) {
        return Ok(next.run(req).await);
    }

    let active_scope = req.extensions().get::<CurrentUser>().and_then(|u| u.active_scope);
    let decision = scope::scope_guard(path, active_scope);
    match decision {
        ScopeDecision::Exempt | ScopeDecision::Unscoped => Ok(next.run(req).await),
        ScopeDecision::Allow(_) => {
            if req.extensions().get::<CurrentUser>().is_none() {
                return Err(AppError::unauthorized());
            }
            Ok(next.run(req).await)
        }
        denied => {
            let user_id = req.extensions().get::<CurrentUser>().map(|u| u.id).unwrap_or_default();
            security_log!(
                "WARN",
                "scope_denied",
                user_id = user_id,
                decision = format!("{:?}", denied),
                uri = format!("{:?}", req.uri())
            );
            Err(denied
                .into_error()
                .unwrap_or_else(|| AppError::new(ErrorCode::ScopeMismatch)))
        }
    }
}

/// 角色检查中间件 - 要求特定角色
///
/// 角色是扁平的: `admin` 不隐含 `waiter`。只有 `super_admin` 绕过检查。
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/orders/{id}/transition", post(handler::transition))
///     .route_layer(middleware::from_fn(require_role(Role::Waiter)));
/// ```
///
/// # 错误
///
/// 角色不足返回 403 RoleRequired
pub fn require_role(
    role: Role,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !role_policy(user, role) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id,
                    user_role = user.role.as_str(),
                    required_role = role.as_str()
                );
                return Err(AppError::role_required(role));
            }

            Ok(next.run(req).await)
        })
    }
}

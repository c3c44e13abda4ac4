//! 作用域守卫
//!
//! A console route `/<scope>/api/...` requires the token's active scope to be
//! exactly `<scope>`, whatever other roles the identity holds. Legacy `/api/...`
//! routes are not scope-checked.
//!
//! | 情况 | 结果 |
//! |------|------|
//! | login / logout / refresh / revoke | exempt |
//! | `/api/...` | unscoped |
//! | active scope == namespace | allow |
//! | active scope != namespace | 403 `ScopeMismatch` |
//! | no active scope | 401 `ScopeMissing` |

use shared::error::AppError;
use shared::models::Scope;

/// Token lifecycle routes that bypass authentication and the scope guard
pub const EXEMPT_ROUTES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/logout",
    "/api/auth/refresh",
    "/api/auth/revoke",
];

/// Guard decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDecision {
    Exempt,
    /// Not a console namespace
    Unscoped,
    Allow(Scope),
    Mismatch { required: Scope, active: Scope },
    Missing { required: Scope },
}

impl ScopeDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Mismatch { .. } | Self::Missing { .. })
    }

    /// Denial as a response error; `None` when the request may proceed
    pub fn into_error(self) -> Option<AppError> {
        match self {
            Self::Mismatch { required, active } => Some(AppError::scope_mismatch(required, active)),
            Self::Missing { required } => Some(AppError::scope_missing(Some(required))),
            _ => None,
        }
    }
}

pub fn is_exempt(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    EXEMPT_ROUTES.contains(&path)
}

/// Decide whether a request to `path` may run under `active_scope`
pub fn scope_guard(path: &str, active_scope: Option<Scope>) -> ScopeDecision {
    if is_exempt(path) {
        return ScopeDecision::Exempt;
    }
    let Some(required) = Scope::from_path(path) else {
        return ScopeDecision::Unscoped;
    };
    match active_scope {
        Some(active) if active == required => ScopeDecision::Allow(required),
        Some(active) => ScopeDecision::Mismatch { required, active },
        None => ScopeDecision::Missing { required },
    }
}

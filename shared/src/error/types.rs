//! Request-boundary error and the JSON bodies it renders to

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use crate::models::{OrderStatus, Role, Scope};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every handler
///
/// Renders as `{code, message, details}`; `details` carries the machine
/// readable context (missing field, statuses, scopes).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's stock message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach the `from` / `to` statuses of a rejected transition
    pub fn with_statuses(self, from: OrderStatus, to: OrderStatus) -> Self {
        self.with_detail("from", from.as_str())
            .with_detail("to", to.as_str())
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ========== 通用 ==========

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `<field> is required`, naming the field in `details.field`
    pub fn required_field(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{} is required", field))
            .with_detail("field", field)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn too_many_requests() -> Self {
        Self::new(ErrorCode::TooManyRequests)
    }

    // ========== 令牌 ==========

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn token_revoked() -> Self {
        Self::new(ErrorCode::TokenRevoked)
    }

    // ========== 作用域 / 角色 ==========

    /// Token scope does not match the console namespace
    pub fn scope_mismatch(required: Scope, active: Scope) -> Self {
        Self::with_message(
            ErrorCode::ScopeMismatch,
            format!("token scope '{}' cannot access the {} console", active, required),
        )
        .with_detail("required_scope", required.as_str())
        .with_detail("active_scope", active.as_str())
    }

    /// Token carries no active scope; `required` names the console when known
    pub fn scope_missing(required: Option<Scope>) -> Self {
        match required {
            Some(required) => Self::with_message(
                ErrorCode::ScopeMissing,
                format!("token has no active scope for the {} console", required),
            )
            .with_detail("required_scope", required.as_str()),
            None => Self::with_message(ErrorCode::ScopeMissing, "token has no active scope"),
        }
    }

    pub fn role_required(role: Role) -> Self {
        Self::with_message(ErrorCode::RoleRequired, format!("Role required: {}", role))
            .with_detail("required_role", role.as_str())
    }

    /// Error body as sent on the wire
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code,
            message: self.message.clone(),
            details: self.details.clone(),
        }
    }
}

/// `{code, message, details}` body of a failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

/// Body of a successful call with nothing to return (logout, revoke)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub code: ErrorCode,
    pub message: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            code: ErrorCode::Success,
            message: "OK".to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }
        (self.http_status(), axum::Json(self.body())).into_response()
    }
}

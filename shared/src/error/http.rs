//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::ModificationNotFound
            | Self::SplitNotFound
            | Self::SplitPersonNotFound
            | Self::MenuItemNotFound
            | Self::TableNotFound
            | Self::SessionNotFound
            | Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderFinalState
            | Self::InvalidTransition
            | Self::AlreadyInStatus
            | Self::OrderNotModifiable
            | Self::ModificationAlreadyReviewed
            | Self::OrderNotSettleable
            | Self::SplitAlreadyCompleted
            | Self::SplitAlreadyActive
            | Self::SplitPersonAlreadyPaid
            | Self::SessionAlreadyPaid
            | Self::TableOccupied
            | Self::SessionNotOpen => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::TokenRevoked
            | Self::ScopeMissing
            | Self::IdentityInactive => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::ScopeMismatch
            | Self::CancellationForbidden => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

//! Unified error codes for the Pronto workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment / split-bill errors
//! - 6xxx: Menu errors
//! - 7xxx: Table / dining session errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the staff consoles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests in the current window
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Token has been revoked
    TokenRevoked = 1005,
    /// Token carries no active scope
    ScopeMissing = 1006,
    /// Employee is inactive or no longer exists
    IdentityInactive = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Active scope does not match the console namespace
    ScopeMismatch = 2003,
    /// Actor may not cancel the order in its current status
    CancellationForbidden = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is in a final status
    OrderFinalState = 4002,
    /// Transition not allowed from the current status
    InvalidTransition = 4003,
    /// Order is already in the requested status
    AlreadyInStatus = 4004,
    /// Order can no longer be modified in place
    OrderNotModifiable = 4005,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Justification required for this transition
    JustificationRequired = 4008,
    /// Order modification not found
    ModificationNotFound = 4009,
    /// Order modification already reviewed
    ModificationAlreadyReviewed = 4010,
    /// Order cannot be settled yet
    OrderNotSettleable = 4011,

    // ==================== 5xxx: Payment ====================
    /// Payment method is required
    PaymentMethodRequired = 5001,
    /// Split bill not found
    SplitNotFound = 5002,
    /// Split bill person not found
    SplitPersonNotFound = 5003,
    /// Split bill already completed
    SplitAlreadyCompleted = 5004,
    /// Session already has an active split bill
    SplitAlreadyActive = 5005,
    /// Split bill person already paid
    SplitPersonAlreadyPaid = 5006,
    /// Split amounts do not add up to the session total
    SplitAmountMismatch = 5007,
    /// Session already paid
    SessionAlreadyPaid = 5008,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is not available
    MenuItemUnavailable = 6002,

    // ==================== 7xxx: Table / Session ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied
    TableOccupied = 7002,
    /// Dining session not found
    SessionNotFound = 7003,
    /// Dining session is not open
    SessionNotOpen = 7004,
    /// Source and target table are the same
    SameTable = 7005,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TokenRevoked => "Authentication token has been revoked",
            ErrorCode::ScopeMissing => "Token has no active scope",
            ErrorCode::IdentityInactive => "Employee is inactive or no longer exists",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::ScopeMismatch => "Token scope does not match the requested console",
            ErrorCode::CancellationForbidden => "Order cannot be cancelled by this actor",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderFinalState => "Order is in a final status",
            ErrorCode::InvalidTransition => "Status transition is not allowed",
            ErrorCode::AlreadyInStatus => "Order is already in the requested status",
            ErrorCode::OrderNotModifiable => "Order can no longer be modified",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::JustificationRequired => "Justification is required",
            ErrorCode::ModificationNotFound => "Order modification not found",
            ErrorCode::ModificationAlreadyReviewed => "Order modification was already reviewed",
            ErrorCode::OrderNotSettleable => "Order cannot be settled in its current status",

            // Payment
            ErrorCode::PaymentMethodRequired => "payment_method is required",
            ErrorCode::SplitNotFound => "Split bill not found",
            ErrorCode::SplitPersonNotFound => "Split bill person not found",
            ErrorCode::SplitAlreadyCompleted => "Split bill already completed",
            ErrorCode::SplitAlreadyActive => "Session already has an active split bill",
            ErrorCode::SplitPersonAlreadyPaid => "Split bill person already paid",
            ErrorCode::SplitAmountMismatch => "Split amounts do not match the session total",
            ErrorCode::SessionAlreadyPaid => "Dining session already paid",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",

            // Table / Session
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is already occupied",
            ErrorCode::SessionNotFound => "Dining session not found",
            ErrorCode::SessionNotOpen => "Dining session is not open",
            ErrorCode::SameTable => "Session is already at that table",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,
            9 => ErrorCode::TooManyRequests,

            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1005 => ErrorCode::TokenRevoked,
            1006 => ErrorCode::ScopeMissing,
            1007 => ErrorCode::IdentityInactive,

            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::RoleRequired,
            2003 => ErrorCode::ScopeMismatch,
            2004 => ErrorCode::CancellationForbidden,

            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderFinalState,
            4003 => ErrorCode::InvalidTransition,
            4004 => ErrorCode::AlreadyInStatus,
            4005 => ErrorCode::OrderNotModifiable,
            4006 => ErrorCode::OrderItemNotFound,
            4007 => ErrorCode::OrderEmpty,
            4008 => ErrorCode::JustificationRequired,
            4009 => ErrorCode::ModificationNotFound,
            4010 => ErrorCode::ModificationAlreadyReviewed,
            4011 => ErrorCode::OrderNotSettleable,

            5001 => ErrorCode::PaymentMethodRequired,
            5002 => ErrorCode::SplitNotFound,
            5003 => ErrorCode::SplitPersonNotFound,
            5004 => ErrorCode::SplitAlreadyCompleted,
            5005 => ErrorCode::SplitAlreadyActive,
            5006 => ErrorCode::SplitPersonAlreadyPaid,
            5007 => ErrorCode::SplitAmountMismatch,
            5008 => ErrorCode::SessionAlreadyPaid,

            6001 => ErrorCode::MenuItemNotFound,
            6002 => ErrorCode::MenuItemUnavailable,

            7001 => ErrorCode::TableNotFound,
            7002 => ErrorCode::TableOccupied,
            7003 => ErrorCode::SessionNotFound,
            7004 => ErrorCode::SessionNotOpen,
            7005 => ErrorCode::SameTable,

            8001 => ErrorCode::EmployeeNotFound,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9005 => ErrorCode::ConfigError,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

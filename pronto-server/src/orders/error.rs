use crate::store::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::models::{ModificationStatus, OrderStatus, SessionStatus};
use thiserror::Error;

/// Order domain errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    #[error("Dining session not found: {0}")]
    SessionNotFound(u64),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(u64),

    #[error("Menu item is not available: {0}")]
    MenuItemUnavailable(u64),

    #[error("Order item not found: {0}")]
    ItemNotFound(u64),

    #[error("Order modification not found: {0}")]
    ModificationNotFound(u64),

    #[error("Split bill not found: {0}")]
    SplitNotFound(u64),

    #[error("Split bill person not found: {0}")]
    SplitPersonNotFound(u64),

    #[error("Order {order_id} is already {status} and cannot change")]
    FinalState { order_id: u64, status: OrderStatus },

    #[error("Order is already {0}")]
    AlreadyInStatus(OrderStatus),

    #[error("Transition {from} -> {to} is not allowed")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("{actor} may not move an order to {to}")]
    RoleDenied { actor: String, to: OrderStatus },

    #[error("{actor} may not cancel an order in {status}")]
    CancellationForbidden { actor: String, status: OrderStatus },

    #[error("Order does not belong to this customer")]
    NotOrderOwner,

    #[error("{0}")]
    PermissionDenied(String),

    #[error("payment_method is required")]
    PaymentMethodRequired,

    #[error("justification is required for {from} -> {to} under an administrative scope")]
    JustificationRequired { from: OrderStatus, to: OrderStatus },

    #[error("Order in {0} can no longer be modified")]
    NotModifiable(OrderStatus),

    #[error("Order must keep at least one item")]
    OrderEmpty,

    #[error("{0}")]
    Validation(String),

    #[error("Order modification already {0:?}")]
    AlreadyReviewed(ModificationStatus),

    #[error("Dining session {id} is {status:?}")]
    SessionNotOpen { id: u64, status: SessionStatus },

    #[error("Dining session already paid: {0}")]
    SessionAlreadyPaid(u64),

    #[error("Order {order_id} in {status} cannot be settled yet")]
    NotSettleable { order_id: u64, status: OrderStatus },

    #[error("Table {0} is already occupied")]
    TableOccupied(String),

    #[error("Session is already at table {0}")]
    SameTable(String),

    #[error("Session already has an active split bill")]
    SplitAlreadyActive,

    #[error("Split bill already completed")]
    SplitAlreadyCompleted,

    #[error("Split bill person already paid: {0}")]
    SplitPersonAlreadyPaid(u64),

    #[error("Split amounts sum to {actual}, session total is {expected}")]
    SplitAmountMismatch { expected: f64, actual: f64 },
}

pub type OrderResult<T> = Result<T, OrderError>;

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::Storage(_) => ErrorCode::DatabaseError,
            OrderError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            OrderError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            OrderError::TableNotFound(_) => ErrorCode::TableNotFound,
            OrderError::MenuItemNotFound(_) => ErrorCode::MenuItemNotFound,
            OrderError::MenuItemUnavailable(_) => ErrorCode::MenuItemUnavailable,
            OrderError::ItemNotFound(_) => ErrorCode::OrderItemNotFound,
            OrderError::ModificationNotFound(_) => ErrorCode::ModificationNotFound,
            OrderError::SplitNotFound(_) => ErrorCode::SplitNotFound,
            OrderError::SplitPersonNotFound(_) => ErrorCode::SplitPersonNotFound,
            OrderError::FinalState { .. } => ErrorCode::OrderFinalState,
            OrderError::AlreadyInStatus(_) => ErrorCode::AlreadyInStatus,
            OrderError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            OrderError::RoleDenied { .. } => ErrorCode::RoleRequired,
            OrderError::CancellationForbidden { .. } => ErrorCode::CancellationForbidden,
            OrderError::NotOrderOwner | OrderError::PermissionDenied(_) => {
                ErrorCode::PermissionDenied
            }
            OrderError::PaymentMethodRequired => ErrorCode::PaymentMethodRequired,
            OrderError::JustificationRequired { .. } => ErrorCode::JustificationRequired,
            OrderError::NotModifiable(_) => ErrorCode::OrderNotModifiable,
            OrderError::OrderEmpty => ErrorCode::OrderEmpty,
            OrderError::Validation(_) => ErrorCode::ValidationFailed,
            OrderError::AlreadyReviewed(_) => ErrorCode::ModificationAlreadyReviewed,
            OrderError::SessionNotOpen { .. } => ErrorCode::SessionNotOpen,
            OrderError::SessionAlreadyPaid(_) => ErrorCode::SessionAlreadyPaid,
            OrderError::NotSettleable { .. } => ErrorCode::OrderNotSettleable,
            OrderError::TableOccupied(_) => ErrorCode::TableOccupied,
            OrderError::SameTable(_) => ErrorCode::SameTable,
            OrderError::SplitAlreadyActive => ErrorCode::SplitAlreadyActive,
            OrderError::SplitAlreadyCompleted => ErrorCode::SplitAlreadyCompleted,
            OrderError::SplitPersonAlreadyPaid(_) => ErrorCode::SplitPersonAlreadyPaid,
            OrderError::SplitAmountMismatch { .. } => ErrorCode::SplitAmountMismatch,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let code = err.code();
        let app = AppError::with_message(code, err.to_string());
        match err {
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                app
            }
            OrderError::PaymentMethodRequired => app.with_detail("field", "payment_method"),
            OrderError::JustificationRequired { from, to } => app
                .with_detail("field", "justification")
                .with_statuses(from, to),
            OrderError::InvalidTransition { from, to } => app.with_statuses(from, to),
            OrderError::FinalState { order_id, status } => app
                .with_detail("order_id", order_id)
                .with_detail("status", status.as_str()),
            OrderError::AlreadyInStatus(status) => app.with_detail("status", status.as_str()),
            _ => app,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (OrderError::OrderNotFound(1), StatusCode::NOT_FOUND),
            (
                OrderError::FinalState {
                    order_id: 1,
                    status: OrderStatus::Paid,
                },
                StatusCode::CONFLICT,
            ),
            (OrderError::AlreadyInStatus(OrderStatus::Queued), StatusCode::CONFLICT),
            (OrderError::PaymentMethodRequired, StatusCode::BAD_REQUEST),
            (
                OrderError::CancellationForbidden {
                    actor: "waiter:1".into(),
                    status: OrderStatus::Delivered,
                },
                StatusCode::FORBIDDEN,
            ),
            (OrderError::TableOccupied("T2".into()), StatusCode::CONFLICT),
            (OrderError::SplitAlreadyCompleted, StatusCode::CONFLICT),
            (OrderError::SameTable("T1".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status(), status);
        }
    }

    #[test]
    fn test_missing_field_is_named() {
        let err = AppError::from(OrderError::JustificationRequired {
            from: OrderStatus::Delivered,
            to: OrderStatus::Paid,
        });
        assert!(err.message.contains("justification"));
        assert_eq!(err.details.unwrap().get("field").unwrap(), "justification");

        let err = AppError::from(OrderError::PaymentMethodRequired);
        assert_eq!(err.message, "payment_method is required");
    }
}

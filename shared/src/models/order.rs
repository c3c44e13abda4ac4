//! Order Model
//!
//! Workflow status flow:
//! `NEW → QUEUED → PREPARING → READY → DELIVERED → AWAITING_PAYMENT → PAID`,
//! with `CANCELLED` reachable from any non-final status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单工作流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Queued,
    Preparing,
    Ready,
    Delivered,
    AwaitingPayment,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Queued => "QUEUED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::AwaitingPayment => "AWAITING_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// 终态：不允许任何后续迁移
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Items may still be edited in place (nothing started in the kitchen)
    pub fn can_modify(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Queued)
    }

    /// The kitchen has picked the order up
    pub fn kitchen_started(&self) -> bool {
        matches!(self, OrderStatus::Preparing | OrderStatus::Ready)
    }

    /// Not yet handed to the guest
    pub fn is_before_delivery(&self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::Queued | OrderStatus::Preparing | OrderStatus::Ready
        )
    }

    /// Served and waiting to be settled
    pub fn is_settleable(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::AwaitingPayment)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line (订单明细)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Line id, unique within the order
    pub id: u64,
    pub menu_item_id: u64,
    /// Name snapshot
    pub name: String,
    pub quantity: u32,
    /// Price snapshot at the time the line was added
    pub unit_price: f64,
    pub line_total: f64,
    pub is_quick_serve: bool,
}

/// Order entity (订单)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub session_id: u64,
    /// Ordering customer, if placed from a guest device
    pub customer_id: Option<u64>,
    pub waiter_id: Option<u64>,
    pub workflow_status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub is_quick_serve: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// Audit text for override transitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Bumped on every mutation
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Next free line id
    pub fn next_item_id(&self) -> u64 {
        self.items.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }
}

/// Requested line when placing or extending an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: u64,
    pub quantity: u32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub session_id: u64,
    #[serde(default)]
    pub customer_id: Option<u64>,
    pub items: Vec<OrderItemInput>,
}

/// Status transition request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub to_status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Result of a successful transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionResult {
    pub order: Order,
    pub previous_status: OrderStatus,
    /// The owning session was settled by this transition
    pub session_finalized: bool,
}

/// Transition audit record (审计)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAudit {
    pub id: u64,
    pub order_id: u64,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    /// `customer:<id>` or `<scope>:<employee id>`
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: i64,
}

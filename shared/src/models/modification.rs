//! Order Modification Model

use super::order::OrderItemInput;
use serde::{Deserialize, Serialize};

/// 修改单状态，只会迁移一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationStatus {
    Pending,
    Applied,
    Rejected,
}

/// Who proposed the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiatorRole {
    Customer,
    Waiter,
    Chef,
    Cashier,
    Admin,
    System,
}

/// Item delta against an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChanges {
    #[serde(default)]
    pub items_to_add: Vec<OrderItemInput>,
    /// Order line ids
    #[serde(default)]
    pub items_to_remove: Vec<u64>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.items_to_add.is_empty() && self.items_to_remove.is_empty()
    }
}

/// Modification record (改单记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderModification {
    pub id: u64,
    pub order_id: u64,
    pub initiated_by_role: InitiatorRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiated_by_customer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiated_by_employee_id: Option<u64>,
    pub status: ModificationStatus,
    pub changes: ItemChanges,
    pub auto_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by_customer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by_employee_id: Option<u64>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<i64>,
}

/// Staff-proposed modification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationCreate {
    pub changes: ItemChanges,
}

//! Dining Session & Table Model

use serde::{Deserialize, Serialize};

/// 用餐会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    AwaitingPayment,
    Paid,
    /// Folded into another session
    Merged,
    Closed,
}

impl SessionStatus {
    /// Still accepting orders and payments
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Open | SessionStatus::AwaitingPayment)
    }
}

/// Dining session (用餐会话)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningSession {
    pub id: u64,
    pub table_id: u64,
    pub table_number: String,
    pub status: SessionStatus,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_into: Option<u64>,
    pub opened_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: u64,
    pub table_number: String,
    pub capacity: u32,
    pub is_active: bool,
}

/// Move session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveTableRequest {
    pub table_number: String,
}

/// Move session result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveTableResult {
    pub session_id: u64,
    pub old_table_number: String,
    pub new_table_number: String,
}

/// Merge sessions payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSessionsRequest {
    pub session_ids: Vec<u64>,
}

/// Merge sessions result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSessionsResult {
    pub session_id: u64,
    pub merged_session_ids: Vec<u64>,
    pub order_count: usize,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

/// Settle session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizePaymentRequest {
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// 管理员直接结算已上菜订单时必填
    #[serde(default)]
    pub justification: Option<String>,
}

//! Split Bill Model

use super::session::SessionStatus;
use serde::{Deserialize, Serialize};

/// 分单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStatus {
    Active,
    Completed,
}

/// Per-person payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonPaymentStatus {
    Pending,
    Paid,
}

/// Split mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Custom,
}

/// Split bill attached to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitBill {
    pub id: u64,
    pub session_id: u64,
    pub split_type: SplitType,
    pub status: SplitStatus,
    pub total_amount: f64,
    pub person_ids: Vec<u64>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// One payer's share (分单付款人)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitBillPerson {
    pub id: u64,
    pub split_bill_id: u64,
    /// 1-based position within the split
    pub person_number: u32,
    pub total_amount: f64,
    pub payment_status: PersonPaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
}

/// Create split payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "split_type", rename_all = "snake_case")]
pub enum SplitCreate {
    Equal { number_of_people: u32 },
    Custom { amounts: Vec<f64> },
}

/// Split with its people
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitBillDetail {
    pub split: SplitBill,
    pub people: Vec<SplitBillPerson>,
}

/// Pay person payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayPersonRequest {
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Pay person result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPersonResult {
    pub person: SplitBillPerson,
    pub split_completed: bool,
    pub session_status: SessionStatus,
}

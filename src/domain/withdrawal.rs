//! Withdrawal types
//!
//! Withdrawal requests debit the balance at creation time, symmetrically to
//! orders. A downstream out-of-scope approval process moves them to
//! `completed` or `rejected`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Withdrawal request lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(WithdrawalStatus::Pending),
            "completed" => Some(WithdrawalStatus::Completed),
            "rejected" => Some(WithdrawalStatus::Rejected),
            _ => None,
        }
    }
}

/// A persisted withdrawal request.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WithdrawalRequest {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub payout_account_id: Uuid,
    /// Flat fee; zero on creation
    pub fee: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered payout destination. Read-only from the settlement services'
/// perspective.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Destination type, e.g. "bank_card" or "alipay"
    pub account_type: String,
    pub account_no: String,
    pub holder_name: String,
    pub created_at: DateTime<Utc>,
}

//! Transaction record types
//!
//! Append-only ledger entries. Every balance mutation corresponds to exactly
//! one record, and `balance_after = balance_before + amount` holds for every
//! record by construction: the constructors compute `balance_after` from the
//! observed `balance_before`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

/// Type tag for a ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Debit for a business order (recharge, utility payment, ...)
    OrderPayment,
    /// Debit for a withdrawal request
    Withdrawal,
    /// Credit reversing an earlier debit
    Refund,
    /// Manual correction by operations
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::OrderPayment => "order_payment",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Refund => "refund",
            TransactionType::Adjustment => "adjustment",
        }
    }
}

/// Record status. Records written by the settlement services are committed
/// together with their debit, so they are `completed` on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// A persisted ledger record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Signed amount: negative = debit, positive = credit
    pub amount: Decimal,
    pub tx_type: String,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A record ready to append. Construct through [`NewTransactionRecord::debit`]
/// or [`NewTransactionRecord::credit`] so the balance arithmetic cannot drift.
#[derive(Debug, Clone)]
pub struct NewTransactionRecord {
    account_id: Uuid,
    amount: Decimal,
    tx_type: TransactionType,
    balance_before: Decimal,
    balance_after: Decimal,
    status: TransactionStatus,
    description: String,
}

impl NewTransactionRecord {
    /// A debit record: stored amount is negative.
    pub fn debit(
        account_id: Uuid,
        amount: &Amount,
        balance_before: Decimal,
        tx_type: TransactionType,
        description: String,
    ) -> Self {
        let signed = -amount.value();
        Self {
            account_id,
            amount: signed,
            tx_type,
            balance_before,
            balance_after: balance_before + signed,
            status: TransactionStatus::Completed,
            description,
        }
    }

    /// A credit record: stored amount is positive.
    pub fn credit(
        account_id: Uuid,
        amount: &Amount,
        balance_before: Decimal,
        tx_type: TransactionType,
        description: String,
    ) -> Self {
        let signed = amount.value();
        Self {
            account_id,
            amount: signed,
            tx_type,
            balance_before,
            balance_after: balance_before + signed,
            status: TransactionStatus::Completed,
            description,
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn balance_before(&self) -> Decimal {
        self.balance_before
    }

    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `balance_after = balance_before + amount`; true by construction.
    pub fn is_balanced(&self) -> bool {
        self.balance_after == self.balance_before + self.amount
    }
}

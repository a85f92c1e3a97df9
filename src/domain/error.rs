//! Settlement Error Types
//!
//! Pure domain errors for the settlement paths, independent of the
//! web/infrastructure layer.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::AmountError;

/// Errors raised while settling an order or withdrawal.
///
/// Validation failures (`AccountNotFound`, `InsufficientBalance`,
/// `PayoutAccountNotFound`, `InvalidAmount`) never leave partial state.
/// `DebitConflict` means the compare-and-swap debit lost a race against a
/// concurrent settlement and the whole operation was rolled back.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettlementError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Insufficient balance for the requested debit
    #[error("Insufficient balance: current {current}, required {required}")]
    InsufficientBalance {
        current: Decimal,
        required: Decimal,
    },

    /// Registered payout account not found
    #[error("Payout account not found: {0}")]
    PayoutAccountNotFound(Uuid),

    /// Order row could not be inserted (nothing has been debited)
    #[error("Order insert failed: {0}")]
    OrderInsertFailed(String),

    /// The conditional debit lost a race against a concurrent settlement
    #[error("Debit conflict: balance of account {account_id} changed concurrently")]
    DebitConflict { account_id: Uuid },

    /// Store-level error while debiting
    #[error("Debit failed: {0}")]
    DebitFailed(String),

    /// The transaction record could not be appended
    #[error("Ledger append failed: {0}")]
    LedgerAppendFailed(String),

    /// Invalid monetary amount
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
}

impl SettlementError {
    /// Create an insufficient balance error
    pub fn insufficient_balance(current: Decimal, required: Decimal) -> Self {
        Self::InsufficientBalance { current, required }
    }

    /// Check if this is a client error (caller's fault, safe to report as-is)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::InsufficientBalance { .. }
                | Self::PayoutAccountNotFound(_)
                | Self::InvalidAmount(_)
        )
    }

    /// Check if a fresh retry of the whole operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DebitConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_error() {
        let err = SettlementError::insufficient_balance(
            Decimal::new(50, 0),
            Decimal::new(80, 0),
        );

        assert!(err.is_client_error());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("current 50"));
        assert!(err.to_string().contains("required 80"));
    }

    #[test]
    fn test_debit_conflict_is_retryable() {
        let err = SettlementError::DebitConflict {
            account_id: Uuid::nil(),
        };

        assert!(!err.is_client_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_ledger_append_failed_not_client_error() {
        let err = SettlementError::LedgerAppendFailed("connection reset".to_string());

        assert!(!err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_amount_is_client_error() {
        let err: SettlementError = AmountError::NotPositive(Decimal::ZERO).into();
        assert!(err.is_client_error());
    }
}

//! Withdrawal Settlement Service
//!
//! Creates a withdrawal request against a registered payout account and
//! debits the balance symmetrically to the order path: the request row, the
//! compare-and-swap debit and the ledger record commit in one transaction.
//! The caller's identity comes from the session, not from the request body.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Amount, Balance, NewTransactionRecord, SessionContext, SettlementError, TransactionType,
    WithdrawalRequest,
};
use crate::error::AppError;
use crate::notify::BalanceNotifier;
use crate::store::{AccountStore, TransactionLedger, WithdrawalStore};

/// Command to create a withdrawal request.
#[derive(Debug, Clone)]
pub struct CreateWithdrawalCommand {
    /// Caller-supplied account id; the session-resolved account wins on
    /// mismatch
    pub account_id: Uuid,
    pub amount: Decimal,
    pub payout_account_id: Uuid,
}

impl CreateWithdrawalCommand {
    pub fn new(account_id: Uuid, amount: Decimal, payout_account_id: Uuid) -> Self {
        Self {
            account_id,
            amount,
            payout_account_id,
        }
    }
}

/// Service settling withdrawal requests against account balances.
#[derive(Debug, Clone)]
pub struct WithdrawalSettlementService {
    pool: PgPool,
    accounts: AccountStore,
    withdrawals: WithdrawalStore,
    ledger: TransactionLedger,
    notifier: BalanceNotifier,
}

impl WithdrawalSettlementService {
    pub fn new(pool: PgPool, notifier: BalanceNotifier) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            withdrawals: WithdrawalStore::new(pool.clone()),
            ledger: TransactionLedger::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Create a withdrawal request and settle its debit.
    ///
    /// The account is re-resolved from the session user rather than trusting
    /// the caller-supplied id; a mismatch is logged but not fatal. The debit
    /// uses the same conditional update as the order path, so concurrent
    /// withdrawals cannot drive the balance negative, and the ledger record
    /// is appended explicitly in the same transaction.
    pub async fn create_withdrawal(
        &self,
        ctx: &SessionContext,
        command: CreateWithdrawalCommand,
    ) -> Result<WithdrawalRequest, AppError> {
        let amount = Amount::new(command.amount).map_err(SettlementError::from)?;

        let account = self
            .accounts
            .get_by_user(ctx.user_id)
            .await?
            .ok_or(SettlementError::AccountNotFound(command.account_id))?;

        if account.id != command.account_id {
            tracing::warn!(
                session_account = %account.id,
                supplied_account = %command.account_id,
                user_id = %ctx.user_id,
                "Caller-supplied account id does not match session, using session account"
            );
        }

        let balance = Balance::new(account.balance)
            .map_err(|e| AppError::Internal(format!("corrupt balance for {}: {}", account.id, e)))?;

        if !balance.is_sufficient_for(&amount) {
            return Err(SettlementError::insufficient_balance(
                balance.value(),
                amount.value(),
            )
            .into());
        }

        let payout = self
            .withdrawals
            .get_payment_account(command.payout_account_id)
            .await?
            .ok_or(SettlementError::PayoutAccountNotFound(
                command.payout_account_id,
            ))?;

        let mut tx = self.pool.begin().await?;

        let request = self
            .withdrawals
            .insert(&mut tx, account.id, amount.value(), payout.id)
            .await?;

        let debited = self
            .accounts
            .debit_if_balance(&mut tx, account.id, balance.value(), amount.value())
            .await
            .map_err(|e| SettlementError::DebitFailed(e.to_string()))?;

        if !debited {
            tx.rollback().await?;
            tracing::warn!(
                account_id = %account.id,
                "Conditional debit lost a race, withdrawal request rolled back"
            );
            return Err(SettlementError::DebitConflict {
                account_id: account.id,
            }
            .into());
        }

        let record = NewTransactionRecord::debit(
            account.id,
            &amount,
            balance.value(),
            TransactionType::Withdrawal,
            format!(
                "withdrawal {} to {} {}",
                request.id, payout.account_type, payout.account_no
            ),
        );

        self.ledger
            .append(&mut tx, &record)
            .await
            .map_err(|e| SettlementError::LedgerAppendFailed(e.to_string()))?;

        tx.commit().await?;

        let new_balance = record.balance_after();
        self.notifier.publish(account.id, new_balance);

        tracing::info!(
            account_id = %account.id,
            withdrawal_id = %request.id,
            amount = %amount,
            balance = %new_balance,
            "Withdrawal settled"
        );

        Ok(request)
    }
}
